//! Field validation for the contact form.
//!
//! Both halves of the system run the same rule table: the client for inline
//! feedback before any network call, the server as the actual boundary.
//! Checks run in a fixed order per field and short-circuit for optional
//! empty fields, which are trivially valid.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Latin letters plus German umlauts, spaces, hyphens, and dots.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zäöüÄÖÜß\s.\-]+$").expect("valid name pattern"));

/// Standard local@domain shape; intentionally loose beyond that.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Digits, spaces, parentheses, hyphens, and an optional leading plus.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]+$").expect("valid phone pattern"));

/// Field names in form order; drives whole-form validation and keeps the
/// aggregate result deterministic.
pub const FIELD_ORDER: &[&str] = &[
    "name", "email", "company", "phone", "subject", "message", "privacy",
];

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// One violated rule, parameterized with the configured limit where relevant.
///
/// Machine-readable for client-side localization; `Display` gives the
/// server-side English message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidEmail,
    InvalidPhone,
    InvalidFormat,
    NotAnOption,
    ConsentRequired,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("this field is required"),
            Self::TooShort { min } => write!(f, "at least {min} characters required"),
            Self::TooLong { max } => write!(f, "maximum {max} characters allowed"),
            Self::InvalidEmail => f.write_str("invalid email address"),
            Self::InvalidPhone => f.write_str("invalid phone number"),
            Self::InvalidFormat => f.write_str("invalid format"),
            Self::NotAnOption => f.write_str("not a valid choice"),
            Self::ConsentRequired => f.write_str("consent is required"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Which format pattern a field uses, so violations stay field-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    Name,
    Email,
    Phone,
}

impl PatternKind {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Name => &NAME_PATTERN,
            Self::Email => &EMAIL_PATTERN,
            Self::Phone => &PHONE_PATTERN,
        }
    }

    const fn violation(self) -> Violation {
        match self {
            Self::Name => Violation::InvalidFormat,
            Self::Email => Violation::InvalidEmail,
            Self::Phone => Violation::InvalidPhone,
        }
    }
}

/// Per-field validation rules. Immutable; defined once in [`rule_for`].
#[derive(Debug, Clone)]
pub struct FieldRule {
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<PatternKind>,
    one_of: Option<&'static [&'static str]>,
    must_be_checked: bool,
}

impl FieldRule {
    const EMPTY: Self = Self {
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        one_of: None,
        must_be_checked: false,
    };
}

/// The authoritative rule table.
#[must_use]
pub fn rule_for(field: &str) -> Option<FieldRule> {
    let rule = match field {
        "name" => FieldRule {
            required: true,
            min_length: Some(2),
            max_length: Some(100),
            pattern: Some(PatternKind::Name),
            ..FieldRule::EMPTY
        },
        "email" => FieldRule {
            required: true,
            max_length: Some(255),
            pattern: Some(PatternKind::Email),
            ..FieldRule::EMPTY
        },
        "company" => FieldRule {
            max_length: Some(200),
            ..FieldRule::EMPTY
        },
        "phone" => FieldRule {
            max_length: Some(50),
            pattern: Some(PatternKind::Phone),
            ..FieldRule::EMPTY
        },
        "subject" => FieldRule {
            required: true,
            one_of: Some(crate::subjects::SUBJECT_CODES),
            ..FieldRule::EMPTY
        },
        "message" => FieldRule {
            required: true,
            min_length: Some(10),
            max_length: Some(5000),
            ..FieldRule::EMPTY
        },
        "privacy" => FieldRule {
            required: true,
            must_be_checked: true,
            ..FieldRule::EMPTY
        },
        _ => return None,
    };
    Some(rule)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate one raw value against its rule, in fixed order.
///
/// An empty value for an optional field is trivially valid; an empty value
/// for a required field produces only the required violation.
#[must_use]
pub fn validate_field(value: &str, rule: &FieldRule) -> Vec<Violation> {
    let mut violations = Vec::new();
    let trimmed = value.trim();

    if rule.required && trimmed.is_empty() {
        violations.push(Violation::Required);
    }
    if trimmed.is_empty() {
        return violations;
    }

    if let Some(min) = rule.min_length {
        if trimmed.chars().count() < min {
            violations.push(Violation::TooShort { min });
        }
    }
    if let Some(max) = rule.max_length {
        if value.chars().count() > max {
            violations.push(Violation::TooLong { max });
        }
    }
    if let Some(kind) = rule.pattern {
        if !kind.regex().is_match(value) {
            violations.push(kind.violation());
        }
    }
    if let Some(options) = rule.one_of {
        if !options.contains(&trimmed) {
            violations.push(Violation::NotAnOption);
        }
    }
    if rule.must_be_checked && !checkbox_truthy(trimmed) {
        violations.push(Violation::ConsentRequired);
    }

    violations
}

fn checkbox_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// Aggregate result of validating a whole form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    /// Violations per field, in form order; fields with none are omitted.
    pub violations: Vec<(String, Vec<Violation>)>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations for one field, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&[Violation]> {
        self.violations
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, v)| v.as_slice())
    }

    /// One combined human-readable summary, for the server's aggregate
    /// validation-error response.
    #[must_use]
    pub fn combined_message(&self) -> String {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|(field, violations)| {
                let msgs: Vec<String> = violations.iter().map(ToString::to_string).collect();
                format!("{field}: {}", msgs.join(", "))
            })
            .collect();
        parts.join("; ")
    }
}

/// Run the full rule table against a field lookup.
///
/// `lookup` returns the raw value for a field name ("" = absent); both
/// [`crate::models::SubmissionRequest`] and [`crate::models::SubmissionDraft`]
/// expose a matching `field_value`.
pub fn validate_form<F>(lookup: F) -> ValidationResult
where
    F: Fn(&str) -> String,
{
    let mut result = ValidationResult::default();
    for &field in FIELD_ORDER {
        let Some(rule) = rule_for(field) else {
            continue;
        };
        let violations = validate_field(&lookup(field), &rule);
        if !violations.is_empty() {
            result.violations.push((field.to_string(), violations));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(field: &str) -> FieldRule {
        rule_for(field).expect("known field")
    }

    #[test]
    fn required_fields_reject_empty_and_whitespace() {
        for field in ["name", "email", "subject", "message", "privacy"] {
            for value in ["", "   ", "\t\n"] {
                let violations = validate_field(value, &rule(field));
                assert_eq!(
                    violations,
                    vec![Violation::Required],
                    "{field} with {value:?} should yield exactly the required violation"
                );
            }
        }
    }

    #[test]
    fn optional_fields_accept_empty_regardless_of_other_rules() {
        for field in ["company", "phone"] {
            assert!(validate_field("", &rule(field)).is_empty());
            assert!(validate_field("   ", &rule(field)).is_empty());
        }
    }

    #[test]
    fn name_accepts_umlauts_and_punctuation() {
        for value in ["Jane Doe", "Jürgen Müller-Lüdenscheidt", "Dr. Weiß"] {
            assert!(
                validate_field(value, &rule("name")).is_empty(),
                "{value:?} should be a valid name"
            );
        }
        assert_eq!(
            validate_field("Jane123", &rule("name")),
            vec![Violation::InvalidFormat]
        );
        assert_eq!(
            validate_field("J", &rule("name")),
            vec![Violation::TooShort { min: 2 }]
        );
    }

    #[test]
    fn email_shape_is_enforced() {
        assert!(validate_field("jane@example.com", &rule("email")).is_empty());
        for bad in ["jane", "jane@", "@example.com", "jane@example", "a b@c.de"] {
            assert_eq!(
                validate_field(bad, &rule("email")),
                vec![Violation::InvalidEmail],
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn phone_allows_formatting_characters() {
        assert!(validate_field("+49 123 456 7890", &rule("phone")).is_empty());
        assert!(validate_field("(0721) 123-456", &rule("phone")).is_empty());
        assert_eq!(
            validate_field("call me", &rule("phone")),
            vec![Violation::InvalidPhone]
        );
    }

    #[test]
    fn subject_must_come_from_the_closed_option_set() {
        assert!(validate_field("project", &rule("subject")).is_empty());
        assert!(validate_field("beratung", &rule("subject")).is_empty());
        assert_eq!(
            validate_field("nonsense", &rule("subject")),
            vec![Violation::NotAnOption]
        );
    }

    #[test]
    fn message_length_boundaries() {
        let rule = rule("message");
        assert_eq!(
            validate_field(&"x".repeat(9), &rule),
            vec![Violation::TooShort { min: 10 }]
        );
        assert!(validate_field(&"x".repeat(10), &rule).is_empty());
        assert!(validate_field(&"x".repeat(5000), &rule).is_empty());
        assert_eq!(
            validate_field(&"x".repeat(5001), &rule),
            vec![Violation::TooLong { max: 5000 }]
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 100 umlauts are 200 bytes but exactly the name cap.
        let name = "ü".repeat(100);
        assert!(validate_field(&name, &rule("name")).is_empty());
        let over = "ü".repeat(101);
        assert_eq!(
            validate_field(&over, &rule("name")),
            vec![Violation::TooLong { max: 100 }]
        );
    }

    #[test]
    fn privacy_requires_affirmative_check() {
        assert!(validate_field("true", &rule("privacy")).is_empty());
        assert!(validate_field("on", &rule("privacy")).is_empty());
        assert_eq!(
            validate_field("false", &rule("privacy")),
            vec![Violation::ConsentRequired]
        );
        assert_eq!(
            validate_field("", &rule("privacy")),
            vec![Violation::Required]
        );
    }

    #[test]
    fn whole_form_aggregates_in_field_order() {
        let result = validate_form(|field| match field {
            "email" => "not-an-email".to_string(),
            "message" => "short".to_string(),
            _ => String::new(),
        });
        assert!(!result.is_valid());
        let fields: Vec<&str> = result
            .violations
            .iter()
            .map(|(f, _)| f.as_str())
            .collect();
        // name/subject/privacy missing, email invalid, message short, in form order.
        assert_eq!(fields, vec!["name", "email", "subject", "message", "privacy"]);
        assert_eq!(
            result.field("message"),
            Some(&[Violation::TooShort { min: 10 }][..])
        );
        let summary = result.combined_message();
        assert!(summary.contains("email: invalid email address"));
    }

    #[test]
    fn valid_form_passes() {
        let result = validate_form(|field| {
            match field {
                "name" => "Jane Doe",
                "email" => "jane@example.com",
                "subject" => "project",
                "message" => "Please build me a website",
                "privacy" => "true",
                _ => "",
            }
            .to_string()
        });
        assert!(result.is_valid());
        assert!(result.combined_message().is_empty());
    }
}
