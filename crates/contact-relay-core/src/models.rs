//! Data models for Contact Relay
//!
//! The shared wire/disk contract between the submission controller, the
//! intake handler, and the audit log. All timestamps are UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

// =============================================================================
// SubmissionRequest
// =============================================================================

/// A contact form submission as it crosses the wire.
///
/// The seven form fields are validated; the trailing metadata block is
/// client-supplied, logged, and never validated. `privacy` accepts any
/// checkbox-style truthy encoding (`true`, `"on"`, `"1"`, `1`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "de_truthy")]
    pub privacy: bool,

    // Client metadata (logged, not validated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,

    /// Optional consent token, checked against the configured expectation
    /// only when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_token: Option<String>,
}

impl SubmissionRequest {
    /// Trim every string field in place. Runs once at intake before any
    /// validation so length checks see the canonical value.
    pub fn sanitize(&mut self) {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.email);
        trim_opt(&mut self.company);
        trim_opt(&mut self.phone);
        trim_in_place(&mut self.subject);
        trim_in_place(&mut self.message);
        trim_opt(&mut self.language);
        trim_opt(&mut self.user_agent);
        trim_opt(&mut self.page_url);
    }

    /// Raw value of a named form field for the validator ("" = absent).
    #[must_use]
    pub fn field_value(&self, field: &str) -> String {
        match field {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "company" => self.company.clone().unwrap_or_default(),
            "phone" => self.phone.clone().unwrap_or_default(),
            "subject" => self.subject.clone(),
            "message" => self.message.clone(),
            "privacy" => {
                if self.privacy {
                    "true".to_string()
                } else {
                    String::new()
                }
            }
            _ => String::new(),
        }
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        trim_in_place(v);
    }
}

/// Checkbox truthiness: booleans pass through; `"on"`, `"1"`, `"true"`,
/// `"yes"` (case-insensitive) and non-zero numbers count as checked.
fn de_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(truthy(&value))
}

/// Shared truthiness rule for checkbox-style values.
#[must_use]
pub fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes")
        }
        _ => false,
    }
}

// =============================================================================
// SubmissionDraft
// =============================================================================

/// The autosaved, not-yet-submitted contents of the contact form.
///
/// Owned exclusively by the client controller: created on first edit,
/// overwritten on every debounced autosave tick, destroyed on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub privacy: bool,

    // Derived metadata
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub page_url: String,
    /// Stable per-installation identifier for the local ledger slot.
    #[serde(default)]
    pub client_id: String,
}

impl SubmissionDraft {
    /// Raw value of a named form field for the validator ("" = absent).
    #[must_use]
    pub fn field_value(&self, field: &str) -> String {
        match field {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "company" => self.company.clone(),
            "phone" => self.phone.clone(),
            "subject" => self.subject.clone(),
            "message" => self.message.clone(),
            "privacy" => {
                if self.privacy {
                    "true".to_string()
                } else {
                    String::new()
                }
            }
            _ => String::new(),
        }
    }

    /// Convert into the wire payload, stamping metadata.
    #[must_use]
    pub fn into_request(self, now: DateTime<Utc>, user_agent: &str) -> SubmissionRequest {
        SubmissionRequest {
            name: self.name,
            email: self.email,
            company: none_if_empty(self.company),
            phone: none_if_empty(self.phone),
            subject: self.subject,
            message: self.message,
            privacy: self.privacy,
            language: none_if_empty(self.language),
            timestamp: Some(now.to_rfc3339()),
            user_agent: none_if_empty(user_agent.to_string()),
            page_url: none_if_empty(self.page_url),
            consent_token: None,
        }
    }
}

fn none_if_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

// =============================================================================
// SubmissionOutcome
// =============================================================================

/// The structured result of one intake pipeline run.
///
/// Consumed once by the client to pick a user-facing message; not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub timestamp: String,
}

impl SubmissionOutcome {
    /// Successful outcome with a human-readable confirmation.
    #[must_use]
    pub fn ok(message: &str, now: DateTime<Utc>) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
            code: None,
            timestamp: format_timestamp(now),
        }
    }

    /// Failed outcome carrying the safe summary and mirrored status code.
    ///
    /// Never leaks internal detail: only [`Error::safe_message`] crosses the
    /// wire, the caller logs the full error locally.
    #[must_use]
    pub fn failure(error: &Error, now: DateTime<Utc>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.safe_message()),
            code: Some(error.http_status()),
            timestamp: format_timestamp(now),
        }
    }

    /// The HTTP status this outcome travels under (200 on success).
    #[must_use]
    pub fn http_status(&self) -> u16 {
        if self.success { 200 } else { self.code.unwrap_or(500) }
    }
}

fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

// =============================================================================
// AuditRecord
// =============================================================================

/// One line of the append-only submission audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    /// Resolved actor network address.
    pub actor: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub email: String,
    /// Human-readable subject label (post-translation).
    #[serde(default)]
    pub subject: String,
    pub success: bool,
}

impl AuditRecord {
    #[must_use]
    pub fn new(
        now: DateTime<Utc>,
        actor: &str,
        user_agent: &str,
        email: &str,
        subject: &str,
        success: bool,
    ) -> Self {
        Self {
            timestamp: format_timestamp(now),
            actor: actor.to_string(),
            user_agent: user_agent.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privacy_accepts_checkbox_encodings() {
        for raw in [
            r#"{"privacy": true}"#,
            r#"{"privacy": "on"}"#,
            r#"{"privacy": "1"}"#,
            r#"{"privacy": "Yes"}"#,
            r#"{"privacy": 1}"#,
        ] {
            let req: SubmissionRequest = serde_json::from_str(raw).unwrap();
            assert!(req.privacy, "{raw} should deserialize as checked");
        }
        for raw in [
            r#"{"privacy": false}"#,
            r#"{"privacy": ""}"#,
            r#"{"privacy": "off"}"#,
            r#"{"privacy": 0}"#,
            r"{}",
        ] {
            let req: SubmissionRequest = serde_json::from_str(raw).unwrap();
            assert!(!req.privacy, "{raw} should deserialize as unchecked");
        }
    }

    #[test]
    fn sanitize_trims_every_string_field() {
        let mut req = SubmissionRequest {
            name: "  Jane Doe  ".into(),
            email: " jane@example.com ".into(),
            company: Some("  ACME  ".into()),
            subject: " project ".into(),
            message: "  hello there  ".into(),
            ..Default::default()
        };
        req.sanitize();
        assert_eq!(req.name, "Jane Doe");
        assert_eq!(req.email, "jane@example.com");
        assert_eq!(req.company.as_deref(), Some("ACME"));
        assert_eq!(req.subject, "project");
        assert_eq!(req.message, "hello there");
    }

    #[test]
    fn draft_round_trips_into_request() {
        let draft = SubmissionDraft {
            name: "Jane".into(),
            email: "jane@example.com".into(),
            subject: "project".into(),
            message: "A message of sufficient length".into(),
            privacy: true,
            language: "en".into(),
            ..Default::default()
        };
        let now = Utc::now();
        let req = draft.into_request(now, "test-agent/1.0");
        assert_eq!(req.name, "Jane");
        assert!(req.privacy);
        assert_eq!(req.language.as_deref(), Some("en"));
        assert_eq!(req.user_agent.as_deref(), Some("test-agent/1.0"));
        assert!(req.company.is_none());
        assert!(req.timestamp.is_some());
    }

    #[test]
    fn outcome_mirrors_error_status() {
        let now = Utc::now();
        let ok = SubmissionOutcome::ok("sent", now);
        assert_eq!(ok.http_status(), 200);
        assert!(ok.error.is_none());

        let err = SubmissionOutcome::failure(&Error::RateLimited, now);
        assert_eq!(err.http_status(), 429);
        assert!(!err.success);
        assert!(err.error.is_some());
    }

    #[test]
    fn audit_record_serializes_as_flat_json() {
        let rec = AuditRecord::new(
            Utc::now(),
            "203.0.113.7",
            "test-agent",
            "jane@example.com",
            "Project Inquiry",
            true,
        );
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["actor"], "203.0.113.7");
        assert_eq!(json["success"], true);
        assert!(json["timestamp"].is_string());
    }
}
