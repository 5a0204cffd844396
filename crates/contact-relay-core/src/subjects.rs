//! Subject code handling.
//!
//! The form submits a short machine code from a closed option set; the
//! notification email carries the human-readable label. German and English
//! code sets coexist because the form is bilingual.

/// Every code the form's subject select can produce (both languages).
pub const SUBJECT_CODES: &[&str] = &[
    // German form
    "beratung",
    "projekt",
    "schulung",
    "partnership",
    "media",
    "support",
    "sonstiges",
    // English form
    "consulting",
    "project",
    "training",
    "other",
];

/// Fixed code → label table for the notification email.
///
/// Codes without an entry (e.g. `media`, `support`) pass through as their
/// raw value rather than failing translation.
const SUBJECT_LABELS: &[(&str, &str)] = &[
    ("beratung", "Beratungsanfrage"),
    ("projekt", "Projektanfrage"),
    ("schulung", "Schulung/Workshop"),
    ("partnership", "Partnerschaft"),
    ("sonstiges", "Sonstiges"),
    ("consulting", "Consulting Inquiry"),
    ("project", "Project Inquiry"),
    ("training", "Training/Workshop"),
    ("other", "Other"),
];

/// Translate a subject code into its display label.
#[must_use]
pub fn subject_label(code: &str) -> String {
    SUBJECT_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or_else(|| code.to_string(), |(_, label)| (*label).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_translate() {
        assert_eq!(subject_label("projekt"), "Projektanfrage");
        assert_eq!(subject_label("project"), "Project Inquiry");
        assert_eq!(subject_label("other"), "Other");
    }

    #[test]
    fn unknown_codes_pass_through_raw() {
        assert_eq!(subject_label("media"), "media");
        assert_eq!(subject_label("whatever"), "whatever");
    }

    #[test]
    fn every_labeled_code_is_a_valid_option() {
        for (code, _) in SUBJECT_LABELS {
            assert!(
                SUBJECT_CODES.contains(code),
                "label table entry {code} missing from the option set"
            );
        }
    }
}
