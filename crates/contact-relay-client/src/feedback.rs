//! User-facing feedback: localized toast and inline messages.
//!
//! Known error codes map to localized toasts; anything unrecognized falls
//! back to the generic error. A client-side validation failure deliberately
//! produces NO toast; those errors render inline next to the fields.

use std::time::Duration;

use contact_relay_core::error::Error;
use contact_relay_core::fields::Violation;

use crate::context::Language;
use crate::submit::SubmitResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

/// One toast notification, with its auto-dismiss delay. The presenter is
/// expected to schedule dismissal via a cancellable task handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub dismiss_after: Duration,
}

impl Toast {
    fn new(kind: ToastKind, message: &str) -> Self {
        // Success toasts linger a little longer than error ones.
        let dismiss_after = if kind == ToastKind::Success {
            Duration::from_secs(5)
        } else {
            Duration::from_secs(4)
        };
        Self {
            kind,
            message: message.to_string(),
            dismiss_after,
        }
    }
}

/// Pick the toast for a submit result, or `None` when errors are shown
/// inline instead (validation) or nothing should surface (busy).
#[must_use]
pub fn toast_for(result: &SubmitResult, language: Language) -> Option<Toast> {
    let t = messages(language);
    match result {
        SubmitResult::Accepted(outcome) => Some(Toast::new(
            ToastKind::Success,
            outcome.message.as_deref().unwrap_or(t.success),
        )),
        SubmitResult::Invalid(_) | SubmitResult::Busy => None,
        SubmitResult::Rejected(err) => Some(Toast::new(ToastKind::Error, error_message(err, t))),
    }
}

fn error_message<'a>(err: &Error, t: &'a Messages) -> &'a str {
    match err {
        Error::RateLimited => t.rate_limit_error,
        Error::Transport(_) => t.network_error,
        Error::Validation(_) => t.validation_error,
        _ => t.general_error,
    }
}

/// Localized inline message for one field violation.
#[must_use]
pub fn violation_message(violation: &Violation, language: Language) -> String {
    let t = messages(language);
    match violation {
        Violation::Required => t.required.to_string(),
        Violation::TooShort { min } => t.min_length.replace("{min}", &min.to_string()),
        Violation::TooLong { max } => t.max_length.replace("{max}", &max.to_string()),
        Violation::InvalidEmail => t.email.to_string(),
        Violation::InvalidPhone => t.phone.to_string(),
        Violation::InvalidFormat | Violation::NotAnOption => t.format.to_string(),
        Violation::ConsentRequired => t.privacy.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Message tables
// ---------------------------------------------------------------------------

struct Messages {
    success: &'static str,
    general_error: &'static str,
    network_error: &'static str,
    rate_limit_error: &'static str,
    validation_error: &'static str,
    required: &'static str,
    email: &'static str,
    phone: &'static str,
    format: &'static str,
    min_length: &'static str,
    max_length: &'static str,
    privacy: &'static str,
}

const DE: Messages = Messages {
    success: "Vielen Dank! Ihre Nachricht wurde erfolgreich gesendet.",
    general_error: "Ein Fehler ist aufgetreten. Bitte versuchen Sie es später erneut.",
    network_error: "Netzwerkfehler. Bitte überprüfen Sie Ihre Internetverbindung.",
    rate_limit_error: "Sie haben zu viele Nachrichten gesendet. Bitte warten Sie eine Stunde.",
    validation_error: "Bitte überprüfen Sie Ihre Eingaben.",
    required: "Dieses Feld ist erforderlich",
    email: "Bitte geben Sie eine gültige E-Mail-Adresse ein",
    phone: "Bitte geben Sie eine gültige Telefonnummer ein",
    format: "Ungültiges Format",
    min_length: "Mindestens {min} Zeichen erforderlich",
    max_length: "Maximal {max} Zeichen erlaubt",
    privacy: "Sie müssen der Datenschutzerklärung zustimmen",
};

const EN: Messages = Messages {
    success: "Thank you! Your message has been sent successfully.",
    general_error: "An error occurred. Please try again later.",
    network_error: "Network error. Please check your internet connection.",
    rate_limit_error: "You have sent too many messages. Please wait an hour.",
    validation_error: "Please check your input.",
    required: "This field is required",
    email: "Please enter a valid email address",
    phone: "Please enter a valid phone number",
    format: "Invalid format",
    min_length: "At least {min} characters required",
    max_length: "Maximum {max} characters allowed",
    privacy: "You must agree to the privacy policy",
};

const fn messages(language: Language) -> &'static Messages {
    match language {
        Language::De => &DE,
        Language::En => &EN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contact_relay_core::models::SubmissionOutcome;
    use contact_relay_core::validate_form;

    #[test]
    fn success_uses_server_message_when_present() {
        let outcome = SubmissionOutcome::ok("Message sent successfully", Utc::now());
        let toast = toast_for(&SubmitResult::Accepted(outcome), Language::En).unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Message sent successfully");
        assert_eq!(toast.dismiss_after, Duration::from_secs(5));
    }

    #[test]
    fn validation_failure_shows_no_toast() {
        let validation = validate_form(|_| String::new());
        assert!(toast_for(&SubmitResult::Invalid(validation), Language::De).is_none());
        assert!(toast_for(&SubmitResult::Busy, Language::De).is_none());
    }

    #[test]
    fn known_errors_localize() {
        let toast = toast_for(
            &SubmitResult::Rejected(Error::RateLimited),
            Language::De,
        )
        .unwrap();
        assert!(toast.message.contains("zu viele Nachrichten"));

        let toast = toast_for(
            &SubmitResult::Rejected(Error::Transport("down".into())),
            Language::En,
        )
        .unwrap();
        assert!(toast.message.starts_with("Network error"));
        assert_eq!(toast.dismiss_after, Duration::from_secs(4));
    }

    #[test]
    fn unknown_errors_fall_back_to_the_generic_message() {
        let toast = toast_for(
            &SubmitResult::Rejected(Error::Internal("weird".into())),
            Language::En,
        )
        .unwrap();
        assert_eq!(toast.message, EN.general_error);
        // The internal detail never reaches the user.
        assert!(!toast.message.contains("weird"));
    }

    #[test]
    fn violation_messages_substitute_limits() {
        let msg = violation_message(&Violation::TooShort { min: 10 }, Language::En);
        assert_eq!(msg, "At least 10 characters required");
        let msg = violation_message(&Violation::TooLong { max: 5000 }, Language::De);
        assert_eq!(msg, "Maximal 5000 Zeichen erlaubt");
    }

    #[test]
    fn violation_messages_cover_both_languages() {
        for language in [Language::De, Language::En] {
            for violation in [
                Violation::Required,
                Violation::InvalidEmail,
                Violation::InvalidPhone,
                Violation::InvalidFormat,
                Violation::NotAnOption,
                Violation::ConsentRequired,
            ] {
                assert!(!violation_message(&violation, language).is_empty());
            }
        }
    }
}
