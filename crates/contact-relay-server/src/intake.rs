//! The intake pipeline: parse → sanitize → validate → translate → security
//! checks → dispatch → audit → outcome.
//!
//! Fails fast at the first violated stage. Attempts that pass validation are
//! always audited, with the success flag reflecting the final outcome, so
//! rejected and failed-dispatch attempts leave a trace too. There is no
//! deduplication across attempts: identical payloads are independent sends.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use contact_relay_core::error::{Error, Result};
use contact_relay_core::models::{AuditRecord, SubmissionOutcome, SubmissionRequest, truthy};
use contact_relay_core::{Config, spam, subjects, validate_form};
use tracing::{info, warn};

use crate::audit::AuditLog;
use crate::mail::{MailDispatcher, build_notification};
use crate::ratelimit::FileLedgerStore;

/// Confirmation message carried by successful outcomes.
const SUCCESS_MESSAGE: &str = "Message sent successfully";

/// The server half of the submission flow.
///
/// One instance per process; every HTTP request runs through
/// [`Intake::handle_submission`] as a synchronous pipeline. The per-actor
/// ledger store is the only shared mutable state and is file-locked.
pub struct Intake {
    config: Config,
    dispatcher: Arc<dyn MailDispatcher>,
    ledgers: FileLedgerStore,
    audit: AuditLog,
}

impl Intake {
    #[must_use]
    pub fn new(config: Config, dispatcher: Arc<dyn MailDispatcher>) -> Self {
        let ledgers = FileLedgerStore::new(config.ledger_dir.clone());
        let audit = AuditLog::new(config.audit_log_path.clone());
        Self {
            config,
            dispatcher,
            ledgers,
            audit,
        }
    }

    /// Run one submission attempt through the whole pipeline.
    ///
    /// `actor` is the resolved client network address; `content_type` is the
    /// raw request header value if present. Always returns an outcome: all
    /// failures are mapped onto the error taxonomy, logged locally in full,
    /// and surfaced to the caller only as a safe summary plus code.
    pub fn handle_submission(
        &self,
        body: &[u8],
        content_type: Option<&str>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> SubmissionOutcome {
        match self.process(body, content_type, actor, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    error = %err,
                    error_type = err.error_type(),
                    actor,
                    "submission rejected"
                );
                SubmissionOutcome::failure(&err, now)
            }
        }
    }

    fn process(
        &self,
        body: &[u8],
        content_type: Option<&str>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome> {
        // Stages 2-3: body parse + sanitize + field validation.
        let mut request = parse_body(body, content_type)?;
        request.sanitize();

        let result = validate_form(|field| request.field_value(field));
        if !result.is_valid() {
            return Err(Error::Validation(result.combined_message()));
        }

        // Stage 4: subject code → display label (unknown codes pass through).
        let subject_label = subjects::subject_label(&request.subject);

        // Stages 5-6: security checks, then dispatch. From here on every
        // attempt is audited with the real outcome.
        let outcome = self.check_and_dispatch(&request, &subject_label, actor, now);

        let record = AuditRecord::new(
            now,
            actor,
            request.user_agent.as_deref().unwrap_or(""),
            &request.email,
            &subject_label,
            outcome.is_ok(),
        );
        if let Err(err) = self.audit.append(&record) {
            // The audit trail must never turn a delivered mail into a
            // client-visible failure.
            warn!(error = %err, "audit append failed");
        }

        outcome?;

        info!(
            actor,
            subject = %subject_label,
            language = request.language.as_deref().unwrap_or("-"),
            "submission dispatched"
        );
        Ok(SubmissionOutcome::ok(SUCCESS_MESSAGE, now))
    }

    /// Stages 5-6: rate limit, spam screen, consent token, mail dispatch.
    fn check_and_dispatch(
        &self,
        request: &SubmissionRequest,
        subject_label: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ledgers.check_and_record(
            actor,
            self.config.rate_limit_max,
            self.config.rate_limit_window_secs,
            now.timestamp(),
        )?;

        spam::screen(&request.message, &request.name)?;

        if let Some(supplied) = request.consent_token.as_deref() {
            self.verify_consent_token(supplied)?;
        }

        let mail_subject = format!("[Contact Form] {subject_label}");
        let html_body = build_notification(request, subject_label, now)?;
        let reply_to = format!("{} <{}>", request.name, request.email);
        self.dispatcher.send(
            &self.config.mail_to_address,
            &mail_subject,
            &html_body,
            &[("Reply-To".to_string(), reply_to)],
        )
    }

    /// A supplied token is only checked when an expectation is configured.
    fn verify_consent_token(&self, supplied: &str) -> Result<()> {
        let Some(expected) = self.config.consent_token.as_deref() else {
            return Ok(());
        };
        if constant_time_eq(supplied, expected) {
            Ok(())
        } else {
            Err(Error::ConsentTokenInvalid)
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// ---------------------------------------------------------------------------
// Body parsing (JSON or form-encoded)
// ---------------------------------------------------------------------------

/// Parse the request body into a [`SubmissionRequest`].
///
/// JSON when the content type says so, standard form encoding otherwise.
pub fn parse_body(body: &[u8], content_type: Option<&str>) -> Result<SubmissionRequest> {
    let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
    if is_json {
        serde_json::from_slice(body)
            .map_err(|e| Error::MalformedRequest(format!("invalid JSON data: {e}")))
    } else {
        parse_form_encoded(body)
    }
}

fn parse_form_encoded(body: &[u8]) -> Result<SubmissionRequest> {
    let text = std::str::from_utf8(body)
        .map_err(|_| Error::MalformedRequest("form body is not valid UTF-8".to_string()))?;

    let mut request = SubmissionRequest::default();
    for pair in text.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = percent_decode(key)?;
        let value = percent_decode(value)?;
        match key.as_str() {
            "name" => request.name = value,
            "email" => request.email = value,
            "company" => request.company = Some(value),
            "phone" => request.phone = Some(value),
            "subject" => request.subject = value,
            "message" => request.message = value,
            "privacy" => request.privacy = truthy(&serde_json::Value::String(value)),
            "language" => request.language = Some(value),
            "timestamp" => request.timestamp = Some(value),
            "user_agent" => request.user_agent = Some(value),
            "page_url" => request.page_url = Some(value),
            "consent_token" => request.consent_token = Some(value),
            // Unknown keys are ignored, matching lenient form handling.
            _ => {}
        }
    }
    Ok(request)
}

/// Decode `application/x-www-form-urlencoded` escapes (`+` and `%XX`).
fn percent_decode(raw: &str) -> Result<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| {
                        Error::MalformedRequest("truncated percent escape in form body".to_string())
                    })?;
                out.push(hex);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out)
        .map_err(|_| Error::MalformedRequest("form value is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_bodies() {
        let body = br#"{"name":"Jane","email":"jane@example.com","subject":"project","message":"hello there ok","privacy":true}"#;
        let req = parse_body(body, Some("application/json; charset=utf-8")).unwrap();
        assert_eq!(req.name, "Jane");
        assert!(req.privacy);
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        let err = parse_body(b"{not json", Some("application/json")).unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.error_type(), "MALFORMED_REQUEST");
    }

    #[test]
    fn parses_form_encoded_bodies() {
        let body = b"name=Jane+Doe&email=jane%40example.com&subject=project&message=hello+there+ok&privacy=on";
        let req = parse_body(body, Some("application/x-www-form-urlencoded")).unwrap();
        assert_eq!(req.name, "Jane Doe");
        assert_eq!(req.email, "jane@example.com");
        assert!(req.privacy);
    }

    #[test]
    fn missing_content_type_falls_back_to_form_parsing() {
        let req = parse_body(b"name=Jane", None).unwrap();
        assert_eq!(req.name, "Jane");
    }

    #[test]
    fn truncated_percent_escape_is_rejected() {
        let err = parse_body(b"name=Jane%4", None).unwrap_err();
        assert_eq!(err.error_type(), "MALFORMED_REQUEST");
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq("token", "token"));
        assert!(!constant_time_eq("token", "другой"));
        assert!(!constant_time_eq("short", "longer-value"));
    }
}
