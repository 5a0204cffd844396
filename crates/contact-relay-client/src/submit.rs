//! The submission controller: local validation, local rate limiting, and
//! the retry-with-backoff network call.
//!
//! The local rate limit is a UX optimization to avoid pointless network
//! calls; the server enforces its own independent limit and neither side
//! trusts the other. Only one submission is in flight at a time; an
//! overlapping submit is rejected, not queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use contact_relay_core::error::{Error, Result};
use contact_relay_core::models::{SubmissionDraft, SubmissionOutcome};
use contact_relay_core::{Ledger, ValidationResult, validate_form};
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::draft::DraftKeeper;
use crate::transport::Transport;

/// Store slot holding the local submission-timestamp ledger.
const SUBMISSIONS_KEY: &str = "contact_submissions";
/// Store slot holding the last successful submission time.
const LAST_SUBMISSION_KEY: &str = "last_contact_submission";

// ---------------------------------------------------------------------------
// Sleeper seam
// ---------------------------------------------------------------------------

/// Cooperative pause between retry attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real sleeping for production use.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Up to `attempts` tries with linear backoff (`attempt × base_delay`).
///
/// Retries only transport/unknown-server failures. Validation and
/// rate-limit outcomes are terminal (retrying cannot change them) and the
/// final exhausted attempt's error is surfaced verbatim.
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: if attempts == 0 { 1 } else { attempts },
            base_delay,
        }
    }

    pub fn run(
        &self,
        transport: &dyn Transport,
        sleeper: &dyn Sleeper,
        payload: &contact_relay_core::SubmissionRequest,
    ) -> Result<SubmissionOutcome> {
        let mut last_err: Option<Error> = None;

        for attempt in 1..=self.attempts {
            match transport.post(payload) {
                Ok(outcome) if outcome.success => return Ok(outcome),
                Ok(outcome) => {
                    let err = Error::from_status(
                        outcome.http_status(),
                        outcome.error.as_deref().unwrap_or("unknown server error"),
                    );
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    last_err = Some(err);
                }
                Err(err) => {
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    last_err = Some(err);
                }
            }

            if attempt < self.attempts {
                let delay = self.base_delay * attempt;
                debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying submission");
                sleeper.sleep(delay);
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Transport("no attempt was made".to_string())))
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// What one submit call produced, from the UI's point of view.
#[derive(Debug)]
pub enum SubmitResult {
    /// Server accepted; draft and busy state are already cleaned up.
    Accepted(SubmissionOutcome),
    /// Local validation failed; errors belong inline next to fields.
    Invalid(ValidationResult),
    /// Terminal rejection or exhausted retries.
    Rejected(Error),
    /// Another submission is already in flight.
    Busy,
}

pub struct SubmissionController {
    ctx: Arc<AppContext>,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    drafts: DraftKeeper,
    busy: AtomicBool,
}

impl SubmissionController {
    #[must_use]
    pub fn new(
        ctx: Arc<AppContext>,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let policy = RetryPolicy::new(ctx.config.retry_attempts, ctx.config.retry_base_delay);
        let drafts = DraftKeeper::new(Arc::clone(&ctx));
        Self {
            ctx,
            transport,
            sleeper,
            policy,
            drafts,
            busy: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn drafts(&self) -> &DraftKeeper {
        &self.drafts
    }

    /// Run the full client-side submission flow for the current form state.
    pub fn submit(&self, draft: &SubmissionDraft, now: DateTime<Utc>) -> SubmitResult {
        if self.busy.swap(true, Ordering::AcqRel) {
            return SubmitResult::Busy;
        }
        let result = self.submit_inner(draft, now);
        self.busy.store(false, Ordering::Release);
        result
    }

    fn submit_inner(&self, draft: &SubmissionDraft, now: DateTime<Utc>) -> SubmitResult {
        // Rate limit before validation: a blocked actor gets the terminal
        // answer immediately, whatever the form contains.
        if !self.rate_limit_allows(now) {
            return SubmitResult::Rejected(Error::RateLimited);
        }

        let validation = validate_form(|field| draft.field_value(field));
        if !validation.is_valid() {
            return SubmitResult::Invalid(validation);
        }

        let language = self.ctx.language().as_str().to_string();
        let mut payload = draft.clone();
        payload.language = language;
        let request = payload.into_request(now, &user_agent());

        match self.policy.run(self.transport.as_ref(), self.sleeper.as_ref(), &request) {
            Ok(outcome) => {
                self.record_submission(now);
                self.drafts.clear();
                self.ctx.events.emit(
                    "submission:succeeded",
                    &serde_json::json!({ "subject": request.subject }),
                );
                SubmitResult::Accepted(outcome)
            }
            Err(err) => {
                warn!(error = %err, error_type = err.error_type(), "submission failed");
                self.ctx.events.emit(
                    "submission:failed",
                    &serde_json::json!({ "error": err.error_type() }),
                );
                SubmitResult::Rejected(err)
            }
        }
    }

    /// Read-only check of the local ledger (prune happens on read).
    fn rate_limit_allows(&self, now: DateTime<Utc>) -> bool {
        let mut ledger: Ledger = self
            .ctx
            .store
            .get_as(SUBMISSIONS_KEY)
            .unwrap_or_default();
        ledger.prune(self.ctx.config.rate_limit_window_secs, now.timestamp());
        ledger.allow(self.ctx.config.max_submissions)
    }

    /// A successful submission appends to the pruned ledger and persists it.
    fn record_submission(&self, now: DateTime<Utc>) {
        let mut ledger: Ledger = self
            .ctx
            .store
            .get_as(SUBMISSIONS_KEY)
            .unwrap_or_default();
        ledger.prune(self.ctx.config.rate_limit_window_secs, now.timestamp());
        ledger.record(now.timestamp());

        if let Ok(value) = serde_json::to_value(&ledger) {
            self.ctx.store.set(SUBMISSIONS_KEY, value);
        }
        self.ctx
            .store
            .set(LAST_SUBMISSION_KEY, serde_json::json!(now.timestamp()));
    }
}

fn user_agent() -> String {
    format!("contact-relay-client/{}", env!("CARGO_PKG_VERSION"))
}
