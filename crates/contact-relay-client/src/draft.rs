//! Draft autosave.
//!
//! The in-progress form is persisted to the local store after a debounced
//! quiet period, reloaded on startup, and destroyed on successful
//! submission. Closing the form cancels any pending autosave tick instead
//! of letting it fire into a dead UI.

use std::sync::Arc;

use chrono::Utc;
use contact_relay_core::SubmissionDraft;
use tracing::debug;

use crate::context::AppContext;
use crate::schedule::Debouncer;

/// Store slot for the autosaved draft.
const DRAFT_KEY: &str = "contact_form_draft";

pub struct DraftKeeper {
    ctx: Arc<AppContext>,
    debouncer: Debouncer,
}

impl DraftKeeper {
    #[must_use]
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let debouncer = Debouncer::new(ctx.config.autosave_debounce);
        Self { ctx, debouncer }
    }

    /// Called on every field edit; persists once the burst quiets down.
    pub fn touch(&self, draft: &SubmissionDraft) {
        let ctx = Arc::clone(&self.ctx);
        let mut draft = draft.clone();
        self.debouncer.call(move || {
            draft.saved_at = Some(Utc::now());
            persist(&ctx, &draft);
        });
    }

    /// Persist immediately, bypassing the debounce (e.g. on page hide).
    pub fn save_now(&self, draft: &SubmissionDraft) {
        self.debouncer.cancel();
        let mut draft = draft.clone();
        draft.saved_at = Some(Utc::now());
        persist(&self.ctx, &draft);
    }

    /// Load the previously saved draft, if any.
    #[must_use]
    pub fn load(&self) -> Option<SubmissionDraft> {
        self.ctx.store.get_as(DRAFT_KEY)
    }

    /// Destroy the saved draft (successful submission).
    pub fn clear(&self) {
        self.debouncer.cancel();
        self.ctx.store.remove(DRAFT_KEY);
    }

    /// The form was closed: stop any pending tick without persisting.
    pub fn close(&self) {
        self.debouncer.cancel();
    }

    /// Test helper: wait for a pending autosave tick.
    pub fn flush(&self) {
        self.debouncer.flush();
    }
}

fn persist(ctx: &AppContext, draft: &SubmissionDraft) {
    match serde_json::to_value(draft) {
        Ok(value) => {
            ctx.store.set(DRAFT_KEY, value);
            ctx.events
                .emit("draft:saved", &serde_json::json!({ "at": draft.saved_at }));
            debug!("draft autosaved");
        }
        Err(err) => debug!(error = %err, "draft serialization failed"),
    }
}
