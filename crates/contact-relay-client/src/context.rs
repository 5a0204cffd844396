//! Application context and event bus.
//!
//! Components receive an `Arc<AppContext>` at construction instead of
//! reaching for ambient globals: configuration, the local store, the current
//! language, and a publish/subscribe event bus all hang off the context.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use crate::store::LocalStore;

/// UI language. The form is bilingual; everything else follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
        }
    }

    /// Parse a language tag, defaulting to German for anything unknown.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().to_ascii_lowercase().starts_with("en") {
            Self::En
        } else {
            Self::De
        }
    }
}

/// Client-side configuration. These are UX constants rather than deployment
/// settings, so they live in code with a [`Default`] rather than in the
/// environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Absolute URL of the intake endpoint.
    pub endpoint_url: String,
    /// Backing file for the local key-value store.
    pub storage_path: PathBuf,
    /// Namespace prefix for every store key.
    pub storage_prefix: String,
    /// Local rate limit: submissions allowed per window.
    pub max_submissions: u32,
    /// Local rate limit window.
    pub rate_limit_window_secs: u64,
    /// Network attempts per submission.
    pub retry_attempts: u32,
    /// Base backoff delay; attempt `n` waits `n * base`.
    pub retry_base_delay: Duration,
    /// Quiet period before an autosave tick fires.
    pub autosave_debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:8780/contact".to_string(),
            storage_path: PathBuf::from("contact-relay-store.json"),
            storage_prefix: "cr_".to_string(),
            max_submissions: 3,
            rate_limit_window_secs: 3600,
            retry_attempts: 3,
            retry_base_delay: Duration::from_secs(2),
            autosave_debounce: Duration::from_secs(1),
        }
    }
}

type Handler = Box<dyn Fn(&Value) + Send + Sync>;

/// Minimal publish/subscribe bus: register handlers by event name, emit
/// events with a JSON payload. Handlers run synchronously on the emitting
/// thread, in registration order.
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<HashMap<String, Vec<Handler>>>,
}

impl EventBus {
    /// Register a handler for an event name.
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    /// Emit an event to every registered handler.
    pub fn emit(&self, event: &str, payload: &Value) {
        let guard = self
            .handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(handlers) = guard.get(event) {
            for handler in handlers {
                handler(payload);
            }
        }
    }
}

/// Shared application context, passed to each component at construction.
pub struct AppContext {
    pub config: ClientConfig,
    pub store: LocalStore,
    pub events: EventBus,
    language: Mutex<Language>,
}

impl AppContext {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let store = LocalStore::open(config.storage_path.clone(), config.storage_prefix.clone());
        Self {
            config,
            store,
            events: EventBus::default(),
            language: Mutex::new(Language::default()),
        }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        *self
            .language
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Switch language and notify subscribers.
    pub fn set_language(&self, language: Language) {
        {
            let mut guard = self
                .language
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if *guard == language {
                return;
            }
            *guard = language;
        }
        self.events.emit(
            "language:changed",
            &serde_json::json!({ "language": language.as_str() }),
        );
    }
}
