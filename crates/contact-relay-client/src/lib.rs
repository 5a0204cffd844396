//! Client half of Contact Relay: the submission controller and its UI
//! plumbing.
//!
//! Everything is wired through an explicit [`context::AppContext`] (config,
//! local store, language, event bus) handed to each component at
//! construction. The controller validates locally, applies a local rate
//! limit, and posts with retry-and-backoff; drafts autosave on a debounced
//! timer; user feedback is localized and toast/inline-aware.

#![forbid(unsafe_code)]

pub mod auth;
pub mod context;
pub mod draft;
pub mod feedback;
pub mod modal;
pub mod schedule;
pub mod store;
pub mod submit;
pub mod transport;

pub use context::{AppContext, ClientConfig, EventBus, Language};
pub use draft::DraftKeeper;
pub use feedback::{Toast, ToastKind, toast_for, violation_message};
pub use modal::Modal;
pub use submit::{RetryPolicy, Sleeper, SubmissionController, SubmitResult, ThreadSleeper};
pub use transport::{HttpTransport, Transport};
