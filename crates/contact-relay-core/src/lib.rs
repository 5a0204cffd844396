//! Core types, validation, and configuration for Contact Relay.
//!
//! Everything shared between the submission controller (client half) and
//! the intake handler (server half) lives here: the wire contract, the
//! field rule table, the rate-limit ledger, spam heuristics, subject
//! translation, the error taxonomy, and configuration loading.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod fields;
pub mod ledger;
pub mod models;
pub mod spam;
pub mod subjects;

pub use config::Config;
pub use error::{Error, Result};
pub use fields::{ValidationResult, Violation, validate_field, validate_form};
pub use ledger::Ledger;
pub use models::{AuditRecord, SubmissionDraft, SubmissionOutcome, SubmissionRequest};
