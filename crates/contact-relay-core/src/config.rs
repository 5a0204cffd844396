//! Configuration management for Contact Relay
//!
//! Configuration is loaded from environment variables with a working-directory
//! `.env` fallback, so a bare deployment can drop a single file next to the
//! binary instead of exporting variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Main configuration struct for Contact Relay
#[derive(Debug, Clone)]
pub struct Config {
    // HTTP
    pub http_host: String,
    pub http_port: u16,
    /// Path the intake endpoint is mounted on (normalized, leading slash).
    pub http_path: String,

    // Mail
    pub mail_from_address: String,
    pub mail_from_name: String,
    pub mail_to_address: String,
    pub mail_to_name: String,
    /// Sendmail-compatible command the dispatcher pipes messages into.
    pub sendmail_command: String,

    // Rate limiting (server-side; the client carries its own fixed limits)
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,

    // Security
    /// Expected consent token; when unset, supplied tokens are not checked.
    pub consent_token: Option<String>,

    // Persistence
    /// Directory holding one ledger file per actor.
    pub ledger_dir: PathBuf,
    /// Append-only JSON-lines submission audit log.
    pub audit_log_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables (+ `.env` fallback).
    #[must_use]
    pub fn from_env() -> Self {
        let ledger_dir = env_value("CONTACT_LEDGER_DIR")
            .map_or_else(|| env::temp_dir().join("contact-relay-ledgers"), PathBuf::from);
        let audit_log_path = env_value("CONTACT_AUDIT_LOG")
            .map_or_else(|| PathBuf::from("logs/submissions.jsonl"), PathBuf::from);

        Self {
            http_host: env_string("CONTACT_HTTP_HOST", "127.0.0.1"),
            http_port: env_u16("CONTACT_HTTP_PORT", 8780),
            http_path: normalize_path(&env_string("CONTACT_HTTP_PATH", "/contact")),
            mail_from_address: env_string("MAIL_FROM_ADDRESS", "noreply@example.com"),
            mail_from_name: env_string("MAIL_FROM_NAME", "Contact Relay"),
            mail_to_address: env_string("MAIL_TO_ADDRESS", "info@example.com"),
            mail_to_name: env_string("MAIL_TO_NAME", "Site Owner"),
            sendmail_command: env_string("SENDMAIL_COMMAND", "/usr/sbin/sendmail"),
            rate_limit_max: env_u32("CONTACT_RATE_LIMIT", 5),
            rate_limit_window_secs: env_u64("CONTACT_RATE_LIMIT_WINDOW", 3600),
            consent_token: env_value("CONTACT_CONSENT_TOKEN").filter(|v| !v.trim().is_empty()),
            ledger_dir,
            audit_log_path,
        }
    }

    /// Global config instance, loaded once on first access.
    pub fn global() -> &'static Self {
        static CONFIG: OnceLock<Config> = OnceLock::new();
        CONFIG.get_or_init(Self::from_env)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Normalize an endpoint path: leading slash, no trailing slash (except root).
fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return "/".to_string();
    }
    let mut out = trimmed.to_string();
    if !out.starts_with('/') {
        out.insert(0, '/');
    }
    let result = out.trim_end_matches('/');
    if result.is_empty() { "/" } else { result }.to_string()
}

// ---------------------------------------------------------------------------
// Environment access with .env fallback
// ---------------------------------------------------------------------------

/// Read a value from the real environment first, falling back to `.env`
/// in the working directory.
#[must_use]
pub fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().or_else(|| dotenv_value(key))
}

fn dotenv_value(key: &str) -> Option<String> {
    static DOTENV: OnceLock<HashMap<String, String>> = OnceLock::new();
    DOTENV
        .get_or_init(|| load_dotenv_file(Path::new(".env")))
        .get(key)
        .cloned()
}

fn load_dotenv_file(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    parse_dotenv_contents(&contents)
}

/// Parse `KEY=value` lines, skipping comments and blanks. `export ` prefixes
/// and surrounding single/double quotes are stripped.
#[must_use]
pub fn parse_dotenv_contents(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        map.insert(key.to_string(), value.to_string());
    }
    map
}

fn env_string(key: &str, default: &str) -> String {
    env_value(key).unwrap_or_else(|| default.to_string())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
