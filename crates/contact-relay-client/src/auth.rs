//! Demo authentication behind a capability interface.
//!
//! The mock carries a hard-coded credential list and trusts its own clock
//! for session expiry: a prototype stand-in, not an identity system. It
//! sits behind the same [`AuthService`] seam a real backend would, so
//! swapping it out never touches callers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::AppContext;

/// Store slot for the current session.
const SESSION_KEY: &str = "user_session";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub email: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("session expired")]
    SessionExpired,
}

/// The capability a login flow needs; nothing more.
pub trait AuthService: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError>;
}

/// Mock service with fixed demo credentials and a 30-minute session.
pub struct MockAuthService {
    credentials: Vec<(String, String, String)>,
    session_timeout: Duration,
}

impl MockAuthService {
    /// The demo credential set.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            credentials: vec![
                (
                    "admin@example.com".to_string(),
                    "admin123".to_string(),
                    "Admin".to_string(),
                ),
                (
                    "demo@example.com".to_string(),
                    "demo123".to_string(),
                    "Demo User".to_string(),
                ),
                (
                    "test@test.com".to_string(),
                    "test123".to_string(),
                    "Test User".to_string(),
                ),
            ],
            session_timeout: Duration::minutes(30),
        }
    }
}

impl AuthService for MockAuthService {
    fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError> {
        let email = credentials.email.trim().to_ascii_lowercase();
        self.credentials
            .iter()
            .find(|(known_email, password, _)| {
                *known_email == email && *password == credentials.password
            })
            .map(|(email, _, name)| AuthenticatedUser {
                email: email.clone(),
                name: name.clone(),
                expires_at: Utc::now() + self.session_timeout,
            })
            .ok_or(AuthError::InvalidCredentials)
    }
}

// ---------------------------------------------------------------------------
// Session persistence
// ---------------------------------------------------------------------------

/// Store a session in the local store.
pub fn store_session(ctx: &AppContext, user: &AuthenticatedUser) {
    if let Ok(value) = serde_json::to_value(user) {
        ctx.store.set(SESSION_KEY, value);
    }
}

/// Restore a stored session; expired sessions are cleared and reported.
pub fn restore_session(
    ctx: &AppContext,
    now: DateTime<Utc>,
) -> Result<Option<AuthenticatedUser>, AuthError> {
    let Some(user) = ctx.store.get_as::<AuthenticatedUser>(SESSION_KEY) else {
        return Ok(None);
    };
    if user.expires_at <= now {
        ctx.store.remove(SESSION_KEY);
        return Err(AuthError::SessionExpired);
    }
    Ok(Some(user))
}

/// Log out: drop the stored session.
pub fn clear_session(ctx: &AppContext) {
    ctx.store.remove(SESSION_KEY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClientConfig;
    use std::sync::Arc;

    fn context(dir: &std::path::Path) -> Arc<AppContext> {
        Arc::new(AppContext::new(ClientConfig {
            storage_path: dir.join("store.json"),
            ..ClientConfig::default()
        }))
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
            remember: false,
        }
    }

    #[test]
    fn demo_credentials_authenticate() {
        let auth = MockAuthService::demo();
        let user = auth.authenticate(&creds("demo@example.com", "demo123")).unwrap();
        assert_eq!(user.name, "Demo User");
        assert!(user.expires_at > Utc::now());
    }

    #[test]
    fn email_matching_is_case_insensitive() {
        let auth = MockAuthService::demo();
        assert!(auth.authenticate(&creds("Demo@Example.com", "demo123")).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = MockAuthService::demo();
        assert_eq!(
            auth.authenticate(&creds("demo@example.com", "nope")),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn session_round_trips_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let auth = MockAuthService::demo();
        let user = auth.authenticate(&creds("demo@example.com", "demo123")).unwrap();

        store_session(&ctx, &user);
        let restored = restore_session(&ctx, Utc::now()).unwrap().unwrap();
        assert_eq!(restored, user);

        clear_session(&ctx);
        assert!(restore_session(&ctx, Utc::now()).unwrap().is_none());
    }

    #[test]
    fn expired_session_is_cleared_on_restore() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let user = AuthenticatedUser {
            email: "demo@example.com".to_string(),
            name: "Demo User".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        };
        store_session(&ctx, &user);

        assert_eq!(
            restore_session(&ctx, Utc::now()),
            Err(AuthError::SessionExpired)
        );
        // The stale session is gone afterwards.
        assert!(restore_session(&ctx, Utc::now()).unwrap().is_none());
    }
}
