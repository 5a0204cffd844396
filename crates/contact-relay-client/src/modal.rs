//! Modal dialogs as a closed set of variants.
//!
//! Each modal kind carries its own typed content payload and is dispatched
//! by exhaustive matching, so adding a kind is a compile-visible change
//! rather than a new entry in a string-keyed lookup table.

use contact_relay_core::SubmissionDraft;

use crate::context::Language;

/// Prefilled contact form state.
#[derive(Debug, Clone, Default)]
pub struct ContactContent {
    pub draft: SubmissionDraft,
}

/// Login form state (demo auth).
#[derive(Debug, Clone, Default)]
pub struct LoginContent {
    pub email: String,
    pub remember: bool,
}

/// Cookie consent categories and their current switches.
#[derive(Debug, Clone)]
pub struct CookieContent {
    pub essential: bool,
    pub functional: bool,
    pub analytics: bool,
}

impl Default for CookieContent {
    fn default() -> Self {
        // Essential cookies cannot be switched off.
        Self {
            essential: true,
            functional: false,
            analytics: false,
        }
    }
}

/// Static legal text (imprint, privacy policy).
#[derive(Debug, Clone)]
pub struct LegalContent {
    pub heading: String,
    pub body: String,
}

/// The closed set of modal dialogs.
#[derive(Debug, Clone)]
pub enum Modal {
    Contact(ContactContent),
    Login(LoginContent),
    CookieSettings(CookieContent),
    Legal(LegalContent),
}

impl Modal {
    /// Localized dialog title.
    #[must_use]
    pub fn title(&self, language: Language) -> String {
        match self {
            Self::Contact(_) => match language {
                Language::De => "Kontakt aufnehmen".to_string(),
                Language::En => "Get in touch".to_string(),
            },
            Self::Login(_) => match language {
                Language::De => "Anmelden".to_string(),
                Language::En => "Sign in".to_string(),
            },
            Self::CookieSettings(_) => match language {
                Language::De => "Cookie-Einstellungen".to_string(),
                Language::En => "Cookie settings".to_string(),
            },
            Self::Legal(content) => content.heading.clone(),
        }
    }

    /// Whether closing this modal should cancel a pending draft autosave.
    #[must_use]
    pub const fn owns_draft(&self) -> bool {
        matches!(self, Self::Contact(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_localized() {
        let modal = Modal::Contact(ContactContent::default());
        assert_eq!(modal.title(Language::De), "Kontakt aufnehmen");
        assert_eq!(modal.title(Language::En), "Get in touch");
    }

    #[test]
    fn legal_modal_uses_its_own_heading() {
        let modal = Modal::Legal(LegalContent {
            heading: "Impressum".to_string(),
            body: String::new(),
        });
        assert_eq!(modal.title(Language::En), "Impressum");
    }

    #[test]
    fn only_the_contact_modal_owns_a_draft() {
        assert!(Modal::Contact(ContactContent::default()).owns_draft());
        assert!(!Modal::Login(LoginContent::default()).owns_draft());
        assert!(!Modal::CookieSettings(CookieContent::default()).owns_draft());
    }

    #[test]
    fn cookie_defaults_keep_essential_on() {
        let content = CookieContent::default();
        assert!(content.essential);
        assert!(!content.analytics);
    }
}
