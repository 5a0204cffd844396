//! Mail dispatch.
//!
//! The intake pipeline builds the subject and HTML body and hands both to a
//! [`MailDispatcher`]. The production dispatcher pipes an RFC 822 message
//! into a sendmail-compatible command; protocol-level delivery concerns
//! (SMTP, queuing, retries) live entirely on the other side of that pipe.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use contact_relay_core::error::{Error, Result};
use contact_relay_core::models::SubmissionRequest;
use contact_relay_core::Config;
use minijinja::{Environment, context};

/// Sends one notification message. Failure surfaces as a 500-class outcome
/// and is never retried server-side.
pub trait MailDispatcher: Send + Sync {
    fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        header_overrides: &[(String, String)],
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Notification body
// ---------------------------------------------------------------------------

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.add_template(
        "contact_email.html",
        include_str!("../templates/contact_email.html"),
    )
    .expect("embedded template parses");
    env
});

/// Render the HTML notification body for one submission.
pub fn build_notification(
    request: &SubmissionRequest,
    subject_label: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let template = TEMPLATES
        .get_template("contact_email.html")
        .map_err(|e| Error::Internal(format!("template lookup: {e}")))?;
    template
        .render(context! {
            name => request.name,
            email => request.email,
            company => request.company.as_deref().unwrap_or(""),
            phone => request.phone.as_deref().unwrap_or(""),
            subject_label => subject_label,
            message => request.message,
            received_at => now.format("%d.%m.%Y %H:%M:%S").to_string(),
            page_url => request.page_url.as_deref().unwrap_or(""),
        })
        .map_err(|e| Error::Internal(format!("template render: {e}")))
}

// ---------------------------------------------------------------------------
// Sendmail dispatcher
// ---------------------------------------------------------------------------

/// Pipes messages into a sendmail-compatible command (`sendmail -t`).
pub struct SendmailDispatcher {
    command: String,
    from_address: String,
    from_name: String,
}

impl SendmailDispatcher {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            command: config.sendmail_command.clone(),
            from_address: config.mail_from_address.clone(),
            from_name: config.mail_from_name.clone(),
        }
    }

    /// Assemble the full RFC 822 message, headers first.
    fn render_message(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        header_overrides: &[(String, String)],
    ) -> String {
        let mut headers: Vec<(String, String)> = vec![
            ("MIME-Version".to_string(), "1.0".to_string()),
            (
                "Content-Type".to_string(),
                "text/html; charset=UTF-8".to_string(),
            ),
            (
                "From".to_string(),
                format!("{} <{}>", self.from_name, self.from_address),
            ),
            ("To".to_string(), to.to_string()),
            ("Subject".to_string(), sanitize_header_value(subject)),
            ("Reply-To".to_string(), self.from_address.clone()),
        ];
        for (name, value) in header_overrides {
            let value = sanitize_header_value(value);
            if let Some(existing) = headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name))
            {
                existing.1 = value;
            } else {
                headers.push((name.clone(), value));
            }
        }

        let mut out = String::new();
        for (name, value) in &headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.push_str(html_body);
        out
    }
}

impl MailDispatcher for SendmailDispatcher {
    fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        header_overrides: &[(String, String)],
    ) -> Result<()> {
        let message = self.render_message(to, subject, html_body, header_overrides);

        let mut child = Command::new(&self.command)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Dispatch(format!("spawn {}: {e}", self.command)))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(message.as_bytes())
                .map_err(|e| Error::Dispatch(format!("write message: {e}")))?;
        }
        drop(child.stdin.take());

        let status = child
            .wait()
            .map_err(|e| Error::Dispatch(format!("wait for {}: {e}", self.command)))?;
        if !status.success() {
            return Err(Error::Dispatch(format!(
                "{} exited with {status}",
                self.command
            )));
        }
        Ok(())
    }
}

/// Strip CR/LF so user-controlled values cannot inject extra headers.
fn sanitize_header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

// ---------------------------------------------------------------------------
// Capturing dispatcher (test double)
// ---------------------------------------------------------------------------

/// A captured outgoing message.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub headers: Vec<(String, String)>,
}

/// Records sends instead of delivering; optionally fails every send.
///
/// Test double behind the same capability interface as the real dispatcher,
/// so pipelines under test are wired identically to production.
#[derive(Default)]
pub struct CapturingDispatcher {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl CapturingDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A dispatcher whose every send fails, for 500-path tests.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    #[must_use]
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl MailDispatcher for CapturingDispatcher {
    fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        header_overrides: &[(String, String)],
    ) -> Result<()> {
        if self.fail {
            return Err(Error::Dispatch("capturing dispatcher set to fail".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                html_body: html_body.to_string(),
                headers: header_overrides.to_vec(),
            });
        Ok(())
    }
}
