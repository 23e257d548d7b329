// src/services/email.rs
//! Outbound transactional email over SMTP.
//!
//! Every call site is fire-and-forget: the send runs on a detached task,
//! failures are logged and swallowed, and handler success never depends on
//! delivery.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid message: {0}")]
    Message(String),
    #[error("smtp transport error: {0}")]
    Transport(String),
}

/// SMTP mailer configured from the environment.
///
/// When SMTP_HOST is unset the service runs disabled: sends become debug-level
/// no-ops, which is the expected mode in development and in tests.
#[derive(Clone)]
pub struct EmailService {
    smtp_host: Option<String>,
    smtp_user: String,
    smtp_pass: String,
    from_email: String,
    service_name: String,
}

impl EmailService {
    pub fn from_env() -> Self {
        Self {
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_user: env::var("SMTP_USER").unwrap_or_default(),
            smtp_pass: env::var("SMTP_PASS").unwrap_or_default(),
            from_email: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@campusboard.local".to_string()),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "CampusBoard".to_string()),
        }
    }

    /// Disabled mailer for tests
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            smtp_host: None,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            from_email: "no-reply@campusboard.local".to_string(),
            service_name: "CampusBoard".to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.smtp_host.is_some()
    }

    /// Synchronous send over an SMTP relay. Runs on a blocking thread via
    /// `send_detached`; never called directly on the request path.
    fn send_blocking(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        let host = match &self.smtp_host {
            Some(h) => h.clone(),
            None => {
                debug!(to = %to, subject = %subject, "Email disabled, skipping send");
                return Ok(());
            }
        };

        let from: Mailbox = format!("{} <{}>", self.service_name, self.from_email)
            .parse()
            .map_err(|e| EmailError::Message(format!("invalid from address: {}", e)))?;
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| EmailError::Message(format!("invalid recipient address: {}", e)))?;

        let email = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| EmailError::Message(e.to_string()))?;

        let creds = Credentials::new(self.smtp_user.clone(), self.smtp_pass.clone());

        let mailer = SmtpTransport::relay(&host)
            .map_err(|e| EmailError::Transport(e.to_string()))?
            .credentials(creds)
            .build();

        mailer
            .send(&email)
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        Ok(())
    }

    /// Fire-and-forget send: spawn, log the outcome, never retry.
    pub fn send_detached(&self, to: String, subject: String, html_body: String) {
        let service = self.clone();
        tokio::spawn(async move {
            let log_to = to.clone();
            let log_subject = subject.clone();
            let result = tokio::task::spawn_blocking(move || {
                service.send_blocking(&to, &subject, &html_body)
            })
            .await;

            match result {
                Ok(Ok(())) => {
                    info!(to = %log_to, subject = %log_subject, "Email dispatched");
                }
                Ok(Err(e)) => {
                    warn!(error = %e, to = %log_to, subject = %log_subject, "Email send failed");
                }
                Err(e) => {
                    warn!(error = %e, to = %log_to, "Email send task panicked");
                }
            }
        });
    }
}

// ============================================================================
// Templates
// ============================================================================

fn wrap_body(title: &str, inner: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #4F46E5; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{}</h1>
        </div>
        <div class="content">
            {}
        </div>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        title, inner
    )
}

pub fn welcome_email(name: &str) -> String {
    wrap_body(
        "Welcome to CampusBoard",
        &format!(
            r#"<p>Hi {},</p>
            <p>Your account has been created. You can now browse job postings,
            join alumni chapters, and use the career tools.</p>
            <p>Good luck with your search!</p>"#,
            name
        ),
    )
}

pub fn application_received_email(poster_name: &str, applicant_name: &str, job_title: &str) -> String {
    wrap_body(
        "New Application",
        &format!(
            r#"<p>Hi {},</p>
            <p><strong>{}</strong> has applied for your posting
            <strong>{}</strong>.</p>
            <p>Log in to review the application.</p>"#,
            poster_name, applicant_name, job_title
        ),
    )
}

pub fn status_change_email(applicant_name: &str, job_title: &str, status: &str) -> String {
    wrap_body(
        "Application Update",
        &format!(
            r#"<p>Hi {},</p>
            <p>Your application for <strong>{}</strong> is now marked
            <strong>{}</strong>.</p>"#,
            applicant_name, job_title, status
        ),
    )
}

pub fn password_reset_email(name: &str, token: &str) -> String {
    wrap_body(
        "Password Reset",
        &format!(
            r#"<p>Hi {},</p>
            <p>A password reset was requested for your account. Use the token
            below within the next hour:</p>
            <p><code>{}</code></p>
            <p>If you did not request this, you can ignore this email.</p>"#,
            name, token
        ),
    )
}
