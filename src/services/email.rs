//! Outgoing email for account verification.
//!
//! SMTP delivery goes through lettre; without SMTP settings the
//! [`LogMailer`] writes the message to the log instead.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::EmailConfig;

#[derive(Template)]
#[template(path = "email/verify_email.html")]
struct VerifyEmailHtml<'a> {
    username: &'a str,
    link: &'a str,
    expiry_hours: u64,
}

#[derive(Template)]
#[template(path = "email/verify_email.txt")]
struct VerifyEmailText<'a> {
    username: &'a str,
    link: &'a str,
    expiry_hours: u64,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl OutgoingEmail {
    pub fn verification(
        to: &str,
        username: &str,
        link: &str,
        expiry_hours: u64,
    ) -> Result<Self, EmailError> {
        let html_body = VerifyEmailHtml { username, link, expiry_hours }.render()?;
        let text_body = VerifyEmailText { username, link, expiry_hours }.render()?;
        Ok(Self {
            to: to.to_string(),
            subject: "Account Verification Email".to_string(),
            text_body,
            html_body,
        })
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// SMTP delivery over STARTTLS
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body),
                    ),
            )?;

        self.transport.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Development mailer: logs the plain-text body instead of sending
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email not sent:\n{}",
            email.text_body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_contains_link_and_name() {
        let email = OutgoingEmail::verification(
            "alice@example.com",
            "alice",
            "http://localhost:8000/email-verify?token=abc",
            48,
        )
        .unwrap();

        assert_eq!(email.to, "alice@example.com");
        assert!(email.text_body.contains("Hi alice"));
        assert!(email.text_body.contains("http://localhost:8000/email-verify?token=abc"));
        assert!(email.text_body.contains("48 hours"));
        assert!(email.html_body.contains("alice"));
        assert!(email.html_body.contains("token=abc"));
    }

    #[test]
    fn html_body_escapes_username() {
        let email = OutgoingEmail::verification("a@example.com", "<b>eve</b>", "http://x/", 1).unwrap();
        assert!(!email.html_body.contains("<b>eve</b>"));
    }

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let email = OutgoingEmail::verification("a@example.com", "a", "http://x/", 1).unwrap();
        assert!(LogMailer.send(email).await.is_ok());
    }
}
