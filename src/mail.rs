//! Outbound email for the contact form.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport is not configured (EMAIL_USER / EMAIL_PASS unset)")]
    NotConfigured,

    #[error("invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// A visitor's message, already validated as non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn subject(&self) -> String {
        format!("Portfolio Contact from {}", self.name)
    }

    /// Every field is HTML-escaped before it lands in the markup.
    pub fn html_body(&self) -> String {
        format!(
            "<h2>New Contact Form Submission</h2>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{}</p>\n",
            ammonia::clean_text(&self.name),
            ammonia::clean_text(&self.email),
            ammonia::clean_text(&self.message),
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<(), MailError>;
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Operator address every contact message is delivered to.
    pub recipient: Option<String>,
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        let username = std::env::var("EMAIL_USER").ok().filter(|s| !s.is_empty());
        Self {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(465),
            password: std::env::var("EMAIL_PASS").ok().filter(|s| !s.is_empty()),
            recipient: std::env::var("CONTACT_RECIPIENT")
                .ok()
                .filter(|s| !s.is_empty())
                .or_else(|| username.clone()),
            username,
            timeout: Duration::from_secs(
                std::env::var("MAIL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

/// 465 is SMTPS; anything else (587, 25) upgrades with STARTTLS.
fn uses_implicit_tls(port: u16) -> bool {
    port == 465
}

struct SmtpInner {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

/// SMTP relay. Without credentials it still constructs, but every send fails
/// with [`MailError::NotConfigured`].
pub struct SmtpMailer {
    inner: Option<SmtpInner>,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let (username, password) = match (&config.username, &config.password) {
            (Some(u), Some(p)) => (u.clone(), p.clone()),
            _ => {
                tracing::warn!("EMAIL_USER/EMAIL_PASS not set; contact form will fail to send");
                return Ok(Self {
                    inner: None,
                    timeout: config.timeout,
                });
            }
        };

        let from: Mailbox = username.parse()?;
        let to: Mailbox = config
            .recipient
            .as_deref()
            .unwrap_or(&username)
            .parse()?;

        let builder = if uses_implicit_tls(config.smtp_port) {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };
        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(config.timeout))
            .build();

        tracing::info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            implicit_tls = uses_implicit_tls(config.smtp_port),
            "SMTP mailer configured"
        );

        Ok(Self {
            inner: Some(SmtpInner {
                transport,
                from,
                to,
            }),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &ContactMessage) -> Result<(), MailError> {
        let inner = self.inner.as_ref().ok_or(MailError::NotConfigured)?;

        let email = Message::builder()
            .from(inner.from.clone())
            .to(inner.to.clone())
            .subject(message.subject())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body())?;

        tokio::time::timeout(self.timeout, inner.transport.send(email))
            .await
            .map_err(|_| MailError::Timeout(self.timeout))??;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every message instead of sending it.
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<ContactMessage>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &ContactMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::NotConfigured);
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            message: "Loved the <b>portfolio</b> & the certs".to_string(),
        }
    }

    #[test]
    fn test_subject_uses_sender_name() {
        assert_eq!(message().subject(), "Portfolio Contact from Grace");
    }

    #[test]
    fn test_html_body_escapes_markup() {
        let body = message().html_body();
        assert!(body.contains("<p><strong>Name:</strong> Grace</p>"));
        assert!(!body.contains("<b>portfolio</b>"));
        assert!(body.contains("&lt;b&gt;portfolio"));
        assert!(body.contains("&amp;"));
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_refuses_to_send() {
        let config = MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            username: None,
            password: None,
            recipient: None,
            timeout: Duration::from_secs(1),
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        let err = mailer.send(&message()).await.unwrap_err();
        assert!(matches!(err, MailError::NotConfigured));
    }

    #[test]
    fn test_bad_recipient_is_rejected_at_construction() {
        let config = MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            username: Some("me@example.com".to_string()),
            password: Some("pw".to_string()),
            recipient: Some("not an address".to_string()),
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(MailError::Address(_))
        ));
    }

    #[test]
    fn test_tls_mode_follows_port() {
        assert!(uses_implicit_tls(465));
        assert!(!uses_implicit_tls(587));
        assert!(!uses_implicit_tls(25));
    }

    #[tokio::test]
    async fn test_submission_port_builds_starttls_transport() {
        let config = MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: Some("me@example.com".to_string()),
            password: Some("pw".to_string()),
            recipient: None,
            timeout: Duration::from_secs(1),
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        let inner = mailer.inner.as_ref().unwrap();
        assert_eq!(inner.to.email.to_string(), "me@example.com");
    }
}
