//! # rb-mail-smtp
//!
//! `Mailer` over an authenticated STARTTLS SMTP relay.
//! Each contact submission becomes one plaintext email sent from the site
//! owner's address to itself. No retries.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rb_core::error::{AppError, Result};
use rb_core::models::ContactMessage;
use rb_core::traits::Mailer;
use secrecy::{ExposeSecret, SecretString};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    owner: Mailbox,
}

impl SmtpMailer {
    /// Prepares the relay; no connection is opened until the first send.
    pub fn new(
        host: &str,
        port: u16,
        owner_address: &str,
        app_password: &SecretString,
    ) -> Result<Self> {
        let owner = parse_mailbox(owner_address)?;
        let credentials = Credentials::new(
            owner_address.to_string(),
            app_password.expose_secret().to_string(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Mail(format!("invalid relay {host}: {e}")))?
            .port(port)
            .credentials(credentials)
            .build();

        tracing::info!(host, port, owner = %owner_address, "smtp mailer configured");
        Ok(Self { transport, owner })
    }

    /// Uses an already-built transport, e.g. a plaintext relay on localhost.
    pub fn with_transport(
        transport: AsyncSmtpTransport<Tokio1Executor>,
        owner_address: &str,
    ) -> Result<Self> {
        Ok(Self { transport, owner: parse_mailbox(owner_address)? })
    }

    fn build_message(&self, message: &ContactMessage) -> Result<Message> {
        Message::builder()
            .from(self.owner.clone())
            .to(self.owner.clone())
            .subject(message.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body())
            .map_err(|e| AppError::Mail(format!("could not build message: {e}")))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::Mail(format!("invalid owner address {address:?}: {e}")))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_contact(&self, message: &ContactMessage) -> Result<()> {
        let email = self.build_message(message)?;
        match self.transport.send(email).await {
            Ok(response) => {
                tracing::debug!(code = %response.code(), "smtp relay accepted message");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "smtp relay failed");
                Err(AppError::Mail(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactMessage {
        ContactMessage {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            phone: "555-0100".to_string(),
            message: "Loved the post".to_string(),
        }
    }

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(
            "smtp.example.com",
            587,
            "owner@example.com",
            &SecretString::from("app-password".to_string()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_message_goes_from_and_to_the_owner() {
        let email = mailer().build_message(&contact()).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();

        assert!(raw.contains("From: owner@example.com"));
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Subject: Message from Grace"));
        assert!(raw.contains("email: grace@example.com"));
        assert!(raw.contains("phone: 555-0100"));
        assert!(raw.contains("message: Loved the post"));
    }

    #[test]
    fn test_bad_owner_address_is_rejected() {
        let password = SecretString::from("x".to_string());
        let err = SmtpMailer::new("smtp.example.com", 587, "not an address", &password)
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Mail(_)));
    }

    #[tokio::test]
    async fn test_unreachable_relay_surfaces_mail_error() {
        // Nothing listens on port 1.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("127.0.0.1")
            .port(1)
            .build();
        let mailer = SmtpMailer::with_transport(transport, "owner@example.com").unwrap();

        let err = mailer.send_contact(&contact()).await.unwrap_err();
        assert!(matches!(err, AppError::Mail(_)));
    }
}
