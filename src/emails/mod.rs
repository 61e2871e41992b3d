use async_trait::async_trait;
use std::sync::Mutex;

/// Recipient of an account email, carrying the one-shot code to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailRecipient {
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail delivery error: {0}")]
    Delivery(String),
}

/// Outbound mail dispatch. Delivery itself is an external collaborator; this
/// seam exists so handlers hand the issued token to an injected observer
/// instead of a process-global.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation_email(&self, recipient: &EmailRecipient)
        -> Result<(), MailerError>;

    async fn send_password_reset_email(
        &self,
        recipient: &EmailRecipient,
    ) -> Result<(), MailerError>;
}

/// Default mailer: records dispatch through tracing. The actual transport is
/// wired in by the deployment, not by this crate.
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_confirmation_email(
        &self,
        recipient: &EmailRecipient,
    ) -> Result<(), MailerError> {
        tracing::info!(
            to = %recipient.email,
            subject = "Confirma tu cuenta en CashTrackr",
            "confirmation email dispatched"
        );
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        recipient: &EmailRecipient,
    ) -> Result<(), MailerError> {
        tracing::info!(
            to = %recipient.email,
            subject = "Reestablece tu password en CashTrackr",
            "password reset email dispatched"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmailKind {
    Confirmation,
    PasswordReset,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub kind: EmailKind,
    pub recipient: EmailRecipient,
}

/// Capturing mailer for tests: keeps every dispatched email, including the
/// issued token, so scenarios can complete the confirmation and reset flows.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_token(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|e| e.recipient.token.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_confirmation_email(
        &self,
        recipient: &EmailRecipient,
    ) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentEmail {
            kind: EmailKind::Confirmation,
            recipient: recipient.clone(),
        });
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        recipient: &EmailRecipient,
    ) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentEmail {
            kind: EmailKind::PasswordReset,
            recipient: recipient.clone(),
        });
        Ok(())
    }
}
