use crate::store::Booking;
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

const SUBJECT: &str = "Booking Confirmation - Sports Hub";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("{0}")]
    Other(String),
}

/// What the confirmation email says and who it goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub to: String,
    pub name: String,
    pub ground: String,
    pub date: String,
    pub time_slot: String,
}

impl From<&Booking> for Confirmation {
    fn from(booking: &Booking) -> Self {
        Self {
            to: booking.email.clone(),
            name: booking.name.clone(),
            ground: booking.ground.clone(),
            date: booking.date.clone(),
            time_slot: booking.time_slot.clone(),
        }
    }
}

impl Confirmation {
    pub fn message(&self, from: &str) -> Result<Message, MailError> {
        Ok(Message::builder()
            .from(from.parse()?)
            .to(self.to.parse()?)
            .subject(self.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body())?)
    }

    pub fn subject(&self) -> &'static str {
        SUBJECT
    }

    pub fn body(&self) -> String {
        format!(
            "Dear {},\n\nYour booking for {} on {} at {} has been confirmed.\n\nThank you for using our service!\n\nRegards,\nSports Hub",
            self.name, self.ground, self.date, self.time_slot
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, confirmation: &Confirmation) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(host: &str, user: &str, password: &str) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        Ok(Self {
            transport,
            from: user.to_string(),
        })
    }

    /// Opens a connection to the relay and logs the outcome. A broken mail
    /// setup does not stop the server, bookings still go through.
    pub async fn verify(&self) {
        match self.transport.test_connection().await {
            Ok(true) => info!("Mailer is ready to send emails"),
            Ok(false) => error!("Mailer configuration error: relay refused the connection"),
            Err(e) => error!("Mailer configuration error: {}", e),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, confirmation: &Confirmation) -> Result<(), MailError> {
        let message = confirmation.message(&self.from)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Sends the confirmation on its own task. The outcome is only logged.
pub fn dispatch(mailer: Arc<dyn Mailer>, confirmation: Confirmation) -> JoinHandle<()> {
    tokio::spawn(async move {
        match mailer.send(&confirmation).await {
            Ok(()) => info!("Email sent to: {}", confirmation.to),
            Err(e) => error!("Email sending error for {}: {}", confirmation.to, e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn confirmation(to: &str) -> Confirmation {
        Confirmation::from(&Booking {
            ground: "CourtA".to_string(),
            date: "2024-06-01".to_string(),
            time_slot: "10:00-11:00".to_string(),
            name: "Alice".to_string(),
            email: to.to_string(),
            phone: "555-0100".to_string(),
        })
    }

    #[test]
    fn body_names_person_and_slot() {
        let c = confirmation("alice@example.com");
        assert_eq!(c.subject(), "Booking Confirmation - Sports Hub");
        assert_eq!(
            c.body(),
            "Dear Alice,\n\nYour booking for CourtA on 2024-06-01 at 10:00-11:00 has been confirmed.\n\nThank you for using our service!\n\nRegards,\nSports Hub"
        );
    }

    #[test]
    fn message_rejects_malformed_recipient() {
        assert!(confirmation("alice@example.com")
            .message("hub@example.com")
            .is_ok());
        assert!(matches!(
            confirmation("not an address").message("hub@example.com"),
            Err(MailError::Address(_))
        ));
    }

    struct Failing(AtomicUsize);

    #[async_trait]
    impl Mailer for Failing {
        async fn send(&self, _: &Confirmation) -> Result<(), MailError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(MailError::Other("relay down".to_string()))
        }
    }

    #[tokio::test]
    async fn dispatch_swallows_failures_without_retry() {
        let mailer = Arc::new(Failing(AtomicUsize::new(0)));

        dispatch(mailer.clone(), confirmation("alice@example.com"))
            .await
            .unwrap();
        assert_eq!(mailer.0.load(Ordering::SeqCst), 1);
    }
}
