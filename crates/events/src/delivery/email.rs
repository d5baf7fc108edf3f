//! Booking emails via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport and sends
//! plain-text confirmation and cancellation emails to the guest. If
//! `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns `None` and no
//! mailer should be constructed.

use async_trait::async_trait;
use innkeep_core::booking::Booking;
use innkeep_core::guest::Guest;
use innkeep_core::room::Room;
use innkeep_core::types::StayDate;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{NotificationSink, NotifyError};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@innkeep.local";

/// Default display name, also used as the property name in subjects.
const DEFAULT_FROM_NAME: &str = "Innkeep";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    /// Display name on the "From" header and in subject lines.
    pub from_name: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable         | Required | Default                  |
    /// |------------------|----------|--------------------------|
    /// | `SMTP_HOST`      | yes      |                          |
    /// | `SMTP_PORT`      | no       | `587`                    |
    /// | `SMTP_FROM`      | no       | `noreply@innkeep.local`  |
    /// | `SMTP_FROM_NAME` | no       | `Innkeep`                |
    /// | `SMTP_USER`      | no       |                          |
    /// | `SMTP_PASSWORD`  | no       |                          |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            from_name: std::env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| DEFAULT_FROM_NAME.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Message content
// ---------------------------------------------------------------------------

/// Subject and plain-text body of an outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

fn long_date(date: StayDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Confirmation email for a newly created booking.
pub fn confirmation_email(
    property: &str,
    booking: &Booking,
    guest: &Guest,
    room: &Room,
) -> EmailContent {
    let subject = format!(
        "Your Booking Confirmation #{} - {property}",
        booking.reference_number
    );
    let mut body = format!(
        "Dear {},\n\n\
         Thank you for booking with {property}.\n\n\
         Reference: {}\n\
         Room: {} ({})\n\
         Check-in: {}\n\
         Check-out: {}\n\
         Nights: {}\n\
         Guests: {}\n\
         Total: {:.2}\n",
        guest.name,
        booking.reference_number,
        room.room_number,
        room.room_type,
        long_date(booking.check_in),
        long_date(booking.check_out),
        booking.nights(),
        booking.guest_count,
        booking.total_price,
    );
    if let Some(requests) = booking.special_requests.as_deref() {
        body.push_str(&format!("Special requests: {requests}\n"));
    }
    body.push_str(
        "\nKeep your reference number and email address to look up or cancel this booking.\n",
    );
    EmailContent { subject, body }
}

/// Cancellation notice, including whether a fee was charged.
pub fn cancellation_email(
    property: &str,
    booking: &Booking,
    guest: &Guest,
    room: &Room,
) -> EmailContent {
    let subject = format!(
        "Booking Cancellation #{} - {property}",
        booking.reference_number
    );
    let fee_text = if booking.cancellation_fee > 0.0 {
        format!(
            "A cancellation fee of {:.2} has been applied.",
            booking.cancellation_fee
        )
    } else {
        "No cancellation fee has been applied.".to_string()
    };
    let cancelled_on = booking
        .cancelled_at
        .map(|at| long_date(at.date_naive()))
        .unwrap_or_else(|| "today".to_string());
    let body = format!(
        "Dear {},\n\n\
         Your booking {} for room {} from {} to {} was cancelled on {cancelled_on}.\n\
         {fee_text}\n\n\
         We hope to welcome you another time.\n",
        guest.name,
        booking.reference_number,
        room.room_number,
        long_date(booking.check_in),
        long_date(booking.check_out),
    );
    EmailContent { subject, body }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends booking emails to guests over SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Build the SMTP transport. No connection is made until the first send.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let from = Mailbox::new(Some(config.from_name.clone()), config.from_address.parse()?);

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from,
            mailer: transport_builder.build(),
            config,
        })
    }

    async fn send(&self, guest: &Guest, content: EmailContent) -> Result<(), NotifyError> {
        if guest.email.is_empty() {
            return Err(NotifyError::MissingRecipient(guest.id));
        }

        let email = Message::builder()
            .from(self.from.clone())
            .to(guest.email.parse().map_err(EmailError::from)?)
            .subject(content.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(content.body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.mailer.send(email).await.map_err(EmailError::from)?;

        tracing::info!(to = %guest.email, subject = %content.subject, "Booking email sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for EmailDelivery {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn booking_created(
        &self,
        booking: &Booking,
        guest: &Guest,
        room: &Room,
    ) -> Result<(), NotifyError> {
        let content = confirmation_email(&self.config.from_name, booking, guest, room);
        self.send(guest, content).await
    }

    async fn booking_cancelled(
        &self,
        booking: &Booking,
        guest: &Guest,
        room: &Room,
    ) -> Result<(), NotifyError> {
        let content = cancellation_email(&self.config.from_name, booking, guest, room);
        self.send(guest, content).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
