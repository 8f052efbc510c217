//! Quote request delivery.
//!
//! Accepted quote requests leave the storefront through [`QuoteDelivery`]:
//! either as a structured log event (no SMTP configured) or as a multipart
//! email to the sales inbox via lettre.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use preforma_core::QuoteRequest;

use crate::config::QuoteEmailConfig;

/// HTML body of the sales notification.
#[derive(Template)]
#[template(path = "email/quote_request.html")]
struct QuoteRequestEmailHtml<'a> {
    request: &'a QuoteRequest,
    submitted_at: String,
}

/// Plain text body of the sales notification.
#[derive(Template)]
#[template(path = "email/quote_request.txt")]
struct QuoteRequestEmailText<'a> {
    request: &'a QuoteRequest,
    submitted_at: String,
}

/// Errors that can occur when delivering a quote request.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Where accepted quote requests go.
#[derive(Clone)]
pub enum QuoteDelivery {
    /// Record the request in the log only.
    Log,
    /// Email the request to the sales inbox.
    Email(QuoteMailer),
}

impl std::fmt::Debug for QuoteDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Log => f.write_str("QuoteDelivery::Log"),
            Self::Email(mailer) => f
                .debug_tuple("QuoteDelivery::Email")
                .field(&mailer.sales_address)
                .finish(),
        }
    }
}

impl QuoteDelivery {
    /// Email delivery when SMTP is configured, log delivery otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP transport or addresses are invalid.
    pub fn from_config(config: Option<&QuoteEmailConfig>) -> Result<Self, DeliveryError> {
        config.map_or(Ok(Self::Log), |config| {
            QuoteMailer::new(config).map(Self::Email)
        })
    }

    /// Hand a request over for delivery.
    ///
    /// # Errors
    ///
    /// Returns error if the email cannot be rendered or sent.
    pub async fn deliver(&self, request: &QuoteRequest) -> Result<(), DeliveryError> {
        match self {
            Self::Log => {
                tracing::info!(
                    company = %request.company,
                    city = %request.city,
                    email = %request.email,
                    phone = %request.phone,
                    estimated_volume = %request.estimated_volume,
                    lines = request.items.len(),
                    total_items = request.total_items,
                    "quote request received"
                );
                for item in &request.items {
                    tracing::debug!(
                        product_id = %item.product.id,
                        quantity = %item.quantity,
                        "quote request line"
                    );
                }
                Ok(())
            }
            Self::Email(mailer) => mailer.send(request).await,
        }
    }
}

/// SMTP sender for quote requests.
#[derive(Clone)]
pub struct QuoteMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
    sales_address: Mailbox,
}

impl QuoteMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay or either address is invalid.
    pub fn new(config: &QuoteEmailConfig) -> Result<Self, DeliveryError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: parse_mailbox(&config.from_address)?,
            sales_address: parse_mailbox(&config.sales_address)?,
        })
    }

    async fn send(&self, request: &QuoteRequest) -> Result<(), DeliveryError> {
        let email = build_message(
            request,
            self.from_address.clone(),
            self.sales_address.clone(),
        )?;
        self.mailer.send(email).await?;

        tracing::info!(
            to = %self.sales_address,
            company = %request.company,
            "quote request emailed"
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse()
        .map_err(|_| DeliveryError::InvalidAddress(address.to_string()))
}

/// Build the multipart notification, replying to the requester.
fn build_message(
    request: &QuoteRequest,
    from: Mailbox,
    to: Mailbox,
) -> Result<Message, DeliveryError> {
    let submitted_at = request.submitted_at.format("%Y-%m-%d %H:%M UTC").to_string();
    let html = QuoteRequestEmailHtml {
        request,
        submitted_at: submitted_at.clone(),
    }
    .render()?;
    let text = QuoteRequestEmailText {
        request,
        submitted_at,
    }
    .render()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .reply_to(parse_mailbox(request.email.as_str())?)
        .subject(format!("Solicitud de cotización - {}", request.company))
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html),
                ),
        )?;

    Ok(message)
}
