//! Delivery of the alert email over an authenticated STARTTLS relay.

use crate::{Error, Result};
use crate::config::Credentials;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// Fixed parts of the alert email and the relay it goes through.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub relay: String,
    pub port: u16,
    pub recipient: String,
    pub subject: String,
}

/// Build the HTML alert sent from `sender`. An empty `html` still makes a message.
pub fn build_message(settings: &MailSettings, sender: &str, html: String) -> Result<Message> {
    Ok(Message::builder()
        .from(sender.parse()?)
        .to(settings.recipient.parse()?)
        .subject(settings.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(html)?)
}

/// Send exactly one alert email through the STARTTLS relay in `settings`.
/// Login and delivery errors are returned as-is.
pub async fn send_alert(settings: &MailSettings, credentials: &Credentials, html: String) -> Result<()> {
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.relay)?
        .port(settings.port)
        .credentials(SmtpCredentials::new(
            credentials.username.clone(),
            credentials.password.clone(),
        ))
        .build();

    dispatch(&mailer, settings, &credentials.username, html).await?;
    info!("sent alert to {} via {}:{}", settings.recipient, settings.relay, settings.port);
    Ok(())
}

/// Build the alert from `sender` and hand it to `transport` once.
pub async fn dispatch<T>(transport: &T, settings: &MailSettings, sender: &str, html: String) -> Result<()>
where
    T: AsyncTransport + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    let message = build_message(settings, sender, html)?;
    deliver(transport, message).await
}

/// Send `message` over `transport`.
pub async fn deliver<T>(transport: &T, message: Message) -> Result<()>
where
    T: AsyncTransport + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    transport
        .send(message)
        .await
        .map_err(|e| Error::Delivery(Box::new(e)))?;
    Ok(())
}
