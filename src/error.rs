use thiserror::Error;

/// Error type shared by every stage of the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("browser automation failed: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
    #[error("invalid browser configuration: {0}")]
    BrowserConfig(String),
    #[error("no element matches selector '{selector}'")]
    ElementNotFound { selector: String },
    #[error("invalid css selector '{0}'")]
    Selector(String),
    #[error("rating '{rating}' for '{title}' is not a number")]
    InvalidRating { title: String, rating: String },
    #[error("secret '{0}' is not set")]
    MissingSecret(String),
    #[error("could not build email: {0}")]
    Mail(#[from] lettre::error::Error),
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("mail delivery failed: {0}")]
    Delivery(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn not_found(selector: &str) -> Self {
        Error::ElementNotFound {
            selector: selector.to_string(),
        }
    }
}
