use crate::report::RATING_THRESHOLD;
use crate::{Error, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "showtime-ratings",
    about = "Email the well-rated movies currently showing at a theater",
    version,
    long_about = None
)]
pub struct Args {
    /// Theater showtimes page. `{date}` is replaced with today's date (YYYY-MM-DD)
    #[arg(long, env = "THEATER_URL")]
    pub theater_url: String,

    /// Rating site homepage with the title search box
    #[arg(long, env = "RATING_URL", default_value = "https://www.imdb.com/")]
    pub rating_url: String,

    /// Chrome/Chromium executable (auto-detected when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome: Option<PathBuf>,

    /// Address the alert is sent to (not needed with --dry-run)
    #[arg(long, env = "ALERT_RECIPIENT", required_unless_present = "dry_run")]
    pub recipient: Option<String>,

    /// Subject line of the alert
    #[arg(long, default_value = "Movie Ratings and Descriptions")]
    pub subject: String,

    /// Minimum rating a movie needs to be included
    #[arg(long, default_value_t = RATING_THRESHOLD)]
    pub threshold: f64,

    /// SMTP relay host
    #[arg(long, default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// SMTP submission port (STARTTLS)
    #[arg(long, default_value_t = 587)]
    pub smtp_port: u16,

    /// Print the results instead of sending the email
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Theater URL for today's showtimes.
    pub fn theater_url_for_today(&self) -> String {
        theater_url_for(&self.theater_url, Local::now().date_naive())
    }
}

/// Substitute `{date}` in `template` with `date` as YYYY-MM-DD.
pub fn theater_url_for(template: &str, date: NaiveDate) -> String {
    template.replace("{date}", &date.format("%Y-%m-%d").to_string())
}

/// Where secrets come from.
pub trait SecretSource {
    fn get(&self, name: &str) -> Result<String>;
}

/// Process environment, seeded once from a `.env` file if one exists.
pub struct EnvSecrets;

impl EnvSecrets {
    pub fn load() -> Self {
        // a missing .env is fine; the variables may already be exported
        dotenv::dotenv().ok();
        EnvSecrets
    }
}

impl SecretSource for EnvSecrets {
    fn get(&self, name: &str) -> Result<String> {
        std::env::var(name).map_err(|_| Error::MissingSecret(name.to_string()))
    }
}

pub const USERNAME_VAR: &str = "ACC_USERNAME";
pub const PASSWORD_VAR: &str = "PASSWORD";

/// Mail account used both to log in to the relay and as the sender.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn resolve(secrets: &dyn SecretSource) -> Result<Self> {
        Ok(Self {
            username: secrets.get(USERNAME_VAR)?,
            password: secrets.get(PASSWORD_VAR)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
