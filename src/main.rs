use clap::Parser;
use showtime_ratings::browser::BrowserSession;
use showtime_ratings::config::{Args, Credentials, EnvSecrets};
use showtime_ratings::notify::{self, MailSettings};
use showtime_ratings::ratings::{ImdbDetails, RatingLookup, SearchControls};
use showtime_ratings::{ResultSet, report, showtimes};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: bool) {
    let default = if verbose {
        "showtime_ratings=debug,info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Theater titles, then their ratings, all in one browser session.
async fn collect_ratings(
    session: &BrowserSession,
    theater_url: &str,
    rating_url: &str,
) -> showtime_ratings::Result<ResultSet> {
    let theater = session.open_tab("about:blank").await?;
    let titles = showtimes::fetch_titles(&theater, theater_url).await?;

    // ratings get their own tab, reused for every title
    let rating_tab = session.open_tab(rating_url).await?;
    let details = ImdbDetails::new()?;
    RatingLookup::new(&rating_tab, SearchControls::default(), &details)
        .lookup_all(&titles)
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let secrets = EnvSecrets::load();
    let args = Args::parse();
    setup_logging(args.verbose);

    let credentials = if args.dry_run {
        None
    } else {
        Some(Credentials::resolve(&secrets)?)
    };

    let theater_url = args.theater_url_for_today();
    info!("collecting showtimes from {}", theater_url);

    let session = BrowserSession::launch(args.chrome.as_deref()).await?;
    let collected = collect_ratings(&session, &theater_url, &args.rating_url).await;
    if let Err(e) = session.close().await {
        warn!("failed to close browser: {e}");
    }
    let results = collected?;

    let html = report::render_html(&results, args.threshold)?;

    let (Some(credentials), Some(recipient)) = (credentials, args.recipient) else {
        println!("{}", serde_json::to_string_pretty(&results)?);
        println!("{html}");
        return Ok(());
    };

    let settings = MailSettings {
        relay: args.smtp_host,
        port: args.smtp_port,
        recipient,
        subject: args.subject,
    };
    notify::send_alert(&settings, &credentials, html).await?;
    Ok(())
}
