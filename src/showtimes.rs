//! Showtime list extraction from the theater page's title dropdown.

use crate::{BrowserPage, Error, Result};
use scraper::{Html, Selector};
use tracing::{debug, info};

/// The `<select>` listing every movie with showtimes.
pub const TITLE_DROPDOWN: &str = "#showtimes-movie-title-filter";

/// Option labels that are not movies.
const SENTINELS: [&str; 2] = ["All Movies", ""];

/// Load `url` and return the deduplicated titles from its dropdown, in dropdown order.
pub async fn fetch_titles(page: &dyn BrowserPage, url: &str) -> Result<Vec<String>> {
    page.navigate(url).await?;
    let html = page.content().await?;

    let options = parse_dropdown(&html, TITLE_DROPDOWN)?;
    debug!(options = options.len(), "read title dropdown");

    let titles = dedupe_titles(&options);
    info!("found {} titles on {}", titles.len(), url);
    Ok(titles)
}

/// Trimmed labels of every `<option>` under the control matching `dropdown`.
pub fn parse_dropdown(html: &str, dropdown: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let dropdown_sel = Selector::parse(dropdown).map_err(|_| Error::Selector(dropdown.into()))?;
    let option_sel = Selector::parse("option").map_err(|_| Error::Selector("option".into()))?;

    let control = document
        .select(&dropdown_sel)
        .next()
        .ok_or_else(|| Error::not_found(dropdown))?;

    Ok(control
        .select(&option_sel)
        .map(|o| o.text().collect::<String>().trim().to_string())
        .collect())
}

/// Drop sentinel labels, then drop any label that extends the label right before it.
///
/// e.g. "Oppenheimer: Private Rental" right after "Oppenheimer" is dropped.
/// Only the immediate neighbour is compared, case-sensitively, whether or not
/// that neighbour was itself kept.
pub fn dedupe_titles(options: &[String]) -> Vec<String> {
    let labels: Vec<&String> = options
        .iter()
        .filter(|o| !SENTINELS.iter().any(|s| s == o))
        .collect();

    labels
        .iter()
        .enumerate()
        .filter(|(i, label)| *i == 0 || !label.starts_with(labels[i - 1].as_str()))
        .map(|(_, label)| (*label).clone())
        .collect()
}
