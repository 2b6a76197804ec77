//! Threshold filtering and the HTML body of the alert email.

use crate::{Error, RatingRecord, Result, ResultSet};

/// Lowest rating that makes it into the alert.
pub const RATING_THRESHOLD: f64 = 7.0;

/// Records rated at or above `threshold`, in result order.
///
/// A rating that does not parse as a number is an error, not a skip.
pub fn filter_by_rating(results: &ResultSet, threshold: f64) -> Result<Vec<&RatingRecord>> {
    let mut kept = Vec::new();
    for record in results.iter() {
        if parse_rating(record)? >= threshold {
            kept.push(record);
        }
    }
    Ok(kept)
}

/// One `<p>` block per record at or above `threshold`. Empty when none qualify.
pub fn render_html(results: &ResultSet, threshold: f64) -> Result<String> {
    let mut html = String::new();
    for record in filter_by_rating(results, threshold)? {
        html.push_str(&format!(
            "<p><b>{}:</b></p><p>IMDB Rating: {}</p><p>Description: {}</p>",
            escape(&record.title),
            escape(&record.rating),
            escape(&record.description),
        ));
    }
    Ok(html)
}

fn parse_rating(record: &RatingRecord) -> Result<f64> {
    record
        .rating
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidRating {
            title: record.title.clone(),
            rating: record.rating.clone(),
        })
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
