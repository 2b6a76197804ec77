//! Rating lookup: search each title on the rating site, open the matching
//! result, and read the rating and synopsis off the detail page.

use crate::{BrowserPage, Error, RatingRecord, Result, ResultSet};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

/// Search-and-select controls of the rating site.
#[derive(Debug, Clone)]
pub struct SearchControls {
    pub input: String,
    pub button: String,
    pub result_title: String,
}

impl Default for SearchControls {
    fn default() -> Self {
        Self {
            input: "#suggestion-search".to_string(),
            button: "#suggestion-search-button".to_string(),
            result_title: ".ipc-metadata-list-summary-item__t".to_string(),
        }
    }
}

/// Reads a rating and description out of a rendered detail page.
pub trait DetailExtractor: Send + Sync {
    /// `Some((rating, description))` only when both are present.
    fn extract(&self, html: &str) -> Option<(String, String)>;
}

/// Detail page markers for IMDb title pages.
pub struct ImdbDetails {
    rating: Selector,
    description: Selector,
}

impl ImdbDetails {
    pub const RATING: &'static str = "span.sc-bde20123-1.iZlgcd";
    pub const DESCRIPTION: &'static str = "span.sc-5f699a2-0.kcphyk";

    pub fn new() -> Result<Self> {
        Self::with_selectors(Self::RATING, Self::DESCRIPTION)
    }

    pub fn with_selectors(rating: &str, description: &str) -> Result<Self> {
        Ok(Self {
            rating: Selector::parse(rating).map_err(|_| Error::Selector(rating.into()))?,
            description: Selector::parse(description)
                .map_err(|_| Error::Selector(description.into()))?,
        })
    }
}

impl DetailExtractor for ImdbDetails {
    fn extract(&self, html: &str) -> Option<(String, String)> {
        let doc = Html::parse_document(html);
        let text_of = |sel: &Selector| {
            doc.select(sel)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
        };
        let rating = text_of(&self.rating)?;
        let description = text_of(&self.description)?;
        Some((rating, description))
    }
}

/// What happened when looking up one title.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(RatingRecord),
    /// The page had no rating/description markup.
    NotFound,
    /// A search control was missing and the page had no rating/description either.
    InteractionFailed { reason: String },
}

/// Drives the search UI of a rating site over one reused tab.
pub struct RatingLookup<'a> {
    page: &'a dyn BrowserPage,
    controls: SearchControls,
    details: &'a dyn DetailExtractor,
}

impl<'a> RatingLookup<'a> {
    pub fn new(
        page: &'a dyn BrowserPage,
        controls: SearchControls,
        details: &'a dyn DetailExtractor,
    ) -> Self {
        Self {
            page,
            controls,
            details,
        }
    }

    /// Look up every title in order. Titles without data are left out.
    pub async fn lookup_all(&self, titles: &[String]) -> Result<ResultSet> {
        let mut results = ResultSet::new();
        for (idx, title) in titles.iter().enumerate() {
            debug!("looking up {} of {}: {}", idx + 1, titles.len(), title);
            match self.lookup(title).await? {
                LookupOutcome::Found(record) => {
                    debug!(rating = %record.rating, "found {}", title);
                    results.insert(record);
                }
                LookupOutcome::NotFound => {
                    debug!("no rating on page for {}", title);
                }
                LookupOutcome::InteractionFailed { reason } => {
                    warn!("search for {} failed: {}", title, reason);
                }
            }
        }
        info!("found ratings for {} of {} titles", results.len(), titles.len());
        Ok(results)
    }

    /// Search for `title`, then parse whatever page is loaded afterwards.
    ///
    /// A missing control does not stop the parse step; any other browser
    /// error is returned.
    pub async fn lookup(&self, title: &str) -> Result<LookupOutcome> {
        let interaction = match self.search(title).await {
            Ok(()) => None,
            Err(Error::ElementNotFound { selector }) => Some(selector),
            Err(e) => return Err(e),
        };

        let html = self.page.content().await?;
        Ok(match (self.details.extract(&html), interaction) {
            (Some((rating, description)), _) => {
                LookupOutcome::Found(RatingRecord::new(title, rating, description))
            }
            (None, None) => LookupOutcome::NotFound,
            (None, Some(selector)) => LookupOutcome::InteractionFailed {
                reason: format!("no element matches '{selector}'"),
            },
        })
    }

    async fn search(&self, title: &str) -> Result<()> {
        self.page.type_text(&self.controls.input, title).await?;
        self.page.submit(&self.controls.button).await?;

        let results = self.page.texts(&self.controls.result_title).await?;
        if let Some(idx) = matching_result(&results, title) {
            self.page.activate(&self.controls.result_title, idx).await?;
        }
        Ok(())
    }
}

/// Index of the first result equal to `title` ignoring case.
pub fn matching_result(results: &[String], title: &str) -> Option<usize> {
    let wanted = title.to_lowercase();
    results.iter().position(|r| r.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const SEARCH: &str = "#suggestion-search";

    fn detail_page(rating: &str, description: &str) -> String {
        format!(
            r#"<html><body>
               <span class="sc-bde20123-1 iZlgcd">{rating}</span>
               <span class="sc-5f699a2-0 kcphyk">{description}</span>
               </body></html>"#
        )
    }

    /// In-memory rating site: a search page, result lists keyed by query,
    /// and detail pages keyed by result label.
    #[derive(Default)]
    struct FakeSite {
        results: HashMap<String, Vec<String>>,
        details: HashMap<String, String>,
        missing: Vec<&'static str>,
        state: Mutex<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        typed: String,
        current: String,
        activated: Vec<String>,
    }

    impl FakeSite {
        fn check(&self, selector: &str) -> Result<()> {
            if self.missing.iter().any(|m| *m == selector) {
                Err(Error::not_found(selector))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait::async_trait]
    impl BrowserPage for FakeSite {
        async fn navigate(&self, url: &str) -> Result<()> {
            self.state.lock().unwrap().current = url.to_string();
            Ok(())
        }

        async fn content(&self) -> Result<String> {
            let state = self.state.lock().unwrap();
            Ok(self.details.get(&state.current).cloned().unwrap_or_default())
        }

        async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
            self.check(selector)?;
            self.state.lock().unwrap().typed = text.to_string();
            Ok(())
        }

        async fn submit(&self, selector: &str) -> Result<()> {
            self.check(selector)?;
            let mut state = self.state.lock().unwrap();
            state.current = format!("results:{}", state.typed);
            state.typed.clear();
            Ok(())
        }

        async fn texts(&self, selector: &str) -> Result<Vec<String>> {
            self.check(selector)?;
            let state = self.state.lock().unwrap();
            let query = state.current.trim_start_matches("results:");
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }

        async fn activate(&self, selector: &str, index: usize) -> Result<()> {
            self.check(selector)?;
            let mut state = self.state.lock().unwrap();
            let query = state.current.trim_start_matches("results:").to_string();
            let label = self.results[&query][index].clone();
            state.activated.push(label.clone());
            state.current = label;
            Ok(())
        }
    }

    fn site() -> FakeSite {
        let mut site = FakeSite::default();
        site.results.insert(
            "Oppenheimer".into(),
            vec!["Oppenheimer (Documentary)".into(), "OPPENHEIMER".into()],
        );
        site.results
            .insert("Barbie".into(), vec!["Barbie".into(), "barbie".into()]);
        site.results
            .insert("Unrated Film".into(), vec!["Unrated Film".into()]);
        site.details
            .insert("OPPENHEIMER".into(), detail_page("8.5", "A physicist..."));
        site.details
            .insert("Barbie".into(), detail_page("6.8", "A doll..."));
        site.details
            .insert("Unrated Film".into(), "<html><body>no rating</body></html>".into());
        site
    }

    fn titles(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_ignores_case_but_not_substrings() {
        let results = titles(&["Barbie Girl", "BARBIE", "Barbie"]);
        assert_eq!(matching_result(&results, "barbie"), Some(1));
        assert_eq!(matching_result(&results, "Barb"), None);
    }

    #[test]
    fn extractor_needs_both_rating_and_description() {
        let details = ImdbDetails::new().unwrap();
        assert_eq!(
            details.extract(&detail_page(" 8.5 ", "A physicist...")),
            Some(("8.5".to_string(), "A physicist...".to_string()))
        );

        let rating_only = r#"<span class="sc-bde20123-1 iZlgcd">8.5</span>"#;
        assert_eq!(details.extract(rating_only), None);
    }

    #[tokio::test]
    async fn records_only_titles_with_full_details() {
        let site = site();
        let details = ImdbDetails::new().unwrap();
        let lookup = RatingLookup::new(&site, SearchControls::default(), &details);

        let results = lookup
            .lookup_all(&titles(&["Oppenheimer", "Unrated Film", "Barbie", "Nowhere"]))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(
            results.get("Oppenheimer"),
            Some(&RatingRecord::new("Oppenheimer", "8.5", "A physicist..."))
        );
        assert_eq!(results.get("Barbie").unwrap().rating, "6.8");
        assert!(!results.contains("Unrated Film"));
        assert!(!results.contains("Nowhere"));

        // first case-insensitive exact match wins
        let activated = site.state.lock().unwrap().activated.clone();
        assert_eq!(activated, titles(&["OPPENHEIMER", "Unrated Film", "Barbie"]));
    }

    #[tokio::test]
    async fn missing_search_control_falls_through_to_current_page() {
        let mut site = site();
        site.missing.push(SEARCH);
        let details = ImdbDetails::new().unwrap();
        let lookup = RatingLookup::new(&site, SearchControls::default(), &details);

        let outcome = lookup.lookup("Barbie").await.unwrap();
        assert!(matches!(outcome, LookupOutcome::InteractionFailed { .. }));

        // the page left over from an earlier title is still parsed
        site.state.lock().unwrap().current = "Barbie".into();
        let outcome = lookup.lookup("Some Other Film").await.unwrap();
        assert_eq!(
            outcome,
            LookupOutcome::Found(RatingRecord::new("Some Other Film", "6.8", "A doll..."))
        );
    }

    #[tokio::test]
    async fn no_matching_result_parses_results_page() {
        let site = site();
        let details = ImdbDetails::new().unwrap();
        let lookup = RatingLookup::new(&site, SearchControls::default(), &details);

        assert_eq!(lookup.lookup("Nowhere").await.unwrap(), LookupOutcome::NotFound);
        assert!(site.state.lock().unwrap().activated.is_empty());
    }
}
