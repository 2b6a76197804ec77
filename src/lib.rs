pub mod browser;
pub mod config;
pub mod error;
pub mod notify;
pub mod ratings;
pub mod report;
pub mod showtimes;

pub use error::Error;

use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Rating and synopsis found for one showtime title on the rating site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingRecord {
    pub title: String,
    /// Raw rating text as scraped, e.g. "8.5". Parsed only when filtering.
    pub rating: String,
    pub description: String,
}

impl RatingRecord {
    pub fn new(
        title: impl Into<String>,
        rating: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            rating: rating.into(),
            description: description.into(),
        }
    }
}

/// Title -> record mapping that keeps discovery order and one record per title.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<RatingRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `record`, replacing an earlier record for the same title in place.
    pub fn insert(&mut self, record: RatingRecord) {
        match self.records.iter_mut().find(|r| r.title == record.title) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn get(&self, title: &str) -> Option<&RatingRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.get(title).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatingRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<RatingRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = RatingRecord>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

/// A rendered page the pipeline can drive. Implemented for a live browser tab
/// and, in tests, for in-memory fakes.
#[async_trait::async_trait]
pub trait BrowserPage: Send + Sync {
    /// Load `url` and wait for it to finish navigating.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Current markup of the page, including script-rendered content.
    async fn content(&self) -> Result<String>;

    /// Focus the first element matching `selector` and type `text` into it.
    async fn type_text(&self, selector: &str, text: &str) -> Result<()>;

    /// Click the first element matching `selector` and wait for any navigation it triggers.
    async fn submit(&self, selector: &str) -> Result<()>;

    /// Visible text of every element matching `selector`, in document order.
    async fn texts(&self, selector: &str) -> Result<Vec<String>>;

    /// Script-click the `index`th element matching `selector` and wait for navigation.
    async fn activate(&self, selector: &str, index: usize) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_discovery_order() {
        let mut set = ResultSet::new();
        set.insert(RatingRecord::new("Oppenheimer", "8.5", "A physicist..."));
        set.insert(RatingRecord::new("Barbie", "6.8", "A doll..."));

        let titles: Vec<&str> = set.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Oppenheimer", "Barbie"]);
    }

    #[test]
    fn insert_replaces_existing_title_in_place() {
        let mut set = ResultSet::new();
        set.insert(RatingRecord::new("Oppenheimer", "8.5", "old"));
        set.insert(RatingRecord::new("Barbie", "6.8", "A doll..."));
        set.insert(RatingRecord::new("Oppenheimer", "8.6", "new"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().unwrap().description, "new");
        assert_eq!(set.get("Oppenheimer").unwrap().rating, "8.6");
    }

    #[test]
    fn serializes_as_ordered_list() {
        let set: ResultSet = vec![RatingRecord::new("Barbie", "6.8", "A doll...")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(
            json,
            r#"[{"title":"Barbie","rating":"6.8","description":"A doll..."}]"#
        );
    }
}
