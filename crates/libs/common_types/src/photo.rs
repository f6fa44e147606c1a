use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal view of a catalogue photo needed for face search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub photographer: Option<String>,
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct PhotoFilter {
    #[builder(default)]
    #[serde(default)]
    pub categories: Vec<String>,
    #[builder(default)]
    #[serde(default)]
    pub photographers: Vec<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl PhotoFilter {
    /// Whether a photo passes every criterion except `limit`.
    #[must_use]
    pub fn accepts(&self, photo: &PhotoRecord) -> bool {
        let category_ok = self.categories.is_empty()
            || photo
                .category
                .as_ref()
                .is_some_and(|c| self.categories.contains(c));
        let photographer_ok = self.photographers.is_empty()
            || photo
                .photographer
                .as_ref()
                .is_some_and(|p| self.photographers.contains(p));
        let from_ok = match (self.from, photo.created_at) {
            (Some(from), Some(created)) => created >= from,
            (Some(_), None) => false,
            (None, _) => true,
        };
        let to_ok = match (self.to, photo.created_at) {
            (Some(to), Some(created)) => created <= to,
            (Some(_), None) => false,
            (None, _) => true,
        };
        category_ok && photographer_ok && from_ok && to_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn photo(category: &str, photographer: &str, day: u32) -> PhotoRecord {
        PhotoRecord {
            id: format!("{category}-{day}"),
            url: format!("file:///{category}/{day}.jpg"),
            title: format!("{day}.jpg"),
            photographer: Some(photographer.to_string()),
            category: Some(category.to_string()),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn empty_filter_accepts_everything() {
        assert!(PhotoFilter::default().accepts(&photo("weddings", "ana", 1)));
    }

    #[test]
    fn filters_combine() {
        let filter = PhotoFilter::builder()
            .categories(vec!["weddings".to_string()])
            .photographers(vec!["ana".to_string()])
            .from(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap())
            .build();

        assert!(filter.accepts(&photo("weddings", "ana", 12)));
        assert!(!filter.accepts(&photo("weddings", "ana", 3)));
        assert!(!filter.accepts(&photo("sports", "ana", 12)));
        assert!(!filter.accepts(&photo("weddings", "ben", 12)));
    }
}
