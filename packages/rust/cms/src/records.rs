//! Wire records returned by the crawler REST routes.
//!
//! WordPress wraps rendered fields as `{"rendered": "..."}`; these records
//! accept that shape and flatten it into [`CatalogItem`].

use serde::Deserialize;

use volare_shared::{CatalogItem, lenient_id};

/// Title used when a listing record carries no rendered title.
pub(crate) const UNKNOWN_TITLE: &str = "Unknown";

/// Body of `GET /wp-json/crawler/v1/stories/recent`.
#[derive(Debug, Deserialize)]
pub(crate) struct RecentStoriesResponse {
    #[serde(default)]
    pub stories: Vec<StoryRecord>,
}

/// A single story in the recent listing.
#[derive(Debug, Deserialize)]
pub(crate) struct StoryRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<Rendered>,
    #[serde(default)]
    pub excerpt: Option<Rendered>,
    #[serde(default)]
    pub link: Option<String>,
}

/// WordPress `{ "rendered": "..." }` wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct Rendered {
    #[serde(default)]
    pub rendered: Option<String>,
}

impl Rendered {
    fn into_text(self) -> Option<String> {
        self.rendered
    }
}

impl From<StoryRecord> for CatalogItem {
    fn from(record: StoryRecord) -> Self {
        Self {
            id: record.id,
            title: record
                .title
                .and_then(Rendered::into_text)
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            synopsis: record
                .excerpt
                .and_then(Rendered::into_text)
                .unwrap_or_default(),
            url: record.link.unwrap_or_default(),
        }
    }
}

/// Body of `GET /wp-json/crawler/v1/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// WordPress version reported by the site.
    #[serde(default)]
    pub wordpress: Option<String>,
    #[serde(default)]
    pub php: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_record_maps_to_item() {
        let json = r#"{
            "id": 42,
            "title": {"rendered": "The Cold Emperor"},
            "excerpt": {"rendered": "<p>He never smiles.</p>"},
            "link": "https://volarereads.com/story/cold-emperor/"
        }"#;
        let record: StoryRecord = serde_json::from_str(json).unwrap();
        let item = CatalogItem::from(record);
        assert_eq!(item.id, Some(42));
        assert_eq!(item.title, "The Cold Emperor");
        assert_eq!(item.synopsis, "<p>He never smiles.</p>");
        assert_eq!(item.url, "https://volarereads.com/story/cold-emperor/");
    }

    #[test]
    fn sparse_record_uses_fallbacks() {
        let record: StoryRecord = serde_json::from_str("{}").unwrap();
        let item = CatalogItem::from(record);
        assert_eq!(item.title, UNKNOWN_TITLE);
        assert!(item.synopsis.is_empty());
        assert!(item.url.is_empty());
        assert_eq!(item.id, None);
    }

    #[test]
    fn string_id_does_not_reject_record() {
        let json = r#"{"id":"42","title":{"rendered":"Spring Rain"}}"#;
        let record: StoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(CatalogItem::from(record).id, Some(42));

        let json = r#"{"id":"n/a","title":{"rendered":"Spring Rain"}}"#;
        let item = CatalogItem::from(serde_json::from_str::<StoryRecord>(json).unwrap());
        assert_eq!(item.id, None);
        assert_eq!(item.title, "Spring Rain");
    }

    #[test]
    fn missing_stories_key_is_empty_listing() {
        let parsed: RecentStoriesResponse = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert!(parsed.stories.is_empty());
    }

    #[test]
    fn health_status_ok() {
        let json = r#"{"status":"ok","timestamp":"2026-10-15 08:00:00","wordpress":"6.6","php":"8.3.1"}"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert!(health.is_ok());
        assert_eq!(health.php.as_deref(), Some("8.3.1"));
    }
}
