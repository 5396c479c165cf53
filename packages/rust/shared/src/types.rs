//! Core domain types shared by every pipeline stage.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline invocation (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CatalogItem
// ---------------------------------------------------------------------------

/// A recently catalogued story, normalized from the CMS listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// CMS post id, when the listing exposes one.
    pub id: Option<u64>,
    /// Rendered title (may contain HTML entities).
    pub title: String,
    /// Rendered excerpt; may contain markup.
    pub synopsis: String,
    /// Canonical public URL.
    pub url: String,
}

// ---------------------------------------------------------------------------
// ArticleDraft
// ---------------------------------------------------------------------------

/// Generated article prior to metadata embedding and publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    /// Fully interpolated, theme-specific title.
    pub title: String,
    /// Article text exactly as returned by the generative service.
    pub body: String,
    /// Titles of the stories the article claims to feature.
    ///
    /// Derived positionally from the summarized set, not from the body.
    pub referenced_titles: Vec<String>,
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Post status sent to the CMS. Generated articles always go live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
}

/// Payload for the CMS article endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub meta_description: String,
}

/// CMS response to a successful article submission.
///
/// Only `link` matters to the run; `id` is kept when it parses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PublishResult {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    /// Public URL of the new post.
    #[serde(default)]
    pub link: Option<String>,
}

/// Read a WordPress post id sent as a number or a numeric string.
///
/// Any other shape yields `None` instead of failing the whole record.
pub fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
