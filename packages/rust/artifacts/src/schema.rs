//! schema.org `Article` markup for a generated draft.

use chrono::{DateTime, Utc};
use serde::Serialize;

use volare_shared::{ArticleDraft, Result, SiteConfig, VolareError};

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// JSON-LD document embedded ahead of the article text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub headline: String,
    pub author: Organization,
    pub publisher: Publisher,
    pub date_published: String,
    pub date_modified: String,
    pub main_entity_of_page: WebPage,
    /// One entry per referenced title, in draft order.
    pub about: Vec<CreativeWork>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publisher {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub logo: ImageObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageObject {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebPage {
    #[serde(rename = "@type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreativeWork {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub genre: String,
}

/// Describe `draft` for search engines. Both timestamps are `now`.
pub fn build_metadata(
    draft: &ArticleDraft,
    site: &SiteConfig,
    now: DateTime<Utc>,
) -> ArticleMetadata {
    let timestamp = now.to_rfc3339();

    ArticleMetadata {
        context: SCHEMA_CONTEXT,
        kind: "Article",
        headline: draft.title.clone(),
        author: Organization {
            kind: "Organization",
            name: site.name.clone(),
            url: site.url.clone(),
        },
        publisher: Publisher {
            kind: "Organization",
            name: site.name.clone(),
            logo: ImageObject {
                kind: "ImageObject",
                url: site.logo_url.clone(),
            },
        },
        date_published: timestamp.clone(),
        date_modified: timestamp,
        main_entity_of_page: WebPage { kind: "WebPage" },
        about: draft
            .referenced_titles
            .iter()
            .map(|title| CreativeWork {
                kind: "Book",
                name: title.clone(),
                genre: site.genre.clone(),
            })
            .collect(),
    }
}

impl ArticleMetadata {
    /// Pretty JSON safe to place inside a `<script>` element.
    ///
    /// `</` is escaped so a title can never close the surrounding tag.
    pub fn to_json_ld(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| VolareError::validation(format!("failed to serialize metadata: {e}")))?;
        Ok(json.replace("</", "<\\/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(titles: &[&str]) -> ArticleDraft {
        ArticleDraft {
            title: "Hidden Gems: Omegaverse Novels You Might Have Missed".into(),
            body: "body".into(),
            referenced_titles: titles.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn top_level_shape() {
        let meta = build_metadata(&draft(&["A"]), &SiteConfig::default(), fixed_now());
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["@context"], "https://schema.org");
        assert_eq!(json["@type"], "Article");
        assert_eq!(json["headline"], "Hidden Gems: Omegaverse Novels You Might Have Missed");
        assert_eq!(json["author"]["@type"], "Organization");
        assert_eq!(json["author"]["name"], "Volarereads");
        assert_eq!(json["publisher"]["logo"]["@type"], "ImageObject");
        assert_eq!(json["mainEntityOfPage"]["@type"], "WebPage");
        assert_eq!(json["datePublished"], "2026-10-15T09:30:00+00:00");
        assert_eq!(json["datePublished"], json["dateModified"]);
    }

    #[test]
    fn about_matches_referenced_titles_in_order() {
        let titles = ["Third", "First", "Second"];
        let meta = build_metadata(&draft(&titles), &SiteConfig::default(), fixed_now());
        let json = serde_json::to_value(&meta).unwrap();

        let about = json["about"].as_array().unwrap();
        assert_eq!(about.len(), titles.len());
        for (entry, title) in about.iter().zip(titles) {
            assert_eq!(entry["@type"], "Book");
            assert_eq!(entry["name"], title);
            assert_eq!(entry["genre"], "Boys' Love");
        }
    }

    #[test]
    fn no_references_gives_empty_about() {
        let meta = build_metadata(&draft(&[]), &SiteConfig::default(), fixed_now());
        assert!(meta.about.is_empty());
    }

    #[test]
    fn json_ld_escapes_closing_tags() {
        let meta = build_metadata(
            &draft(&["Evil</script><b>"]),
            &SiteConfig::default(),
            fixed_now(),
        );
        let text = meta.to_json_ld().unwrap();
        assert!(!text.contains("</script>"));

        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back["about"][0]["name"], "Evil</script><b>");
    }
}
