//! Instruction block sent to the writer model.
//!
//! Pure string assembly: catalog items and the week's rotation in, a single
//! prompt out. Synopses are de-tagged and truncated before inclusion.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use volare_shared::CatalogItem;

use crate::theme::RotationPick;

/// Hard cap on stories summarized into the prompt; extras are dropped.
pub const MAX_FEATURED_ITEMS: usize = 5;

/// Synopsis length cap, in characters, applied after tag removal.
pub const MAX_SYNOPSIS_CHARS: usize = 300;

const EDITORIAL_RULES: [&str; 8] = [
    "Write like an excited fan sharing recommendations with friends, NOT like a corporate blog",
    "Use casual, warm language with personality",
    "Include specific details that show you've actually read these novels",
    "Add personal opinions and reactions (e.g., \"I literally couldn't put this down\")",
    "NO generic phrases like \"immerse yourself\" or \"captivating journey\"",
    "NO AI-sounding language - write like a real person",
    "Include 1-2 mild spoiler-free teasers to hook readers",
    "End with a question to encourage comments",
];

const ARTICLE_STRUCTURE: [&str; 5] = [
    "Opening hook (2-3 sentences, personal and engaging)",
    "Brief intro to the theme/trope (1 paragraph)",
    "Each novel recommendation (2-3 paragraphs each with WHY it's good)",
    "Personal favorite pick with reasoning",
    "Closing question for readers",
];

const LENGTH_DIRECTIVE: &str = "600-900 words";
const TONE_DIRECTIVE: &str = "Enthusiastic fan, slightly informal, genuine";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A story as it appears in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub title: String,
    /// Tag-free synopsis, at most [`MAX_SYNOPSIS_CHARS`] characters.
    pub synopsis: String,
    pub url: String,
}

/// Everything the generator needs from the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// Final article title.
    pub title: String,
    /// Subject line for the writer.
    pub focus: String,
    /// Full instruction block.
    pub instructions: String,
    /// Summaries in the order they appear in the prompt.
    pub summaries: Vec<ItemSummary>,
}

// ---------------------------------------------------------------------------
// Text shaping
// ---------------------------------------------------------------------------

/// Remove anything that looks like an HTML tag. Entities are left as-is.
pub fn strip_html(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

    TAG_RE.replace_all(text, "").into_owned()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Summarize at most [`MAX_FEATURED_ITEMS`] stories, in listing order.
pub fn summarize(items: &[CatalogItem]) -> Vec<ItemSummary> {
    if items.len() > MAX_FEATURED_ITEMS {
        debug!(
            available = items.len(),
            kept = MAX_FEATURED_ITEMS,
            "dropping stories beyond the featured cap"
        );
    }

    items
        .iter()
        .take(MAX_FEATURED_ITEMS)
        .map(|item| ItemSummary {
            title: strip_html(&item.title),
            synopsis: truncate_chars(&strip_html(&item.synopsis), MAX_SYNOPSIS_CHARS),
            url: item.url.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Build the title, focus, and instruction block for one article.
///
/// `date_range` fills the weekly-roundup title; `site_name` names the
/// publication in the persona line.
pub fn compose(
    items: &[CatalogItem],
    pick: &RotationPick,
    date_range: &str,
    site_name: &str,
) -> ComposedPrompt {
    let title = pick.title(date_range);
    let focus = pick.subject();
    let summaries = summarize(items);

    let rules = EDITORIAL_RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {rule}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let stories = summaries
        .iter()
        .map(|s| format!("- {}: {}", s.title, s.synopsis))
        .collect::<Vec<_>>()
        .join("\n");

    let structure = ARTICLE_STRUCTURE
        .iter()
        .map(|step| format!("- {step}"))
        .collect::<Vec<_>>()
        .join("\n");

    let instructions = format!(
        "You are a passionate BL (Boys' Love) novel enthusiast writing for {site_name}.\n\
         Write an engaging blog article about {focus}.\n\
         \n\
         CRITICAL RULES:\n\
         {rules}\n\
         \n\
         ARTICLE TITLE: {title}\n\
         \n\
         NOVELS TO FEATURE (pick 3-4 that fit the theme best):\n\
         {stories}\n\
         \n\
         FORMAT:\n\
         {structure}\n\
         \n\
         LENGTH: {LENGTH_DIRECTIVE}\n\
         TONE: {TONE_DIRECTIVE}\n\
         \n\
         Write the article now:"
    );

    ComposedPrompt {
        title,
        focus,
        instructions,
        summaries,
    }
}
