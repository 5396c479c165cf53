//! Article drafting via the generative text service.

use tracing::{info, instrument, warn};

use volare_editorial::{ComposedPrompt, ItemSummary};
use volare_gemini::{GeminiClient, GenerationConfig};
use volare_shared::{ArticleDraft, Result, VolareError};

/// Sampling temperature for article drafts.
pub const TEMPERATURE: f32 = 0.8;

/// Output ceiling for one article.
pub const MAX_OUTPUT_TOKENS: u32 = 2000;

/// Number of summarized stories the draft claims to feature.
pub const MAX_REFERENCED_ITEMS: usize = 4;

const GENERATION: GenerationConfig = GenerationConfig {
    temperature: TEMPERATURE,
    max_output_tokens: MAX_OUTPUT_TOKENS,
};

/// Generate the article body and pair it with title and references.
///
/// References are the first [`MAX_REFERENCED_ITEMS`] summaries in prompt
/// order, whatever the model chose to write about. Titles missing from the
/// body are logged but still reported.
#[instrument(skip_all, fields(title = %prompt.title, model = %client.model()))]
pub async fn generate_draft(client: &GeminiClient, prompt: &ComposedPrompt) -> Result<ArticleDraft> {
    let generation = client.generate(&prompt.instructions, GENERATION).await?;

    if generation.text.trim().is_empty() {
        return Err(VolareError::MalformedResponse(
            "generated article text is empty".into(),
        ));
    }

    let referenced_titles = referenced_titles(&prompt.summaries);

    let missing = unmentioned_titles(&generation.text, &referenced_titles);
    if !missing.is_empty() {
        warn!(?missing, "referenced stories not mentioned in generated text");
    }

    info!(
        chars = generation.text.len(),
        referenced = referenced_titles.len(),
        "draft generated"
    );

    Ok(ArticleDraft {
        title: prompt.title.clone(),
        body: generation.text,
        referenced_titles,
    })
}

fn referenced_titles(summaries: &[ItemSummary]) -> Vec<String> {
    summaries
        .iter()
        .take(MAX_REFERENCED_ITEMS)
        .map(|s| s.title.clone())
        .collect()
}

/// Titles that do not occur (case-insensitively) anywhere in `body`.
fn unmentioned_titles<'a>(body: &str, titles: &'a [String]) -> Vec<&'a str> {
    let haystack = body.to_lowercase();
    titles
        .iter()
        .filter(|t| !haystack.contains(&t.to_lowercase()))
        .map(String::as_str)
        .collect()
}
