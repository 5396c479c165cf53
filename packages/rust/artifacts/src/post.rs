//! Final post assembly: JSON-LD block, article text, promotional footer.

use volare_shared::{ArticleDraft, NewPost, PostStatus, Result, SiteConfig};

use crate::schema::ArticleMetadata;

/// Search snippet for the post; always contains the article title.
pub fn meta_description(title: &str, site: &SiteConfig) -> String {
    format!(
        "Discover this week's best BL novel recommendations on {}. {title}",
        site.name
    )
}

fn footer(site: &SiteConfig) -> String {
    format!(
        "<hr>\n<p><em>Looking for more recommendations? Check out our \
         <a href=\"{}\">full novel library</a> or join our \
         <a href=\"{}\">Discord community</a> to chat with fellow readers!</em></p>",
        site.library_url, site.community_url
    )
}

/// Post HTML: metadata script, then the draft body, then the footer.
pub fn compose_body(
    draft: &ArticleDraft,
    metadata: &ArticleMetadata,
    site: &SiteConfig,
) -> Result<String> {
    let json_ld = metadata.to_json_ld()?;
    Ok(format!(
        "\n<script type=\"application/ld+json\">\n{json_ld}\n</script>\n\n{}\n\n{}\n",
        draft.body,
        footer(site)
    ))
}

/// Everything the CMS article endpoint needs.
pub fn build_post(
    draft: &ArticleDraft,
    metadata: &ArticleMetadata,
    site: &SiteConfig,
) -> Result<NewPost> {
    Ok(NewPost {
        title: draft.title.clone(),
        content: compose_body(draft, metadata, site)?,
        status: PostStatus::Publish,
        meta_description: meta_description(&draft.title, site),
    })
}
