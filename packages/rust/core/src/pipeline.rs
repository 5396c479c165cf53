//! End-to-end weekly pipeline: fetch → theme → compose → generate → metadata → publish.
//!
//! Stages run strictly in sequence. An empty listing ends the run quietly;
//! any other failure aborts before the next stage is touched.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{Span, field, info, instrument};

use volare_artifacts::{build_metadata, build_post};
use volare_cms::{CmsClient, FetchOutcome, RecentWindow};
use volare_editorial::{RotationPick, compose, date_range, rotation_for_week};
use volare_gemini::GeminiClient;
use volare_shared::{ArticleDraft, NewPost, PublishResult, Result, RunId, SiteConfig};

use crate::generator;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Trailing window for recent stories.
    pub window: RecentWindow,
    /// Rotation week (normally the ISO week of `today`).
    pub week: u32,
    /// Local date used for the weekly-roundup date range.
    pub today: NaiveDate,
    /// Site identity for metadata and footer.
    pub site: SiteConfig,
    /// Stop after assembling the post instead of publishing it.
    pub dry_run: bool,
}

/// A fully assembled post that has not been submitted.
#[derive(Debug, Clone)]
pub struct PreparedPost {
    pub rotation: RotationPick,
    pub draft: ArticleDraft,
    pub post: NewPost,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The CMS accepted the article.
    Published {
        title: String,
        result: PublishResult,
    },
    /// Dry run: everything but the submission happened.
    DryRun(Box<PreparedPost>),
    /// No stories were added in the window; nothing was generated.
    NothingToPublish,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn phase(&self, name: &str);
    /// Called once the run reaches a terminal state without error.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

/// Run the weekly article pipeline once.
///
/// 1. Fetch recent stories (empty → [`RunOutcome::NothingToPublish`])
/// 2. Select the week's theme and rotation picks
/// 3. Compose the prompt
/// 4. Generate the draft
/// 5. Build schema metadata and assemble the post
/// 6. Publish (skipped on dry run)
#[instrument(skip_all, fields(run_id = field::Empty, week = config.week, dry_run = config.dry_run))]
pub async fn run_weekly_article(
    cms: &CmsClient,
    gemini: &GeminiClient,
    config: &RunConfig,
    progress: &dyn ProgressReporter,
) -> Result<RunOutcome> {
    let start = Instant::now();
    let run_id = RunId::new();
    Span::current().record("run_id", field::display(&run_id));

    info!(days = config.window.days, per_page = config.window.per_page, "starting weekly article run");

    // --- Stage 1: Fetch ---
    progress.phase("Fetching recent stories");
    let items = match cms.recent_stories(&config.window).await {
        FetchOutcome::Items(items) => items,
        FetchOutcome::Empty => {
            info!("no stories added in the window, skipping article generation");
            let outcome = RunOutcome::NothingToPublish;
            progress.done(&outcome);
            return Ok(outcome);
        }
        FetchOutcome::Failed(e) => return Err(e),
    };
    info!(count = items.len(), "stories available");

    // --- Stage 2: Theme ---
    progress.phase("Selecting article theme");
    let rotation = rotation_for_week(config.week);
    info!(
        template = %rotation.theme.kind,
        focus = rotation.theme.focus,
        trope = rotation.trope,
        mood = rotation.mood,
        character_type = rotation.character_type,
        "theme selected"
    );

    // --- Stage 3: Compose ---
    progress.phase("Composing prompt");
    let prompt = compose(
        &items,
        &rotation,
        &date_range(config.today),
        &config.site.name,
    );

    // --- Stage 4: Generate ---
    progress.phase("Generating article");
    let draft = generator::generate_draft(gemini, &prompt).await?;
    info!(
        title = %draft.title,
        featuring = %draft.referenced_titles.join(", "),
        "article drafted"
    );

    // --- Stage 5: Metadata + assembly ---
    progress.phase("Building metadata");
    let metadata = build_metadata(&draft, &config.site, Utc::now());
    let post = build_post(&draft, &metadata, &config.site)?;

    if config.dry_run {
        info!(
            chars = post.content.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "dry run complete, not publishing"
        );
        let outcome = RunOutcome::DryRun(Box::new(PreparedPost {
            rotation,
            draft,
            post,
        }));
        progress.done(&outcome);
        return Ok(outcome);
    }

    // --- Stage 6: Publish ---
    progress.phase("Publishing article");
    let result = cms.publish(&post).await?;

    info!(
        link = result.link.as_deref().unwrap_or("<none>"),
        elapsed_ms = start.elapsed().as_millis(),
        "weekly article published"
    );

    let outcome = RunOutcome::Published {
        title: draft.title,
        result,
    };
    progress.done(&outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use volare_cms::CmsOptions;
    use volare_gemini::GeminiOptions;
    use volare_shared::VolareError;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RECENT: &str = "/wp-json/crawler/v1/stories/recent";
    const ARTICLE: &str = "/wp-json/crawler/v1/article";
    const GENERATE: &str = r":generateContent$";

    struct Harness {
        cms_server: MockServer,
        gemini_server: MockServer,
    }

    impl Harness {
        async fn start() -> Self {
            Self {
                cms_server: MockServer::start().await,
                gemini_server: MockServer::start().await,
            }
        }

        fn cms(&self) -> CmsClient {
            CmsClient::new(&CmsOptions::new(self.cms_server.uri(), "cms-key")).unwrap()
        }

        fn gemini(&self) -> GeminiClient {
            let opts = GeminiOptions {
                endpoint: self.gemini_server.uri(),
                ..GeminiOptions::new("gemini-key", "gemini-2.5-flash")
            };
            GeminiClient::new(&opts).unwrap()
        }

        async fn stories(&self, count: usize) {
            let stories: Vec<_> = (0..count)
                .map(|i| {
                    serde_json::json!({
                        "id": 100 + i,
                        "title": {"rendered": format!("Novel {i}")},
                        "excerpt": {"rendered": format!("<p>Plot <b>{i}</b></p>")},
                        "link": format!("https://volarereads.com/story/novel-{i}/"),
                    })
                })
                .collect();
            Mock::given(method("GET"))
                .and(path(RECENT))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "stories": stories })),
                )
                .mount(&self.cms_server)
                .await;
        }

        async fn generation(&self, template: ResponseTemplate, times: u64) {
            Mock::given(method("POST"))
                .and(path_regex(GENERATE))
                .respond_with(template)
                .expect(times)
                .mount(&self.gemini_server)
                .await;
        }

        async fn publish(&self, times: u64) {
            Mock::given(method("POST"))
                .and(path(ARTICLE))
                .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                    "id": 5150,
                    "link": "https://volarereads.com/what-to-read/"
                })))
                .expect(times)
                .mount(&self.cms_server)
                .await;
        }
    }

    fn article_reply() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Novel 0 wrecked me. Novel 1 healed me. What's your pick?"}]}}]
        }))
    }

    fn config(week: u32, dry_run: bool) -> RunConfig {
        RunConfig {
            window: RecentWindow::default(),
            week,
            today: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            site: SiteConfig::default(),
            dry_run,
        }
    }

    #[tokio::test]
    async fn end_to_end_week_ten_publishes() {
        let h = Harness::start().await;
        h.stories(3).await;
        h.generation(article_reply(), 1).await;
        h.publish(1).await;

        let outcome = run_weekly_article(&h.cms(), &h.gemini(), &config(10, false), &SilentProgress)
            .await
            .unwrap();

        let expected_title = "What to Read When You Want Something Sweet and Fluffy";
        match outcome {
            RunOutcome::Published { title, result } => {
                assert_eq!(title, expected_title);
                assert_eq!(result.link.as_deref(), Some("https://volarereads.com/what-to-read/"));
            }
            other => panic!("expected Published, got {other:?}"),
        }

        let requests = h.cms_server.received_requests().await.unwrap();
        let publish = requests
            .iter()
            .find(|r| r.url.path() == ARTICLE)
            .expect("publish request");
        let payload: serde_json::Value = serde_json::from_slice(&publish.body).unwrap();

        assert_eq!(payload["title"], expected_title);
        assert_eq!(payload["status"], "publish");
        let meta = payload["meta_description"].as_str().unwrap();
        assert!(meta.contains(expected_title));

        let content = payload["content"].as_str().unwrap();
        assert!(content.contains("application/ld+json"));
        assert!(content.contains("Novel 0 wrecked me."));
        assert_eq!(content.matches("\"@type\": \"Book\"").count(), 3);
    }

    #[tokio::test]
    async fn prompt_sent_to_generator_is_clean() {
        let h = Harness::start().await;
        h.stories(8).await;
        h.generation(article_reply(), 1).await;
        h.publish(1).await;

        run_weekly_article(&h.cms(), &h.gemini(), &config(10, false), &SilentProgress)
            .await
            .unwrap();

        let requests = h.gemini_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();

        assert!(prompt.contains("- Novel 4: Plot 4"));
        assert!(!prompt.contains("Novel 5"));
        assert!(!prompt.contains("<b>"));
    }

    #[tokio::test]
    async fn empty_listing_stops_before_generation() {
        let h = Harness::start().await;
        h.stories(0).await;
        h.generation(article_reply(), 0).await;
        h.publish(0).await;

        let outcome = run_weekly_article(&h.cms(), &h.gemini(), &config(10, false), &SilentProgress)
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::NothingToPublish));
    }

    #[tokio::test]
    async fn fetch_failure_is_hard_stop() {
        let h = Harness::start().await;
        Mock::given(method("GET"))
            .and(path(RECENT))
            .respond_with(ResponseTemplate::new(500).set_body_string("fatal error"))
            .mount(&h.cms_server)
            .await;
        h.generation(article_reply(), 0).await;
        h.publish(0).await;

        let err = run_weekly_article(&h.cms(), &h.gemini(), &config(10, false), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, VolareError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn missing_candidates_halts_before_publish() {
        let h = Harness::start().await;
        h.stories(3).await;
        h.generation(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"promptFeedback": {}})),
            1,
        )
        .await;
        h.publish(0).await;

        let err = run_weekly_article(&h.cms(), &h.gemini(), &config(10, false), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, VolareError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn generator_error_status_halts_before_publish() {
        let h = Harness::start().await;
        h.stories(2).await;
        h.generation(ResponseTemplate::new(503).set_body_string("overloaded"), 1)
            .await;
        h.publish(0).await;

        let err = run_weekly_article(&h.cms(), &h.gemini(), &config(3, false), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, VolareError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn publish_failure_is_error() {
        let h = Harness::start().await;
        h.stories(2).await;
        h.generation(article_reply(), 1).await;
        Mock::given(method("POST"))
            .and(path(ARTICLE))
            .respond_with(ResponseTemplate::new(403).set_body_string("Invalid API key"))
            .mount(&h.cms_server)
            .await;

        let err = run_weekly_article(&h.cms(), &h.gemini(), &config(3, false), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, VolareError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn dry_run_prepares_without_publishing() {
        let h = Harness::start().await;
        h.stories(6).await;
        h.generation(article_reply(), 1).await;
        h.publish(0).await;

        let outcome = run_weekly_article(&h.cms(), &h.gemini(), &config(12, true), &SilentProgress)
            .await
            .unwrap();

        match outcome {
            RunOutcome::DryRun(prepared) => {
                assert_eq!(
                    prepared.draft.title,
                    "This Week's Fresh BL Picks: Feb 26 - Mar 05, 2026"
                );
                assert_eq!(prepared.draft.referenced_titles.len(), 4);
                assert!(prepared.post.meta_description.contains(&prepared.draft.title));
            }
            other => panic!("expected DryRun, got {other:?}"),
        }
    }
}
