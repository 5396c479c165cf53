//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use volare_cms::{CmsClient, CmsOptions, RecentWindow};
use volare_core::{ProgressReporter, RunConfig, RunOutcome, run_weekly_article};
use volare_editorial::{date_range, iso_week, rotation_for_week, validate_week};
use volare_gemini::{GeminiClient, GeminiOptions};
use volare_shared::{AppConfig, init_config, load_config, load_config_from, resolve_api_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Volare: weekly novel recommendation articles, written and published.
#[derive(Parser)]
#[command(
    name = "volare",
    version,
    about = "Generate and publish the weekly novel recommendation article.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.volare/volare.toml.
    #[arg(long, global = true, env = "VOLARE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch recent stories, write this week's article, and publish it.
    Run {
        /// Trailing window in days (overrides [article].window_days).
        #[arg(long)]
        days: Option<u32>,

        /// Maximum stories to request (overrides [article].per_page).
        #[arg(long)]
        per_page: Option<u32>,

        /// Rotation week, 1-53 (defaults to the current ISO week).
        #[arg(long)]
        week: Option<u32>,

        /// Build the post but print it instead of publishing.
        #[arg(long)]
        dry_run: bool,

        /// Exit 0 when there is nothing new to write about.
        #[arg(long)]
        empty_ok: bool,
    },

    /// Show the editorial angle for a week without touching the network.
    Theme {
        /// Rotation week, 1-53 (defaults to the current ISO week).
        #[arg(long)]
        week: Option<u32>,
    },

    /// Print the raw CMS record for one story.
    Story {
        /// Story post ID.
        id: u64,
    },

    /// Check that the CMS plugin is reachable.
    Health,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "volare=info",
        1 => "volare=debug",
        _ => "volare=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Run {
            days,
            per_page,
            week,
            dry_run,
            empty_ok,
        } => {
            let opts = RunOptions {
                days,
                per_page,
                week,
                dry_run,
                empty_ok,
            };
            cmd_run(config_path, opts).await
        }
        Command::Theme { week } => cmd_theme(week).map(|()| ExitCode::SUCCESS),
        Command::Story { id } => cmd_story(config_path, id).await,
        Command::Health => cmd_health(config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().map(|()| ExitCode::SUCCESS),
            ConfigAction::Show => cmd_config_show(config_path).map(|()| ExitCode::SUCCESS),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

fn cms_client(config: &AppConfig, api_key: String) -> Result<CmsClient> {
    let opts = CmsOptions {
        timeout_secs: config.cms.timeout_secs,
        ..CmsOptions::new(&config.cms.base_url, api_key)
    };
    Ok(CmsClient::new(&opts)?)
}

fn gemini_client(config: &AppConfig) -> Result<GeminiClient> {
    let api_key = resolve_api_key(&config.gemini.api_key_env)?;
    let opts = GeminiOptions {
        endpoint: config.gemini.endpoint.clone(),
        timeout_secs: config.gemini.timeout_secs,
        ..GeminiOptions::new(api_key, &config.gemini.model)
    };
    Ok(GeminiClient::new(&opts)?)
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn week_or_current(week: Option<u32>) -> Result<u32> {
    match week {
        Some(w) => Ok(validate_week(w)?),
        None => Ok(iso_week(today())),
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

struct RunOptions {
    days: Option<u32>,
    per_page: Option<u32>,
    week: Option<u32>,
    dry_run: bool,
    empty_ok: bool,
}

async fn cmd_run(config_path: Option<&Path>, opts: RunOptions) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;

    // Both keys are checked before any request goes out.
    let cms_key = resolve_api_key(&config.cms.api_key_env)?;
    let gemini = gemini_client(&config)?;
    let cms = cms_client(&config, cms_key)?;

    let window = RecentWindow {
        days: opts.days.unwrap_or(config.article.window_days),
        per_page: opts.per_page.unwrap_or(config.article.per_page),
    };
    if window.days == 0 || window.per_page == 0 {
        return Err(eyre!("--days and --per-page must be at least 1"));
    }

    let run_config = RunConfig {
        window,
        week: week_or_current(opts.week)?,
        today: today(),
        site: config.site.clone(),
        dry_run: opts.dry_run,
    };

    let reporter = CliProgress::new()?;
    let outcome = run_weekly_article(&cms, &gemini, &run_config, &reporter).await?;

    println!();
    let code = match outcome {
        RunOutcome::Published { title, result } => {
            println!("  Article published!");
            println!("  Title: {title}");
            if let Some(id) = result.id {
                println!("  ID:    {id}");
            }
            println!("  Link:  {}", result.link.as_deref().unwrap_or("(not returned)"));
            ExitCode::SUCCESS
        }
        RunOutcome::DryRun(prepared) => {
            println!("  Dry run: nothing was published.");
            println!("  Template:    {}", prepared.rotation.theme.kind);
            println!("  Title:       {}", prepared.post.title);
            println!("  Description: {}", prepared.post.meta_description);
            println!("  Featuring:   {}", prepared.draft.referenced_titles.join(", "));
            println!();
            println!("{}", prepared.post.content);
            ExitCode::SUCCESS
        }
        RunOutcome::NothingToPublish => {
            println!("  No new stories this week, nothing to publish.");
            if opts.empty_ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    };
    println!();

    Ok(code)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &RunOutcome) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Error paths never reach `done`.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

// ---------------------------------------------------------------------------
// theme / story / health
// ---------------------------------------------------------------------------

fn cmd_theme(week: Option<u32>) -> Result<()> {
    let week = week_or_current(week)?;
    let pick = rotation_for_week(week);

    println!();
    println!("  Week:      {week}");
    println!("  Template:  {}", pick.theme.kind);
    println!("  Title:     {}", pick.title(&date_range(today())));
    println!("  Focus:     {}", pick.theme.focus);
    println!("  Subject:   {}", pick.subject());
    println!("  Trope:     {}", pick.trope);
    println!("  Mood:      {}", pick.mood);
    println!("  Archetype: {}", pick.character_type);
    println!();
    Ok(())
}

async fn cmd_story(config_path: Option<&Path>, id: u64) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    let cms = cms_client(&config, resolve_api_key(&config.cms.api_key_env)?)?;

    info!(id, "fetching story detail");
    match cms.story_detail(id).await? {
        Some(detail) => {
            println!("{}", serde_json::to_string_pretty(&detail)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("story {id} not found");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn cmd_health(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    // The health route does not check the key; send it only if present.
    let api_key = resolve_api_key(&config.cms.api_key_env).unwrap_or_default();
    let cms = cms_client(&config, api_key)?;

    let health = cms.health().await?;
    println!();
    println!("  Site:      {}", config.cms.base_url);
    println!("  Status:    {}", health.status);
    println!("  WordPress: {}", health.wordpress.as_deref().unwrap_or("?"));
    println!("  PHP:       {}", health.php.as_deref().unwrap_or("?"));
    if let Some(ts) = &health.timestamp {
        println!("  Checked:   {ts}");
    }
    println!();

    Ok(if health.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
