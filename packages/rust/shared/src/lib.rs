//! Shared types, error model, and configuration for the Volare article generator.
//!
//! This crate is the foundation depended on by all other Volare crates.
//! It provides:
//! - [`VolareError`]: the unified error type
//! - Domain types ([`CatalogItem`], [`ArticleDraft`], [`NewPost`], [`PublishResult`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading, API key resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ArticleConfig, CmsConfig, GeminiConfig, SiteConfig, config_dir, config_file_path,
    init_config, init_config_at, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, VolareError};
pub use types::{ArticleDraft, CatalogItem, NewPost, PostStatus, PublishResult, RunId, lenient_id};
