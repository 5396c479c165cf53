//! Publishable artifacts derived from a generated draft.
//!
//! This crate provides:
//! - [`schema`]: schema.org `Article` metadata for search engines
//! - [`post`]: the final post body and CMS payload

pub mod post;
pub mod schema;

pub use post::{build_post, compose_body, meta_description};
pub use schema::{ArticleMetadata, build_metadata};
