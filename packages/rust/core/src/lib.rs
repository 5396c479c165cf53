//! Core pipeline orchestration for Volare.
//!
//! This crate ties together the CMS client, editorial rotation, article
//! generation, and post assembly into the weekly run (`run_weekly_article`).

pub mod generator;
pub mod pipeline;

pub use pipeline::{
    PreparedPost, ProgressReporter, RunConfig, RunOutcome, SilentProgress, run_weekly_article,
};
