//! Volare CLI: weekly novel recommendation articles.
//!
//! Pulls recently added stories from the CMS, has the generative text
//! service write a themed article about them, and publishes the result.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
