//! LeadLens CLI — prospect analysis and outreach generation.
//!
//! Enriches a professional profile, derives buying-intent signals, and
//! generates a strategic brief plus personalized outreach, backed by a
//! searchable knowledge base.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
