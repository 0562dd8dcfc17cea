//! Folio CLI: browse a headless-CMS blog catalog from the terminal.
//!
//! Lists, searches and shows articles fetched from a GraphQL content API.

mod commands;
mod output;

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
