//! htmlpack CLI: bundle a web project into one self-contained HTML file.
//!
//! Accepts a zip archive, a project directory, a GitHub repository, or a
//! single HTML/MHTML document and writes a minified single-file page.

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
