//! Gitblog CLI: render an issue tracker into a blog index, feed, and archive.
//!
//! Reads every issue of a repository, writes a categorized README, an Atom
//! feed, and one Markdown backup per issue.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
