//! inkpress CLI: prepare Markdown documents for publishing.
//!
//! Parses and validates frontmatter, strips unsafe markup, moves embedded
//! images to a hosting endpoint, and checks the result before it is handed to
//! a publishing integration.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;
use inkpress_shared::InkpressError;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);

    if let Err(report) = commands::run(cli).await {
        // Document-level failures get a one-line message; anything else keeps
        // the full eyre report.
        if let Some(err) = report.downcast_ref::<InkpressError>() {
            eprintln!("{}", commands::render_error(err));
            std::process::exit(1);
        }
        return Err(report);
    }
    Ok(())
}
