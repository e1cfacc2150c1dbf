//! Music Pages - a static site generator for tagged music collections.
//!
//! Scans a music directory, reads each file's tags, groups tracks into
//! artists and albums, and writes one HTML page per artist and album plus
//! a top-level index.

pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod metadata;
pub mod model;
pub mod scanner;
pub mod site;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("music_pages=info".parse()?))
        .init();

    if let Err(e) = cli::run(&args) {
        tracing::error!(error = %e, "Build failed");
        return Err(e);
    }
    Ok(())
}
