//! Command-line interface for music-pages.
//!
//! There is a single operation, building the site; the arguments only
//! override paths.

mod args;
mod build;

pub use args::{Cli, Override};
pub use build::{build_with, cmd_build};

use tokio::runtime::Runtime;

use crate::config;

/// Resolve configuration from the arguments and run the build.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    cli.apply(&mut config);

    let cwd = std::env::current_dir()?;
    config.resolve_paths(&cwd);

    let rt = Runtime::new()?;
    cmd_build(&rt, &config)
}
