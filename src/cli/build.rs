//! The build command: load templates, extract, write.

use anyhow::Context;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::config::Config;
use crate::library::{self, BuildOptions};
use crate::metadata::{LoftyDecoder, TagDecoder};
use crate::site::{Renderer, SiteWriter, TemplateRenderer};

/// Build the site described by `config`.
pub fn cmd_build(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    // Templates load before any audio file is touched
    let renderer = match &config.paths.templates {
        Some(dir) => TemplateRenderer::from_dir(dir)?,
        None => TemplateRenderer::bundled()?,
    };

    build_with(rt, config, &LoftyDecoder, &renderer)
}

/// Build with an explicit decoder and renderer.
pub fn build_with<D, R>(rt: &Runtime, config: &Config, decoder: &D, renderer: &R) -> anyhow::Result<()>
where
    D: TagDecoder + ?Sized,
    R: Renderer + ?Sized,
{
    std::fs::create_dir_all(&config.paths.output).with_context(|| {
        format!("creating output directory {}", config.paths.output.display())
    })?;

    let options = BuildOptions::from_config(config);
    let (model, summary) = rt.block_on(library::build_site(decoder, &options))?;

    let writer = SiteWriter::new(&options.output_root, renderer, config.build.write_policy);
    let report = writer.write_all(&model)?;

    if let Some(dir) = &config.paths.copy_index {
        writer.write_copy_index(&model, dir)?;
    }

    info!(
        files = summary.discovered,
        decoded = summary.decoded,
        failed = summary.failed,
        pages = report.written.len(),
        "Build complete"
    );

    if !report.failed.is_empty() {
        warn!(failed = report.failed.len(), "Some pages could not be written");
        anyhow::bail!("{} of {} pages failed to write", report.failed.len(), model.pages().len());
    }
    Ok(())
}
