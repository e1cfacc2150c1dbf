//! The extraction phase: scan, decode, aggregate, finalize.
//!
//! Every discovered file gets its decode future up front. Results are
//! consumed one at a time by a single loop that owns the [`Aggregator`] and
//! the [`CompletionTracker`], so the model is never shared between writers.
//! Results are drained in scan order, which keeps repeated runs over the
//! same directory byte-for-byte identical. Finalize runs once the tracker
//! reports the last file; zero files means the tracker starts complete.

mod aggregator;
mod completion;
mod finalize;

pub use aggregator::Aggregator;
pub use completion::CompletionTracker;
pub use finalize::{FinalizeOptions, finalize};

use futures::StreamExt;
use futures::stream::FuturesOrdered;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result, ResultExt};
use crate::metadata::TagDecoder;
use crate::model::{RenderReadyModel, TrackRecord, canonical_or_self, site_relative_path};
use crate::scanner;

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub music_root: PathBuf,
    pub output_root: PathBuf,
    pub extensions: Vec<String>,
    pub finalize: FinalizeOptions,
}

impl BuildOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            music_root: config.paths.music.clone(),
            output_root: config.paths.output.clone(),
            extensions: config.build.extensions.clone(),
            finalize: FinalizeOptions {
                artist_order: config.build.artist_order,
                index_title: config.build.index_title.clone(),
            },
        }
    }
}

/// Counts reported at the end of the extraction phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub discovered: usize,
    pub decoded: usize,
    pub failed: usize,
}

/// Run the extraction phase and return the render-ready model.
///
/// A file that fails to decode is logged and counted; it never stops the
/// others. An empty or missing music directory produces a model holding
/// only the index page.
pub async fn build_site<D>(decoder: &D, options: &BuildOptions) -> Result<(RenderReadyModel, BuildSummary)>
where
    D: TagDecoder + ?Sized,
{
    let music_root = canonical_or_self(&options.music_root);
    let output_root = canonical_or_self(&options.output_root);

    let scan_root = music_root.clone();
    let extensions = options.extensions.clone();
    let paths = tokio::task::spawn_blocking(move || scanner::scan(&scan_root, &extensions))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
        .with_context("scanning music directory")?;

    info!(root = %music_root.display(), files = paths.len(), "Discovered audio files");

    // Total is fixed before any decode starts
    let tracker = CompletionTracker::new(paths.len());
    let mut aggregator = Aggregator::new();
    let mut summary = BuildSummary {
        discovered: paths.len(),
        ..Default::default()
    };

    let mut decodes: FuturesOrdered<_> = paths
        .iter()
        .map(|path| async move { (path, decoder.decode(path).await) })
        .collect();

    let mut complete = tracker.is_complete();
    while !complete {
        let Some((path, result)) = decodes.next().await else {
            break;
        };
        match result {
            Ok(tags) => {
                let site_path = site_relative_path(path, &output_root);
                debug!(path = %path.display(), "Decoded tags");
                aggregator.add_track(TrackRecord::from_tags(tags, site_path));
                summary.decoded += 1;
            }
            Err(e) => {
                warn!(
                    path = %e.path.display(),
                    kind = %e.kind,
                    info = %e.info,
                    "Failed to read tags"
                );
                summary.failed += 1;
            }
        }
        complete = tracker.record_completion();
    }
    // Errors if the stream ended before every file reported
    let total = tracker.total();
    tracker.release()?;
    debug!(total, "All files accounted for");
    let model = finalize(aggregator.into_model(), &options.finalize);

    info!(
        decoded = summary.decoded,
        failed = summary.failed,
        artists = model.artists().len(),
        "Extraction finished"
    );
    Ok((model, summary))
}
