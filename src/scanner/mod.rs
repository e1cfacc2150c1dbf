//! Audio file discovery.
//!
//! Walks the music directory recursively and returns every file whose
//! extension matches the configured audio extensions. Results are sorted by
//! path so repeated runs see the files in the same order.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default extensions: mp3, flac, ogg, wav, m4a.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a"];

/// Check a path against a list of extensions (case-insensitive).
pub fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Enumerate audio files beneath `root`.
///
/// A missing root yields an empty list: the build still produces an empty
/// index page. Unreadable entries are logged and skipped.
pub fn scan(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    if !root.exists() {
        warn!(root = %root.display(), "Music directory does not exist");
        return Vec::new();
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_audio_file(entry.path(), extensions) {
            paths.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), count = paths.len(), "Scan finished");
    paths
}
