//! Test utilities and fixtures for music-pages tests.
//!
//! Provides an in-memory [`TagDecoder`], a stub [`Renderer`] and small
//! factories so pipeline tests don't need real audio files.
//!
//! # Example
//!
//! ```ignore
//! use music_pages::test_utils::{FakeDecoder, tags};
//!
//! let decoder = FakeDecoder::default()
//!     .with("01.mp3", tags("Queen", "Jazz", "1", "1978"))
//!     .failing("broken.mp3", DecodeErrorKind::Corrupt);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::metadata::{DecodeError, DecodeErrorKind, TagBag, TagDecoder};
use crate::model::{PageDescriptor, TrackRecord, track_href};
use crate::site::Renderer;

/// Decoder that answers from a table keyed by file name.
///
/// Files not in the table fail with an `Io` error.
#[derive(Debug, Default, Clone)]
pub struct FakeDecoder {
    entries: HashMap<String, std::result::Result<TagBag, DecodeErrorKind>>,
}

impl FakeDecoder {
    pub fn with(mut self, file_name: &str, tags: TagBag) -> Self {
        self.entries.insert(file_name.to_string(), Ok(tags));
        self
    }

    pub fn failing(mut self, file_name: &str, kind: DecodeErrorKind) -> Self {
        self.entries.insert(file_name.to_string(), Err(kind));
        self
    }
}

#[async_trait]
impl TagDecoder for FakeDecoder {
    async fn decode(&self, path: &Path) -> std::result::Result<TagBag, DecodeError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.entries.get(&name) {
            Some(Ok(tags)) => Ok(tags.clone()),
            Some(Err(kind)) => Err(DecodeError::new(path, *kind, "fake failure")),
            None => Err(DecodeError::new(path, DecodeErrorKind::Io, "unknown file")),
        }
    }
}

/// Renderer that emits a one-line summary of the page.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubRenderer;

impl Renderer for StubRenderer {
    fn render(&self, page: &PageDescriptor) -> Result<String> {
        Ok(match page {
            PageDescriptor::Index { artists, copy, .. } => {
                format!("index artists={} copy={}", artists.len(), copy)
            }
            PageDescriptor::Artist { artist, .. } => format!("artist {artist}"),
            PageDescriptor::Album { title, tracks, .. } => {
                format!("album {title} tracks={}", tracks.len())
            }
        })
    }
}

/// Tag bag with the four fields the aggregator cares about.
///
/// Empty strings leave the field unset.
pub fn tags(artist: &str, album: &str, track: &str, year: &str) -> TagBag {
    let field = |s: &str| (!s.is_empty()).then(|| s.to_string());
    TagBag {
        artist: field(artist),
        album: field(album),
        title: Some(format!("{album} #{track}")),
        track: field(track),
        year: field(year),
        ..Default::default()
    }
}

/// Track record with parsed numbers.
pub fn track(artist: &str, album: &str, number: Option<i64>, year: Option<i64>) -> TrackRecord {
    let path = format!("/music/{artist}/{album}/{}.mp3", number.unwrap_or(0));
    TrackRecord {
        artist: artist.to_string(),
        album: album.to_string(),
        title: format!("{album} #{}", number.unwrap_or(0)),
        track: number,
        year,
        lyrics: None,
        comment: None,
        picture: None,
        href: track_href(&path),
        path,
    }
}
