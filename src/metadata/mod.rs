//! Audio file metadata reading.
//!
//! Uses the lofty crate for format-independent tag access. Every file is
//! decoded once into a [`TagBag`] with explicit optional fields; nothing
//! downstream probes the raw tag again.
//!
//! Decoding is exposed through the [`TagDecoder`] trait so the build
//! pipeline can be driven by an in-memory decoder in tests.

use async_trait::async_trait;
use lofty::error::ErrorKind;
use lofty::file::TaggedFileExt;
use lofty::picture::PictureType;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::fmt;
use std::path::{Path, PathBuf};

/// Metadata decoded from one file's embedded tag block.
///
/// Track number and year stay as the raw tag text ("3/12", "1999-04-01")
/// and are parsed when the [`TrackRecord`](crate::model::TrackRecord) is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBag {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track: Option<String>,
    pub year: Option<String>,
    pub lyrics: Option<String>,
    pub comment: Option<String>,
    /// Raw bytes of the front cover (or first picture)
    pub picture: Option<Vec<u8>>,
}

/// Category of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The file could not be opened or read
    Io,
    /// Not a container lofty recognises
    Unsupported,
    /// The file decoded but carries no tag block
    NoTags,
    /// The container or tag block is malformed
    Corrupt,
    /// The blocking decode task panicked or was cancelled
    TaskFailed,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Io => "io",
            Self::Unsupported => "unsupported",
            Self::NoTags => "no-tags",
            Self::Corrupt => "corrupt",
            Self::TaskFailed => "task-failed",
        };
        f.write_str(name)
    }
}

/// A single file's metadata could not be read.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Decode error ({kind}) for {path}: {info}")]
pub struct DecodeError {
    pub path: PathBuf,
    pub kind: DecodeErrorKind,
    pub info: String,
}

impl DecodeError {
    pub fn new(path: impl Into<PathBuf>, kind: DecodeErrorKind, info: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            info: info.into(),
        }
    }
}

/// Asynchronous tag decoding, one call per file.
///
/// Implementations must resolve exactly once per call, with either the tags
/// or an error.
#[async_trait]
pub trait TagDecoder: Send + Sync {
    async fn decode(&self, path: &Path) -> Result<TagBag, DecodeError>;
}

/// Production decoder: lofty on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyDecoder;

#[async_trait]
impl TagDecoder for LoftyDecoder {
    async fn decode(&self, path: &Path) -> Result<TagBag, DecodeError> {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || read(&owned))
            .await
            .map_err(|e| DecodeError::new(path, DecodeErrorKind::TaskFailed, e.to_string()))?
    }
}

/// Read the tag bag of a single file synchronously.
pub fn read(path: &Path) -> Result<TagBag, DecodeError> {
    let tagged_file = Probe::open(path)
        .and_then(|probe| probe.read())
        .map_err(|e| {
            let kind = match e.kind() {
                ErrorKind::Io(_) => DecodeErrorKind::Io,
                ErrorKind::UnknownFormat => DecodeErrorKind::Unsupported,
                _ => DecodeErrorKind::Corrupt,
            };
            DecodeError::new(path, kind, e.to_string())
        })?;

    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .ok_or_else(|| DecodeError::new(path, DecodeErrorKind::NoTags, "No tag block found"))?;

    Ok(tag_bag(tag))
}

fn tag_bag(tag: &Tag) -> TagBag {
    let text = |key: ItemKey| tag.get_string(&key).map(str::to_string);

    let track = text(ItemKey::TrackNumber).or_else(|| tag.track().map(|n| n.to_string()));
    let year = text(ItemKey::Year)
        .or_else(|| text(ItemKey::RecordingDate))
        .or_else(|| tag.year().map(|y| y.to_string()));

    // Prefer the front cover, fall back to the first picture
    let pictures = tag.pictures();
    let picture = pictures
        .iter()
        .find(|p| p.pic_type() == PictureType::CoverFront)
        .or_else(|| pictures.first())
        .map(|p| p.data().to_vec());

    TagBag {
        title: tag.title().map(|s| s.to_string()),
        artist: tag.artist().map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
        track,
        year,
        lyrics: text(ItemKey::Lyrics),
        comment: tag.comment().map(|s| s.to_string()),
        picture,
    }
}
