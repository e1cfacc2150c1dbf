//! Core data models for the generated site.
//!
//! Defines the hierarchy built while tags stream in: [`SiteModel`] holds
//! [`ArtistGroup`]s, which hold [`AlbumGroup`]s, which hold [`TrackRecord`]s.
//! Next to that hierarchy the model keeps a *path index*: a map from output
//! URL path to the [`PageDescriptor`] needed to render that page.
//!
//! # URL layout
//!
//! - `/` - top-level index of artists
//! - `/<artist-link>` - one page per artist
//! - `/<artist-link>/<album-link>` - one page per album
//!
//! Links are unique within their scope: artist links across the site, album
//! links within one artist. A name whose tidied link is already taken gets a
//! `__2`, `__3`, ... suffix, in arrival order.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::metadata::TagBag;

/// URL path of the top-level index page.
pub const INDEX_PATH: &str = "/";

/// Turn a name into a URL-safe path segment.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`. An empty name maps
/// to `_` so it can never collide with the index page.
pub fn tidy_url(text: &str) -> String {
    if text.is_empty() {
        return "_".to_string();
    }
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Claim a link within one scope, suffixing `__2`, `__3`, ... until it is free.
pub fn claim_link(base: String, taken: &mut HashSet<String>) -> String {
    let mut link = base.clone();
    let mut n = 1;
    while !taken.insert(link.clone()) {
        n += 1;
        link = format!("{base}__{n}");
    }
    link
}

/// URL path of an artist page.
pub fn artist_path(artist_link: &str) -> String {
    format!("/{artist_link}")
}

/// URL path of an album page.
pub fn album_path(artist_link: &str, album_link: &str) -> String {
    format!("/{artist_link}/{album_link}")
}

/// Parse the leading integer of a tag value ("3/12" -> 3, "1999-04-01" -> 1999).
///
/// Leading whitespace and a sign are accepted; anything without leading
/// digits is `None`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Escape lyrics for HTML and turn every line break into `<br>`.
pub fn normalize_lyrics(text: &str) -> String {
    let escaped = handlebars::html_escape(text);
    escaped
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}

/// Express `file` relative to `root` as a site path.
///
/// Files under `root` become `/sub/dir/file.mp3`; files elsewhere get `..`
/// segments. Both paths should already be canonical.
pub fn site_relative_path(file: &Path, root: &Path) -> String {
    let file_parts: Vec<Component<'_>> = file.components().collect();
    let root_parts: Vec<Component<'_>> = root.components().collect();
    let common = file_parts
        .iter()
        .zip(&root_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = vec!["..".to_string(); root_parts.len() - common];
    segments.extend(
        file_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if common == root_parts.len() {
        format!("/{}", segments.join("/"))
    } else {
        segments.join("/")
    }
}

/// Number of directories between the output root and an album page.
const ALBUM_PAGE_DEPTH: usize = 2;

/// Link to a source file from an album page.
///
/// Every segment is percent-encoded. Paths under the output root stay
/// root-absolute; paths outside it are made relative to the album page
/// directory, which always sits two levels below the root.
pub fn track_href(site_path: &str) -> String {
    let encoded = site_path
        .split('/')
        .map(|segment| match segment {
            "" | ".." => segment.to_string(),
            _ => urlencoding::encode(segment).into_owned(),
        })
        .collect::<Vec<_>>()
        .join("/");

    if site_path.starts_with('/') {
        encoded
    } else {
        format!("{}{encoded}", "../".repeat(ALBUM_PAGE_DEPTH))
    }
}

/// Relative URL prefix leading from `from_dir` to `root`, ending in `/`.
///
/// Used by pages written outside the output root. Both paths should already
/// be canonical.
pub fn relative_base(from_dir: &Path, root: &Path) -> String {
    let from_parts: Vec<Component<'_>> = from_dir.components().collect();
    let root_parts: Vec<Component<'_>> = root.components().collect();
    let common = from_parts
        .iter()
        .zip(&root_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = vec!["..".to_string(); from_parts.len() - common];
    segments.extend(
        root_parts[common..]
            .iter()
            .map(|c| urlencoding::encode(&c.as_os_str().to_string_lossy()).into_owned()),
    );
    segments.iter().map(|s| format!("{s}/")).collect()
}

/// Canonical form of `path`, or `path` itself when it cannot be resolved.
pub fn canonical_or_self(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve a site path produced by [`site_relative_path`] back to a file.
pub fn resolve_site_path(root: &Path, site_path: &str) -> PathBuf {
    site_path
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Embedded cover art. Serializes as a `data:image/jpeg;base64,...` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover(pub Vec<u8>);

impl Cover {
    pub fn data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&self.0))
    }
}

impl Serialize for Cover {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data_uri())
    }
}

/// One successfully decoded file. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub artist: String,
    pub album: String,
    pub title: String,
    /// Leading integer of the track tag, if any
    pub track: Option<i64>,
    /// Leading integer of the year tag, if any
    pub year: Option<i64>,
    /// HTML with line breaks as `<br>`
    pub lyrics: Option<String>,
    pub comment: Option<String>,
    pub picture: Option<Cover>,
    /// Source file as a site path (see [`site_relative_path`])
    pub path: String,
    /// Percent-encoded link to the source file (see [`track_href`])
    pub href: String,
}

impl TrackRecord {
    /// Build a record from decoded tags.
    ///
    /// Missing artist or album become empty strings and are grouped like any
    /// other name.
    pub fn from_tags(tags: TagBag, path: String) -> Self {
        Self {
            artist: tags.artist.unwrap_or_default(),
            album: tags.album.unwrap_or_default(),
            title: tags.title.unwrap_or_default(),
            track: tags.track.as_deref().and_then(parse_leading_int),
            year: tags.year.as_deref().and_then(parse_leading_int),
            lyrics: tags.lyrics.as_deref().map(normalize_lyrics),
            comment: tags.comment,
            picture: tags.picture.map(Cover),
            href: track_href(&path),
            path,
        }
    }

    /// Sort key: ascending track number, untracked entries last.
    pub fn order_key(&self) -> (bool, i64) {
        (self.track.is_none(), self.track.unwrap_or(0))
    }
}

/// Sort tracks by number. Stable, so equal numbers keep arrival order.
pub fn sort_tracks(tracks: &mut [Arc<TrackRecord>]) {
    tracks.sort_by_key(|t| t.order_key());
}

/// All tracks of one (artist, album) pair.
#[derive(Debug, Clone)]
pub struct AlbumGroup {
    pub name: String,
    pub artist: String,
    pub artist_link: String,
    pub link: String,
    /// Year of the first track added, 0 when that track had none
    pub year: i64,
    pub tracks: Vec<Arc<TrackRecord>>,
}

impl AlbumGroup {
    pub fn new(first: &TrackRecord, artist_link: String, link: String) -> Self {
        Self {
            name: first.album.clone(),
            artist: first.artist.clone(),
            artist_link,
            link,
            year: first.year.unwrap_or(0),
            tracks: Vec::new(),
        }
    }
}

/// All albums of one artist, in first-seen order until finalized.
#[derive(Debug, Clone)]
pub struct ArtistGroup {
    pub name: String,
    pub link: String,
    pub albums: Vec<AlbumGroup>,
    album_index: HashMap<String, usize>,
    album_links: HashSet<String>,
}

impl ArtistGroup {
    pub fn new(name: &str, link: String) -> Self {
        Self {
            name: name.to_string(),
            link,
            albums: Vec::new(),
            album_index: HashMap::new(),
            album_links: HashSet::new(),
        }
    }

    /// Look up an album by exact name.
    #[cfg(test)]
    pub fn album(&self, name: &str) -> Option<&AlbumGroup> {
        self.album_index.get(name).map(|&i| &self.albums[i])
    }

    /// Get the album for this track, creating it from the track if absent.
    pub fn album_entry(&mut self, track: &TrackRecord) -> &mut AlbumGroup {
        let idx = match self.album_index.get(&track.album) {
            Some(&idx) => idx,
            None => {
                let link = claim_link(tidy_url(&track.album), &mut self.album_links);
                self.albums.push(AlbumGroup::new(track, self.link.clone(), link));
                let idx = self.albums.len() - 1;
                self.album_index.insert(track.album.clone(), idx);
                idx
            }
        };
        &mut self.albums[idx]
    }

    /// Sort albums newest first (stable) and rebuild the name lookup.
    pub fn sort_albums(&mut self) {
        self.albums.sort_by(|a, b| b.year.cmp(&a.year));
        self.album_index = self
            .albums
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.clone(), i))
            .collect();
    }
}

/// What an artist page lists for one album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumLink {
    pub name: String,
    pub artist_link: String,
    pub link: String,
    pub year: i64,
}

impl AlbumLink {
    pub fn new(album: &AlbumGroup) -> Self {
        Self {
            name: album.name.clone(),
            artist_link: album.artist_link.clone(),
            link: album.link.clone(),
            year: album.year,
        }
    }
}

/// Name and link of one artist, as listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistLink {
    pub name: String,
    pub link: String,
}

/// Everything needed to render one page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageDescriptor {
    Artist {
        artist: String,
        link: String,
        title: String,
        albums: Vec<AlbumLink>,
    },
    Album {
        album: String,
        artist: String,
        artist_link: String,
        year: i64,
        title: String,
        tracks: Vec<Arc<TrackRecord>>,
    },
    Index {
        title: String,
        artists: Vec<ArtistLink>,
        /// Prefix of every link on the page: `/` for the site itself, a
        /// relative path back to the output root for the secondary copy
        base: String,
        /// Set on the secondary copy of the index page
        copy: bool,
    },
}

impl PageDescriptor {
    pub fn artist(group: &ArtistGroup) -> Self {
        Self::Artist {
            artist: group.name.clone(),
            link: group.link.clone(),
            title: group.name.clone(),
            albums: group.albums.iter().map(AlbumLink::new).collect(),
        }
    }

    pub fn album(album: &AlbumGroup) -> Self {
        Self::Album {
            album: album.name.clone(),
            artist: album.artist.clone(),
            artist_link: album.artist_link.clone(),
            year: album.year,
            title: format!("{} | {}", album.name, album.artist),
            tracks: album.tracks.clone(),
        }
    }

    pub fn kind(&self) -> PageKind {
        match self {
            Self::Artist { .. } => PageKind::Artist,
            Self::Album { .. } => PageKind::Album,
            Self::Index { .. } => PageKind::Index,
        }
    }
}

/// Page template selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Index,
    Artist,
    Album,
}

impl PageKind {
    pub const ALL: [PageKind; 3] = [PageKind::Index, PageKind::Artist, PageKind::Album];

    /// Template name, also the template file stem.
    pub fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Artist => "artist",
            Self::Album => "album",
        }
    }
}

/// The aggregate built during the extraction phase.
#[derive(Debug, Default)]
pub struct SiteModel {
    /// Artists in first-seen order
    pub artists: Vec<ArtistGroup>,
    artist_index: HashMap<String, usize>,
    artist_links: HashSet<String>,
    /// URL path -> page; last write wins
    pub pages: BTreeMap<String, PageDescriptor>,
}

impl SiteModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an artist by exact name.
    #[cfg(test)]
    pub fn artist(&self, name: &str) -> Option<&ArtistGroup> {
        self.artist_index.get(name).map(|&i| &self.artists[i])
    }

    /// Get an artist group, creating it if absent.
    pub fn artist_entry(&mut self, name: &str) -> &mut ArtistGroup {
        let idx = match self.artist_index.get(name) {
            Some(&idx) => idx,
            None => {
                let link = claim_link(tidy_url(name), &mut self.artist_links);
                self.artists.push(ArtistGroup::new(name, link));
                let idx = self.artists.len() - 1;
                self.artist_index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.artists[idx]
    }

    /// Split into artists and path index, dropping the name lookup.
    pub fn into_parts(self) -> (Vec<ArtistGroup>, BTreeMap<String, PageDescriptor>) {
        (self.artists, self.pages)
    }

    #[cfg(test)]
    pub fn track_count(&self) -> usize {
        self.artists
            .iter()
            .flat_map(|a| &a.albums)
            .map(|al| al.tracks.len())
            .sum()
    }
}

/// The sorted, read-only model used by the write phase.
#[derive(Debug)]
pub struct RenderReadyModel {
    artists: Vec<ArtistGroup>,
    index: Vec<ArtistLink>,
    pages: BTreeMap<String, PageDescriptor>,
}

impl RenderReadyModel {
    pub(crate) fn new(
        artists: Vec<ArtistGroup>,
        index: Vec<ArtistLink>,
        pages: BTreeMap<String, PageDescriptor>,
    ) -> Self {
        Self {
            artists,
            index,
            pages,
        }
    }

    pub fn artists(&self) -> &[ArtistGroup] {
        &self.artists
    }

    /// Artists as listed on the index page.
    pub fn index(&self) -> &[ArtistLink] {
        &self.index
    }

    /// Every page keyed by URL path, in path order.
    pub fn pages(&self) -> &BTreeMap<String, PageDescriptor> {
        &self.pages
    }

    pub fn page(&self, path: &str) -> Option<&PageDescriptor> {
        self.pages.get(path)
    }
}
