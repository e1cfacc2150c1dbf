//! The sort pass between extraction and writing.

use crate::config::ArtistOrder;
use crate::model::{
    ArtistLink, INDEX_PATH, PageDescriptor, RenderReadyModel, SiteModel, album_path, artist_path,
    sort_tracks,
};

/// Settings that shape the render-ready model.
#[derive(Debug, Clone)]
pub struct FinalizeOptions {
    pub artist_order: ArtistOrder,
    pub index_title: String,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self {
            artist_order: ArtistOrder::default(),
            index_title: "Music".to_string(),
        }
    }
}

/// Sort and freeze the aggregated model.
///
/// Tracks end up ascending by number and albums descending by year; both
/// sorts are stable. Every artist and album page is re-derived from the
/// sorted data, and the index page is added at `/`.
pub fn finalize(model: SiteModel, options: &FinalizeOptions) -> RenderReadyModel {
    let (mut artists, mut pages) = model.into_parts();

    for artist in &mut artists {
        for album in &mut artist.albums {
            sort_tracks(&mut album.tracks);
        }
        artist.sort_albums();
    }

    for artist in &artists {
        pages.insert(artist_path(&artist.link), PageDescriptor::artist(artist));
        for album in &artist.albums {
            pages.insert(album_path(&artist.link, &album.link), PageDescriptor::album(album));
        }
    }

    let mut index: Vec<ArtistLink> = artists
        .iter()
        .map(|a| ArtistLink {
            name: a.name.clone(),
            link: a.link.clone(),
        })
        .collect();
    if options.artist_order == ArtistOrder::Alphabetical {
        index.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pages.insert(
        INDEX_PATH.to_string(),
        PageDescriptor::Index {
            title: options.index_title.clone(),
            artists: index.clone(),
            base: "/".to_string(),
            copy: false,
        },
    );

    tracing::debug!(
        artists = artists.len(),
        pages = pages.len(),
        "Model finalized"
    );
    RenderReadyModel::new(artists, index, pages)
}
