//! Folds decoded tracks into the [`SiteModel`].

use std::sync::Arc;

use crate::model::{PageDescriptor, SiteModel, TrackRecord, album_path, artist_path, sort_tracks};

/// Builds the site model one track at a time, in arrival order.
///
/// Artists and albums are keyed by exact name: no trimming or case folding,
/// so `"Queen"` and `"queen "` are separate artists. Every insert rewrites
/// the album page it touches in the path index. The artist page only lists
/// album summaries, so it is rewritten when an album is added.
#[derive(Debug, Default)]
pub struct Aggregator {
    model: SiteModel,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one decoded track. Never fails.
    pub fn add_track(&mut self, record: TrackRecord) {
        let record = Arc::new(record);

        let artist = self.model.artist_entry(&record.artist);
        let known_albums = artist.albums.len();
        let album = artist.album_entry(&record);
        album.tracks.push(Arc::clone(&record));
        sort_tracks(&mut album.tracks);

        let album_url = album_path(&album.artist_link, &album.link);
        let album_page = PageDescriptor::album(album);
        let artist_page = (artist.albums.len() > known_albums)
            .then(|| (artist_path(&artist.link), PageDescriptor::artist(artist)));

        if let Some((url, page)) = artist_page {
            self.model.pages.insert(url, page);
        }
        self.model.pages.insert(album_url, album_page);
    }

    #[cfg(test)]
    pub fn model(&self) -> &SiteModel {
        &self.model
    }

    pub fn into_model(self) -> SiteModel {
        self.model
    }
}
