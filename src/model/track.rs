//! Catalog track entity

pub type TrackId = u64;

/// One chart entry with playable preview metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist_name: String,
    pub album_art_url: String,
    pub preview_url: String,
    pub rank: Option<u32>,
}

impl Track {
    /// Badge text for the track card.
    pub fn rank_label(&self) -> String {
        match self.rank {
            Some(rank) => format!("Rank #{rank}"),
            None => "Popular".to_string(),
        }
    }
}

#[cfg(test)]
impl Track {
    pub(crate) fn sample(id: TrackId, title: &str, artist_name: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist_name: artist_name.to_string(),
            album_art_url: String::new(),
            preview_url: format!("https://cdn.test/preview/{id}.mp3"),
            rank: None,
        }
    }
}
