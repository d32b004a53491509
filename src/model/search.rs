//! Catalog search filter

use super::track::Track;

/// Tracks whose title or artist contains `query`, case-insensitively, in catalog
/// order. A blank query keeps every track.
pub fn filter_tracks<'a>(tracks: &'a [Track], query: &str) -> Vec<&'a Track> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tracks.iter().collect();
    }

    tracks
        .iter()
        .filter(|track| {
            track.title.to_lowercase().contains(&needle)
                || track.artist_name.to_lowercase().contains(&needle)
        })
        .collect()
}
