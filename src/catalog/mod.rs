//! Chart catalog retrieval
//!
//! [`CatalogProvider`] is the seam the app loads tracks through; [`DeezerCatalog`]
//! implements it against Deezer's public chart endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CatalogSettings;
use crate::error::NetworkError;
use crate::model::Track;

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch_tracks(&self) -> Result<Vec<Track>, NetworkError>;
}

/// Fetch the catalog, treating any failure as an empty chart.
pub async fn load_catalog(provider: &dyn CatalogProvider) -> Vec<Track> {
    match provider.fetch_tracks().await {
        Ok(tracks) => {
            tracing::info!(count = tracks.len(), "Catalog loaded");
            tracks
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fetching tracks");
            Vec::new()
        }
    }
}

pub struct DeezerCatalog {
    http: reqwest::Client,
    chart_url: String,
}

impl DeezerCatalog {
    pub fn new(settings: &CatalogSettings) -> Result<Self, NetworkError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            http,
            chart_url: settings.chart_url.clone(),
        })
    }
}

#[async_trait]
impl CatalogProvider for DeezerCatalog {
    async fn fetch_tracks(&self) -> Result<Vec<Track>, NetworkError> {
        tracing::debug!(url = %self.chart_url, "Catalog request started");

        let response = self
            .http
            .get(&self.chart_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status(status));
        }

        let body = response.text().await?;
        parse_chart(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    preview: String,
    #[serde(default)]
    rank: Option<u32>,
    #[serde(default)]
    artist: DeezerArtist,
    #[serde(default)]
    album: DeezerAlbum,
}

#[derive(Debug, Default, Deserialize)]
struct DeezerArtist {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct DeezerAlbum {
    #[serde(default)]
    cover_medium: String,
}

impl From<DeezerTrack> for Track {
    fn from(wire: DeezerTrack) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            artist_name: wire.artist.name,
            album_art_url: wire.album.cover_medium,
            preview_url: wire.preview,
            rank: wire.rank.filter(|rank| *rank > 0),
        }
    }
}

/// Parse a chart payload. A payload without a track page yields no tracks, and
/// entries that don't decode are skipped.
pub(crate) fn parse_chart(body: &str) -> Result<Vec<Track>, NetworkError> {
    let chart: ChartResponse = serde_json::from_str(body)?;
    let entries = chart.tracks.map(|page| page.data).unwrap_or_default();

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<DeezerTrack>(entry) {
            Ok(track) => Some(Track::from(track)),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed chart entry");
                None
            }
        })
        .collect())
}
