//! Error types for catalog retrieval and preview playback

use thiserror::Error;

use crate::model::TrackId;

/// Failure to retrieve or parse the chart catalog
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("catalog responded with HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("catalog payload could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to open an audio resource for a preview URL
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("track has no preview URL")]
    MissingPreview,

    #[error("failed to download preview: {0}")]
    Fetch(String),

    #[error("failed to decode preview: {0}")]
    Decode(String),

    #[error("audio engine is not running")]
    EngineStopped,
}

/// Errors surfaced by the playback controller
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("could not play \"{title}\" ({track_id}): {source}")]
    Load {
        track_id: TrackId,
        title: String,
        #[source]
        source: LoadError,
    },
}
