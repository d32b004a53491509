use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level application settings.
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TUNEPEEK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Chart endpoint returning `{ "tracks": { "data": [...] } }`.
    pub chart_url: String,
    /// Upper bound for the whole catalog request (seconds).
    pub request_timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            chart_url: "https://api.deezer.com/chart?limit=30".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl CatalogSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often the audio thread checks open sinks for end-of-stream (milliseconds).
    pub completion_poll_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            completion_poll_ms: 200,
        }
    }
}

impl PlaybackSettings {
    pub fn completion_poll(&self) -> Duration {
        Duration::from_millis(self.completion_poll_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Name shown in the greeting header.
    pub display_name: String,
    /// Seconds an error notice stays on screen.
    pub error_ttl_secs: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            display_name: "User".to_string(),
            error_ttl_secs: 5,
        }
    }
}

impl UiSettings {
    pub fn error_ttl(&self) -> Duration {
        Duration::from_secs(self.error_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(".logs"),
            default_filter: "tunepeek=debug,warn".to_string(),
        }
    }
}
