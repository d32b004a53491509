use std::{env, path::PathBuf};

use super::schema::Settings;

impl Settings {
    /// Load settings from the optional config file, then `TUNEPEEK__*` environment variables.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TUNEPEEK")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.catalog.chart_url.trim().is_empty() {
            return Err("catalog.chart_url must not be empty".to_string());
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err("catalog.request_timeout_secs must be >= 1".to_string());
        }
        if self.playback.completion_poll_ms == 0 {
            return Err("playback.completion_poll_ms must be >= 1".to_string());
        }
        if self.ui.error_ttl_secs == 0 {
            return Err("ui.error_ttl_secs must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `TUNEPEEK_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TUNEPEEK_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/tunepeek/config.toml`, or `~/.config/tunepeek/config.toml`
/// when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("tunepeek").join("config.toml"))
}
