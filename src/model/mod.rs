//! Model module - Application state and data types
//!
//! - `track`: Catalog track entity
//! - `types`: UI state
//! - `playback`: The playback session owned by the playback controller
//! - `counter`: Shared play-count store
//! - `search`: Catalog search filter
//! - `content`: Track list state handed to the view
//! - `app_model`: Main application model with state management

mod track;
mod types;
mod playback;
mod counter;
mod search;
mod content;
mod app_model;

pub use track::{Track, TrackId};

pub use types::UiState;

pub use playback::{PlaybackInfo, PlaybackSession, PlaybackState};

pub use counter::ClickCounter;

pub use search::filter_tracks;

pub use content::ContentState;

pub use app_model::AppModel;
