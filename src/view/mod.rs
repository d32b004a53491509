//! View module - UI rendering
//!
//! - `utils`: Shared formatting helpers
//! - `layout`: Greeting header and search bar
//! - `content`: Track cards
//! - `overlays`: Play count badge and error notice

mod utils;
mod layout;
mod content;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, content_state: &ContentState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Greeting + key hints
                Constraint::Length(3), // Search bar
                Constraint::Min(0),    // Track cards
            ])
            .split(frame.area());

        layout::render_header(frame, chunks[0], ui_state);
        layout::render_search_bar(frame, chunks[1], ui_state);
        content::render_track_list(frame, chunks[2], ui_state, content_state, playback);

        overlays::render_play_count_badge(frame, playback.play_count);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }
    }
}
