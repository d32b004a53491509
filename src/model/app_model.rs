//! Main application model with state management

use std::time::{Duration, Instant};

use super::content::ContentState;
use super::search::filter_tracks;
use super::track::Track;
use super::types::UiState;

/// Catalog and UI state shared between the event loop and background tasks
pub struct AppModel {
    catalog: Vec<Track>,
    catalog_loading: bool,
    ui_state: UiState,
    should_quit: bool,
}

impl AppModel {
    pub fn new(display_name: String) -> Self {
        Self {
            catalog: Vec::new(),
            catalog_loading: true,
            ui_state: UiState::new(display_name),
            should_quit: false,
        }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub fn set_catalog(&mut self, tracks: Vec<Track>) {
        self.catalog = tracks;
        self.catalog_loading = false;
        self.clamp_selection();
    }

    pub fn visible_tracks(&self) -> Vec<&Track> {
        filter_tracks(&self.catalog, &self.ui_state.search_query)
    }

    pub fn selected_track(&self) -> Option<Track> {
        self.visible_tracks()
            .get(self.ui_state.selected)
            .map(|track| (*track).clone())
    }

    pub fn get_content_state(&self) -> ContentState {
        ContentState {
            tracks: self.visible_tracks().into_iter().cloned().collect(),
            is_loading: self.catalog_loading,
        }
    }

    // ========================================================================
    // Search & Selection
    // ========================================================================

    pub fn append_to_search(&mut self, c: char) {
        self.ui_state.search_query.push(c);
        self.ui_state.selected = 0;
    }

    pub fn backspace_search(&mut self) {
        self.ui_state.search_query.pop();
        self.ui_state.selected = 0;
    }

    pub fn clear_search(&mut self) {
        self.ui_state.search_query.clear();
        self.ui_state.selected = 0;
    }

    pub fn move_selection_up(&mut self) {
        self.ui_state.selected = self.ui_state.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let visible = self.visible_tracks().len();
        if self.ui_state.selected + 1 < visible {
            self.ui_state.selected += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible_tracks().len();
        self.ui_state.selected = self.ui_state.selected.min(visible.saturating_sub(1));
    }

    // ========================================================================
    // Errors & Lifecycle
    // ========================================================================

    pub fn get_ui_state(&self) -> UiState {
        self.ui_state.clone()
    }

    pub fn set_error(&mut self, message: String) {
        self.ui_state.error_message = Some(message);
        self.ui_state.error_timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.ui_state.error_message = None;
        self.ui_state.error_timestamp = None;
    }

    pub fn auto_clear_old_errors(&mut self, ttl: Duration) {
        if let Some(timestamp) = self.ui_state.error_timestamp {
            if timestamp.elapsed() > ttl {
                self.clear_error();
            }
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_should_quit(&mut self, quit: bool) {
        self.should_quit = quit;
    }
}
