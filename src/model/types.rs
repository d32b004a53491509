//! UI state

use std::time::Instant;

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub display_name: String,
    pub search_query: String,
    /// Index into the filtered track list.
    pub selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
}

impl UiState {
    pub fn new(display_name: String) -> Self {
        Self {
            display_name,
            search_query: String::new(),
            selected: 0,
            error_message: None,
            error_timestamp: None,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new("User".to_string())
    }
}
