//! Track list state handed to the view

use super::track::Track;

#[derive(Clone, Debug, Default)]
pub struct ContentState {
    /// Tracks left after applying the search query, in catalog order.
    pub tracks: Vec<Track>,
    /// True until the first catalog fetch settles.
    pub is_loading: bool,
}
