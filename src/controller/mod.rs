//! Controller module - Application logic and event handling
//!
//! - `playback`: The single-resource playback controller
//! - `player_events`: Applying audio engine events to the playback session
//! - `input`: Key event handling

mod input;
mod playback;
mod player_events;

pub use player_events::EventOutcome;
pub use playback::{PlayOutcome, PlaybackController};

use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::audio::AudioEngine;
use crate::catalog::{self, CatalogProvider};
use crate::error::PlaybackError;
use crate::model::{AppModel, ClickCounter, PlaybackInfo};

pub struct AppController<E: AudioEngine> {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) playback: PlaybackController<E>,
    counter: ClickCounter,
    play_count: watch::Receiver<u64>,
}

impl<E: AudioEngine> AppController<E> {
    pub fn new(model: Arc<Mutex<AppModel>>, engine: Arc<E>, counter: ClickCounter) -> Self {
        Self {
            model,
            playback: PlaybackController::new(engine, counter.clone()),
            play_count: counter.subscribe(),
            counter,
        }
    }

    /// Fetch the catalog in the background; the list shows a loading state until then.
    pub fn spawn_catalog_fetch(&self, provider: Arc<dyn CatalogProvider>) {
        let model = self.model.clone();
        tokio::spawn(async move {
            let tracks = catalog::load_catalog(provider.as_ref()).await;
            model.lock().await.set_catalog(tracks);
        });
    }

    pub fn playback_info(&self) -> PlaybackInfo {
        PlaybackInfo {
            state: self.playback.session().state(),
            play_count: *self.play_count.borrow(),
        }
    }

    /// Play or toggle the selected track card.
    pub async fn play_selected(&mut self) {
        let selected = self.model.lock().await.selected_track();
        let Some(track) = selected else {
            tracing::debug!("No track selected");
            return;
        };

        let outcome = self.playback.play(&track).await;
        tracing::debug!(track_id = track.id, ?outcome, "Play requested");
    }

    /// Apply every engine event that is already queued.
    pub async fn pump_engine_events(&mut self) {
        while let Some(event) = self.playback.try_next_event() {
            if let Err(e) = self.playback.handle_event(event).await {
                tracing::error!(error = %e, "Playback error");
                let message = Self::format_error(&e);
                self.model.lock().await.set_error(message);
            }
        }
    }

    /// End the browsing session: stop playback and reset the play count.
    pub async fn logout(&mut self) {
        tracing::info!("Logging out");
        self.playback.teardown().await;
        self.counter.reset();
        self.model.lock().await.set_should_quit(true);
    }

    /// Entry point for the account flow when a new account is registered; play
    /// counts start over. Registration forms live outside the TUI, so nothing in
    /// the key bindings calls this.
    #[allow(dead_code)]
    pub fn complete_registration(&self) {
        tracing::info!("Registration completed, resetting play count");
        self.counter.reset();
    }

    pub async fn shutdown(&mut self) {
        self.playback.teardown().await;
    }

    pub(crate) fn format_error(error: &PlaybackError) -> String {
        match error {
            PlaybackError::Load { title, source, .. } => {
                format!("Couldn't play \"{title}\": {source}")
            }
        }
    }
}

#[cfg(test)]
mod tests;
