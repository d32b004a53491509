//! Single-resource playback controller
//!
//! [`PlaybackController`] owns the [`PlaybackSession`] and is the only code that
//! opens or releases audio resources. Loads run on their own task and report back
//! through the controller's event channel, so a newer `play` can supersede a load
//! that is still in flight.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::audio::{AudioEngine, CompletionNotifier, EngineEvent, LoadTicket, ResourceHandle};
use crate::model::{ClickCounter, PlaybackSession, PlaybackState, Track};

/// What a `play` request did right away
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A load was issued; the result arrives as an engine event.
    Loading,
    /// The same track is already loading.
    AlreadyLoading,
    Paused,
    Resumed,
}

pub struct PlaybackController<E: AudioEngine> {
    pub(super) engine: Arc<E>,
    pub(super) session: PlaybackSession,
    pub(super) counter: ClickCounter,
    events_tx: UnboundedSender<EngineEvent>,
    pub(super) events_rx: UnboundedReceiver<EngineEvent>,
    /// Completions that arrived while their load result was still in flight.
    pub(super) early_finishes: HashSet<ResourceHandle>,
    next_ticket: u64,
}

impl<E: AudioEngine> PlaybackController<E> {
    pub fn new(engine: Arc<E>, counter: ClickCounter) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            session: PlaybackSession::default(),
            counter,
            events_tx,
            events_rx,
            early_finishes: HashSet::new(),
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Play `track`, or toggle pause if it is the active track.
    pub async fn play(&mut self, track: &Track) -> PlayOutcome {
        match self.session.state() {
            PlaybackState::Playing(id) if id == track.id => {
                self.pause().await;
                PlayOutcome::Paused
            }
            PlaybackState::Paused(id) if id == track.id => {
                self.resume().await;
                PlayOutcome::Resumed
            }
            PlaybackState::Loading(id) if id == track.id => {
                tracing::debug!(track_id = id, "Track is already loading");
                PlayOutcome::AlreadyLoading
            }
            _ => {
                self.release_current().await;
                self.start_load(track);
                PlayOutcome::Loading
            }
        }
    }

    /// Pause the active track. Returns false when nothing is playing.
    pub async fn pause(&mut self) -> bool {
        let PlaybackState::Playing(track_id) = self.session.state() else {
            return false;
        };
        let Some(handle) = self.session.resource_handle() else {
            return false;
        };

        self.engine.pause(handle).await;
        self.session.set_playing(false);
        tracing::info!(track_id, %handle, "Playback paused");
        true
    }

    /// Resume the active track. Returns false when nothing is paused.
    pub async fn resume(&mut self) -> bool {
        let PlaybackState::Paused(track_id) = self.session.state() else {
            return false;
        };
        let Some(handle) = self.session.resource_handle() else {
            return false;
        };

        self.engine.play(handle).await;
        self.session.set_playing(true);
        tracing::info!(track_id, %handle, "Playback resumed");
        true
    }

    /// Release whatever is active, e.g. when the screen goes away or on logout.
    pub async fn teardown(&mut self) {
        let state = self.state();
        if state == PlaybackState::Idle {
            return;
        }
        tracing::info!(?state, "Tearing down playback session");
        self.release_current().await;
    }

    /// Drop to idle, unloading the open resource if there is one. A pending load
    /// is abandoned; its result is unloaded when it arrives.
    async fn release_current(&mut self) {
        if let Some(ticket) = self.session.pending_ticket() {
            tracing::debug!(ticket = ticket.0, "Superseding in-flight load");
        }
        if let Some(handle) = self.session.clear() {
            self.engine.unload(handle).await;
            tracing::debug!(%handle, "Resource unloaded");
        }
    }

    fn start_load(&mut self, track: &Track) {
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.session.begin_loading(track.id, track.title.clone(), ticket);

        tracing::info!(
            track_id = track.id,
            title = %track.title,
            ticket = ticket.0,
            "Loading preview"
        );

        let engine = Arc::clone(&self.engine);
        let events = self.events_tx.clone();
        let notifier = CompletionNotifier::new(self.events_tx.clone());
        let uri = track.preview_url.clone();

        tokio::spawn(async move {
            let result = engine.load(&uri, true, notifier).await;
            let _ = events.send(EngineEvent::Loaded { ticket, result });
        });
    }
}
