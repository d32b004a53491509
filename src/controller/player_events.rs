//! Engine event handling for the playback controller

use crate::audio::{AudioEngine, EngineEvent, LoadTicket, ResourceHandle};
use crate::error::{LoadError, PlaybackError};
use crate::model::TrackId;

use super::playback::PlaybackController;

/// What applying an engine event did to the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// The pending load landed and the track is now playing.
    Started(TrackId),
    /// The active track played to its end.
    Finished(TrackId),
    /// A completion arrived while a load was pending; it is applied once the
    /// matching load result lands.
    Deferred,
    /// The event belonged to a resource or load that is no longer current.
    Discarded,
}

impl<E: AudioEngine> PlaybackController<E> {
    /// Wait for the next engine event.
    #[cfg(test)]
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.events_rx.recv().await
    }

    /// Take an engine event if one is already queued.
    pub fn try_next_event(&mut self) -> Option<EngineEvent> {
        self.events_rx.try_recv().ok()
    }

    pub async fn handle_event(&mut self, event: EngineEvent) -> Result<EventOutcome, PlaybackError> {
        match event {
            EngineEvent::Loaded { ticket, result } => self.on_loaded(ticket, result).await,
            EngineEvent::Finished { handle } => Ok(self.on_finished(handle).await),
        }
    }

    async fn on_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<ResourceHandle, LoadError>,
    ) -> Result<EventOutcome, PlaybackError> {
        match result {
            Ok(handle) => match self.session.complete_loading(ticket, handle) {
                Some(track_id) => {
                    self.counter.increment();
                    tracing::info!(
                        track_id,
                        %handle,
                        play_count = self.counter.current(),
                        "Playback started"
                    );

                    // Only the pending load's completion matters; older entries
                    // belong to resources that are already unloaded.
                    let finished_early = self.early_finishes.remove(&handle);
                    self.early_finishes.clear();
                    if finished_early {
                        tracing::debug!(track_id, %handle, "Completion arrived before load result");
                        return Ok(self.finish_current(handle).await);
                    }
                    Ok(EventOutcome::Started(track_id))
                }
                None => {
                    tracing::debug!(ticket = ticket.0, %handle, "Unloading resource from superseded load");
                    self.engine.unload(handle).await;
                    Ok(EventOutcome::Discarded)
                }
            },
            Err(source) => match self.session.fail_loading(ticket) {
                Some((track_id, title)) => {
                    tracing::warn!(track_id, error = %source, "Preview load failed");
                    Err(PlaybackError::Load {
                        track_id,
                        title,
                        source,
                    })
                }
                None => {
                    tracing::debug!(ticket = ticket.0, error = %source, "Superseded load failed");
                    Ok(EventOutcome::Discarded)
                }
            },
        }
    }

    async fn on_finished(&mut self, handle: ResourceHandle) -> EventOutcome {
        if self.session.resource_handle() == Some(handle) {
            return self.finish_current(handle).await;
        }

        if self.session.pending_ticket().is_some() {
            tracing::debug!(%handle, "Holding completion until its load result arrives");
            self.early_finishes.insert(handle);
            return EventOutcome::Deferred;
        }

        tracing::debug!(%handle, "Ignoring stale completion");
        EventOutcome::Discarded
    }

    async fn finish_current(&mut self, handle: ResourceHandle) -> EventOutcome {
        let track_id = self.session.active_track_id();
        self.session.clear();
        self.engine.unload(handle).await;
        tracing::info!(?track_id, %handle, "Track finished");

        match track_id {
            Some(track_id) => EventOutcome::Finished(track_id),
            None => EventOutcome::Discarded,
        }
    }
}
