//! Playback session state
//!
//! [`PlaybackSession`] is the single record of which track is loaded and whether
//! it is playing. Only the playback controller mutates it.

use crate::audio::{LoadTicket, ResourceHandle};

use super::track::TrackId;

/// Observable playback state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading(TrackId),
    Playing(TrackId),
    Paused(TrackId),
}

impl PlaybackState {
    pub fn track_id(self) -> Option<TrackId> {
        match self {
            Self::Idle => None,
            Self::Loading(id) | Self::Playing(id) | Self::Paused(id) => Some(id),
        }
    }

    pub fn is_playing(self, track_id: TrackId) -> bool {
        self == Self::Playing(track_id)
    }
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Idle,
    Loading {
        track_id: TrackId,
        title: String,
        ticket: LoadTicket,
    },
    Loaded {
        track_id: TrackId,
        handle: ResourceHandle,
        playing: bool,
    },
}

/// The controller's record of the active track.
///
/// A resource handle exists only in the loaded slot, so there is never more than
/// one and it never outlives the track it belongs to.
#[derive(Debug, Default)]
pub struct PlaybackSession {
    slot: Slot,
}

impl PlaybackSession {
    pub fn state(&self) -> PlaybackState {
        match &self.slot {
            Slot::Idle => PlaybackState::Idle,
            Slot::Loading { track_id, .. } => PlaybackState::Loading(*track_id),
            Slot::Loaded {
                track_id,
                playing: true,
                ..
            } => PlaybackState::Playing(*track_id),
            Slot::Loaded {
                track_id,
                playing: false,
                ..
            } => PlaybackState::Paused(*track_id),
        }
    }

    pub fn active_track_id(&self) -> Option<TrackId> {
        self.state().track_id()
    }

    pub fn resource_handle(&self) -> Option<ResourceHandle> {
        match self.slot {
            Slot::Loaded { handle, .. } => Some(handle),
            _ => None,
        }
    }

    pub(crate) fn pending_ticket(&self) -> Option<LoadTicket> {
        match self.slot {
            Slot::Loading { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// Enter the loading slot. The caller must have released any loaded handle.
    pub(crate) fn begin_loading(&mut self, track_id: TrackId, title: String, ticket: LoadTicket) {
        debug_assert!(self.resource_handle().is_none());
        self.slot = Slot::Loading {
            track_id,
            title,
            ticket,
        };
    }

    /// Accept `handle` as the result of `ticket`. Returns `None` when the ticket
    /// is not the pending one; the caller then owns the handle.
    pub(crate) fn complete_loading(
        &mut self,
        ticket: LoadTicket,
        handle: ResourceHandle,
    ) -> Option<TrackId> {
        match self.slot {
            Slot::Loading {
                track_id,
                ticket: pending,
                ..
            } if pending == ticket => {
                self.slot = Slot::Loaded {
                    track_id,
                    handle,
                    playing: true,
                };
                Some(track_id)
            }
            _ => None,
        }
    }

    /// Drop back to idle if `ticket` is the pending load.
    pub(crate) fn fail_loading(&mut self, ticket: LoadTicket) -> Option<(TrackId, String)> {
        match std::mem::take(&mut self.slot) {
            Slot::Loading {
                track_id,
                title,
                ticket: pending,
            } if pending == ticket => Some((track_id, title)),
            other => {
                self.slot = other;
                None
            }
        }
    }

    pub(crate) fn set_playing(&mut self, is_playing: bool) {
        if let Slot::Loaded { playing, .. } = &mut self.slot {
            *playing = is_playing;
        }
    }

    /// Reset to idle, handing back the handle that now needs unloading.
    pub(crate) fn clear(&mut self) -> Option<ResourceHandle> {
        let handle = self.resource_handle();
        self.slot = Slot::Idle;
        handle
    }
}

/// Playback snapshot for rendering
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaybackInfo {
    pub state: PlaybackState,
    pub play_count: u64,
}
