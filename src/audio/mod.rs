//! Audio engine contract
//!
//! The playback controller only ever talks to an [`AudioEngine`]. Results that
//! arrive later (a finished load, a resource that played to the end) come back as
//! [`EngineEvent`] messages tagged with the request or resource they belong to.

mod backend;

pub use backend::AudioBackend;

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::LoadError;

/// Opaque identity of one loaded audio resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res#{}", self.0)
    }
}

/// Identifies one load request issued by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(pub(crate) u64);

#[derive(Debug)]
pub enum EngineEvent {
    /// A load request resolved.
    Loaded {
        ticket: LoadTicket,
        result: Result<ResourceHandle, LoadError>,
    },
    /// A resource reached the end of its stream.
    Finished { handle: ResourceHandle },
}

/// Route back to the controller for completion notifications.
#[derive(Clone, Debug)]
pub struct CompletionNotifier {
    tx: UnboundedSender<EngineEvent>,
}

impl CompletionNotifier {
    pub(crate) fn new(tx: UnboundedSender<EngineEvent>) -> Self {
        Self { tx }
    }

    pub fn notify_finished(&self, handle: ResourceHandle) {
        if self.tx.send(EngineEvent::Finished { handle }).is_err() {
            tracing::debug!(%handle, "Completion dropped, controller is gone");
        }
    }
}

/// Capability to open, drive and release audio resources.
///
/// `unload` is called exactly once for every handle a successful `load` returned.
#[async_trait]
pub trait AudioEngine: Send + Sync + 'static {
    /// Open the resource at `uri`. `on_finish` must be signalled at most once,
    /// when the resource plays through to its end.
    async fn load(
        &self,
        uri: &str,
        autoplay: bool,
        on_finish: CompletionNotifier,
    ) -> Result<ResourceHandle, LoadError>;

    async fn play(&self, handle: ResourceHandle);

    async fn pause(&self, handle: ResourceHandle);

    async fn unload(&self, handle: ResourceHandle);
}
