//! rodio-backed audio engine.
//!
//! rodio's output stream has to stay on the thread that opened it, so one audio
//! thread owns the stream and every sink. Previews are downloaded on the async
//! side and handed to the thread already in memory.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use tokio::sync::oneshot;

use super::{AudioEngine, CompletionNotifier, ResourceHandle};
use crate::error::LoadError;

enum AudioCmd {
    Open {
        handle: ResourceHandle,
        bytes: Vec<u8>,
        autoplay: bool,
        notifier: CompletionNotifier,
        reply: oneshot::Sender<Result<(), LoadError>>,
    },
    Play(ResourceHandle),
    Pause(ResourceHandle),
    Unload(ResourceHandle),
    Quit,
}

struct OpenSink {
    sink: Sink,
    notifier: CompletionNotifier,
    finished: bool,
}

pub struct AudioBackend {
    tx: Sender<AudioCmd>,
    http: reqwest::Client,
    next_handle: AtomicU64,
    join: Option<JoinHandle<()>>,
}

impl AudioBackend {
    /// Spawn the audio thread and wait until the default output device is open.
    pub fn new(completion_poll: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        let join = thread::Builder::new()
            .name("audio".to_string())
            .spawn(move || run_audio_thread(rx, ready_tx, completion_poll))
            .context("failed to spawn audio thread")?;

        ready_rx
            .recv()
            .context("audio thread exited during startup")?
            .map_err(|e| anyhow::anyhow!("no audio output device: {e}"))?;

        tracing::info!("Audio backend initialized");

        Ok(Self {
            tx,
            http: reqwest::Client::new(),
            next_handle: AtomicU64::new(1),
            join: Some(join),
        })
    }

    /// Backend with no output device. Every load fails with
    /// [`LoadError::EngineStopped`] so the catalog stays browsable.
    pub fn unavailable() -> Self {
        let (tx, _rx) = mpsc::channel::<AudioCmd>();
        Self {
            tx,
            http: reqwest::Client::new(),
            next_handle: AtomicU64::new(1),
            join: None,
        }
    }

    fn is_running(&self) -> bool {
        self.join.is_some()
    }

    async fn fetch_preview(&self, uri: &str) -> Result<Vec<u8>, LoadError> {
        if uri.trim().is_empty() {
            return Err(LoadError::MissingPreview);
        }

        let response = self
            .http
            .get(uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoadError::Fetch(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::Fetch(e.to_string()))?;

        tracing::debug!(uri, bytes = bytes.len(), "Preview downloaded");
        Ok(bytes.to_vec())
    }

    fn send(&self, cmd: AudioCmd) {
        if self.is_running() && self.tx.send(cmd).is_err() {
            tracing::warn!("Audio thread is gone, command dropped");
        }
    }
}

#[async_trait]
impl AudioEngine for AudioBackend {
    async fn load(
        &self,
        uri: &str,
        autoplay: bool,
        on_finish: CompletionNotifier,
    ) -> Result<ResourceHandle, LoadError> {
        if !self.is_running() {
            return Err(LoadError::EngineStopped);
        }
        let bytes = self.fetch_preview(uri).await?;
        let handle = ResourceHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let (reply, opened) = oneshot::channel();
        self.tx
            .send(AudioCmd::Open {
                handle,
                bytes,
                autoplay,
                notifier: on_finish,
                reply,
            })
            .map_err(|_| LoadError::EngineStopped)?;

        match opened.await {
            Ok(Ok(())) => Ok(handle),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LoadError::EngineStopped),
        }
    }

    async fn play(&self, handle: ResourceHandle) {
        self.send(AudioCmd::Play(handle));
    }

    async fn pause(&self, handle: ResourceHandle) {
        self.send(AudioCmd::Pause(handle));
    }

    async fn unload(&self, handle: ResourceHandle) {
        self.send(AudioCmd::Unload(handle));
    }
}

impl Drop for AudioBackend {
    fn drop(&mut self) {
        let _ = self.tx.send(AudioCmd::Quit);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn run_audio_thread(
    rx: Receiver<AudioCmd>,
    ready: Sender<Result<(), String>>,
    completion_poll: Duration,
) {
    let mut stream = match OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    // rodio logs to stderr when the stream is dropped, which garbles the TUI.
    stream.log_on_drop(false);
    let _ = ready.send(Ok(()));

    let mut sinks: HashMap<ResourceHandle, OpenSink> = HashMap::new();

    loop {
        match rx.recv_timeout(completion_poll) {
            Ok(AudioCmd::Open {
                handle,
                bytes,
                autoplay,
                notifier,
                reply,
            }) => {
                let opened = Decoder::new(Cursor::new(bytes))
                    .map(|source| {
                        let sink = Sink::connect_new(stream.mixer());
                        sink.append(source);
                        if autoplay {
                            sink.play();
                        } else {
                            sink.pause();
                        }
                        sinks.insert(
                            handle,
                            OpenSink {
                                sink,
                                notifier,
                                finished: false,
                            },
                        );
                    })
                    .map_err(|e| LoadError::Decode(e.to_string()));
                let _ = reply.send(opened);
            }
            Ok(AudioCmd::Play(handle)) => {
                if let Some(open) = sinks.get(&handle) {
                    open.sink.play();
                }
            }
            Ok(AudioCmd::Pause(handle)) => {
                if let Some(open) = sinks.get(&handle) {
                    open.sink.pause();
                }
            }
            Ok(AudioCmd::Unload(handle)) => {
                if let Some(open) = sinks.remove(&handle) {
                    open.sink.stop();
                }
            }
            Ok(AudioCmd::Quit) => {
                for (_, open) in sinks.drain() {
                    open.sink.stop();
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        notify_finished_sinks(&mut sinks);
    }
}

/// Signal each sink that drained while unpaused, once.
fn notify_finished_sinks(sinks: &mut HashMap<ResourceHandle, OpenSink>) {
    for (handle, open) in sinks.iter_mut() {
        if !open.finished && !open.sink.is_paused() && open.sink.empty() {
            open.finished = true;
            open.notifier.notify_finished(*handle);
        }
    }
}
