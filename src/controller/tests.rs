use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::*;
use crate::audio::{CompletionNotifier, EngineEvent, ResourceHandle};
use crate::error::LoadError;
use crate::model::{PlaybackState, Track};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Load(String),
    Play(ResourceHandle),
    Pause(ResourceHandle),
    Unload(ResourceHandle),
}

/// Engine that opens resources instantly and records every call.
#[derive(Default)]
struct FakeEngine {
    calls: StdMutex<Vec<Call>>,
    next_handle: AtomicU64,
    failing_uris: HashSet<String>,
    /// Resources that are already drained when opened.
    empty_uris: HashSet<String>,
    notifiers: StdMutex<HashMap<ResourceHandle, CompletionNotifier>>,
}

impl FakeEngine {
    fn failing_for(track: &Track) -> Self {
        Self {
            failing_uris: HashSet::from([track.preview_url.clone()]),
            ..Self::default()
        }
    }

    fn empty_for(track: &Track) -> Self {
        Self {
            empty_uris: HashSet::from([track.preview_url.clone()]),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn loads_of(&self, track: &Track) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == Call::Load(track.preview_url.clone()))
            .count()
    }

    fn unloads(&self) -> Vec<ResourceHandle> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Unload(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    /// Deliver the completion notification the way the audio thread would.
    fn finish(&self, handle: ResourceHandle) {
        let notifier = self.notifiers.lock().unwrap().get(&handle).cloned();
        notifier.expect("handle was never loaded").notify_finished(handle);
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn load(
        &self,
        uri: &str,
        _autoplay: bool,
        on_finish: CompletionNotifier,
    ) -> Result<ResourceHandle, LoadError> {
        self.calls.lock().unwrap().push(Call::Load(uri.to_string()));
        if self.failing_uris.contains(uri) {
            return Err(LoadError::Fetch("HTTP 404".to_string()));
        }
        let handle = ResourceHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        if self.empty_uris.contains(uri) {
            // Completion goes out before the load result reaches the controller.
            on_finish.notify_finished(handle);
        }
        self.notifiers.lock().unwrap().insert(handle, on_finish);
        Ok(handle)
    }

    async fn play(&self, handle: ResourceHandle) {
        self.calls.lock().unwrap().push(Call::Play(handle));
    }

    async fn pause(&self, handle: ResourceHandle) {
        self.calls.lock().unwrap().push(Call::Pause(handle));
    }

    async fn unload(&self, handle: ResourceHandle) {
        self.calls.lock().unwrap().push(Call::Unload(handle));
    }
}

fn sky() -> Track {
    Track::sample(1, "Sky", "A")
}

fn rain() -> Track {
    Track::sample(2, "Rain", "B")
}

fn controller(engine: &Arc<FakeEngine>) -> (PlaybackController<FakeEngine>, ClickCounter) {
    let counter = ClickCounter::new();
    (PlaybackController::new(engine.clone(), counter.clone()), counter)
}

async fn settle(
    playback: &mut PlaybackController<FakeEngine>,
) -> Result<EventOutcome, PlaybackError> {
    let event = playback.next_event().await.expect("event channel closed");
    playback.handle_event(event).await
}

#[tokio::test]
async fn first_play_loads_and_counts_once() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    assert_eq!(playback.play(&sky()).await, PlayOutcome::Loading);
    assert_eq!(playback.state(), PlaybackState::Loading(1));
    assert_eq!(counter.current(), 0);

    assert_eq!(settle(&mut playback).await.unwrap(), EventOutcome::Started(1));
    assert_eq!(playback.state(), PlaybackState::Playing(1));
    assert!(playback.session().resource_handle().is_some());
    assert_eq!(counter.current(), 1);
}

#[tokio::test]
async fn switching_tracks_unloads_once_and_counts_each_start() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    settle(&mut playback).await.unwrap();
    let sky_handle = playback.session().resource_handle().unwrap();

    playback.play(&rain()).await;
    settle(&mut playback).await.unwrap();

    assert_eq!(engine.unloads(), vec![sky_handle]);
    assert_eq!(engine.loads_of(&sky()), 1);
    assert_eq!(engine.loads_of(&rain()), 1);
    assert_eq!(counter.current(), 2);
    assert_eq!(playback.state(), PlaybackState::Playing(2));
}

#[tokio::test]
async fn unload_happens_before_the_next_load() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, _counter) = controller(&engine);

    playback.play(&sky()).await;
    settle(&mut playback).await.unwrap();
    let sky_handle = playback.session().resource_handle().unwrap();

    playback.play(&rain()).await;
    settle(&mut playback).await.unwrap();

    let calls = engine.calls();
    let unload_at = calls.iter().position(|c| *c == Call::Unload(sky_handle)).unwrap();
    let load_at = calls
        .iter()
        .position(|c| *c == Call::Load(rain().preview_url))
        .unwrap();
    assert!(unload_at < load_at);
}

#[tokio::test]
async fn reselecting_the_active_track_toggles_without_reloading() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    settle(&mut playback).await.unwrap();
    let handle = playback.session().resource_handle().unwrap();

    assert_eq!(playback.play(&sky()).await, PlayOutcome::Paused);
    assert_eq!(playback.state(), PlaybackState::Paused(1));
    assert_eq!(playback.play(&sky()).await, PlayOutcome::Resumed);
    assert_eq!(playback.state(), PlaybackState::Playing(1));

    assert_eq!(engine.loads_of(&sky()), 1);
    assert_eq!(counter.current(), 1);
    assert!(engine.calls().contains(&Call::Pause(handle)));
    assert!(engine.calls().contains(&Call::Play(handle)));
}

#[tokio::test]
async fn pause_and_resume_are_noops_when_idle() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, _counter) = controller(&engine);

    assert!(!playback.pause().await);
    assert!(!playback.resume().await);
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn mismatched_completion_leaves_session_unchanged() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    settle(&mut playback).await.unwrap();
    let handle = playback.session().resource_handle();

    let outcome = playback
        .handle_event(EngineEvent::Finished {
            handle: ResourceHandle::new(999),
        })
        .await
        .unwrap();

    assert_eq!(outcome, EventOutcome::Discarded);
    assert_eq!(playback.state(), PlaybackState::Playing(1));
    assert_eq!(playback.session().resource_handle(), handle);
    assert!(engine.unloads().is_empty());
    assert_eq!(counter.current(), 1);
}

#[tokio::test]
async fn completion_from_a_replaced_track_is_ignored() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    settle(&mut playback).await.unwrap();
    let sky_handle = playback.session().resource_handle().unwrap();

    playback.play(&rain()).await;
    settle(&mut playback).await.unwrap();

    engine.finish(sky_handle);
    assert_eq!(settle(&mut playback).await.unwrap(), EventOutcome::Discarded);

    assert_eq!(playback.state(), PlaybackState::Playing(2));
    assert_eq!(engine.unloads(), vec![sky_handle]);
    assert_eq!(counter.current(), 2);
}

#[tokio::test]
async fn duplicate_completion_is_applied_once() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    settle(&mut playback).await.unwrap();
    let handle = playback.session().resource_handle().unwrap();

    engine.finish(handle);
    engine.finish(handle);
    assert_eq!(settle(&mut playback).await.unwrap(), EventOutcome::Finished(1));
    assert_eq!(settle(&mut playback).await.unwrap(), EventOutcome::Discarded);

    assert_eq!(playback.state(), PlaybackState::Idle);
    assert_eq!(engine.unloads(), vec![handle]);
    assert_eq!(counter.current(), 1);
}

#[tokio::test]
async fn completion_before_the_load_result_still_finishes_the_track() {
    let engine = Arc::new(FakeEngine::empty_for(&sky()));
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    assert_eq!(settle(&mut playback).await.unwrap(), EventOutcome::Deferred);
    assert_eq!(playback.state(), PlaybackState::Loading(1));

    assert_eq!(settle(&mut playback).await.unwrap(), EventOutcome::Finished(1));
    assert_eq!(playback.state(), PlaybackState::Idle);
    assert!(playback.session().resource_handle().is_none());
    assert_eq!(engine.unloads().len(), 1);
    assert_eq!(counter.current(), 1);
    assert!(playback.early_finishes.is_empty());
}

#[tokio::test]
async fn early_completion_of_a_superseded_load_does_not_touch_the_new_track() {
    let engine = Arc::new(FakeEngine::empty_for(&sky()));
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    playback.play(&rain()).await;

    for _ in 0..3 {
        settle(&mut playback).await.unwrap();
    }

    assert_eq!(playback.state(), PlaybackState::Playing(2));
    let rain_handle = playback.session().resource_handle().unwrap();
    let unloads = engine.unloads();
    assert_eq!(unloads.len(), 1);
    assert_ne!(unloads[0], rain_handle);
    assert_eq!(counter.current(), 1);
    assert!(playback.early_finishes.is_empty());
}

#[tokio::test]
async fn load_failure_returns_to_idle_without_counting() {
    let engine = Arc::new(FakeEngine::failing_for(&sky()));
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    let err = settle(&mut playback).await.unwrap_err();

    match err {
        PlaybackError::Load {
            track_id, source, ..
        } => {
            assert_eq!(track_id, 1);
            assert_eq!(source, LoadError::Fetch("HTTP 404".to_string()));
        }
    }
    assert_eq!(playback.state(), PlaybackState::Idle);
    assert_eq!(counter.current(), 0);
    assert!(engine.unloads().is_empty());

    // no automatic retry; a new request issues a new load
    assert_eq!(engine.loads_of(&sky()), 1);
    playback.play(&sky()).await;
    assert!(settle(&mut playback).await.is_err());
    assert_eq!(engine.loads_of(&sky()), 2);
}

#[tokio::test]
async fn reselecting_a_loading_track_does_not_load_twice() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    assert_eq!(playback.play(&sky()).await, PlayOutcome::AlreadyLoading);

    settle(&mut playback).await.unwrap();
    assert_eq!(engine.loads_of(&sky()), 1);
    assert_eq!(counter.current(), 1);
}

#[tokio::test]
async fn switching_during_a_load_discards_the_superseded_resource() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    playback.play(&rain()).await;
    assert_eq!(playback.state(), PlaybackState::Loading(2));

    let mut outcomes = vec![
        settle(&mut playback).await.unwrap(),
        settle(&mut playback).await.unwrap(),
    ];
    outcomes.sort_by_key(|o| matches!(o, EventOutcome::Started(_)));
    assert_eq!(outcomes, vec![EventOutcome::Discarded, EventOutcome::Started(2)]);

    let rain_handle = playback.session().resource_handle().unwrap();
    let unloads = engine.unloads();
    assert_eq!(unloads.len(), 1);
    assert_ne!(unloads[0], rain_handle);

    assert_eq!(playback.state(), PlaybackState::Playing(2));
    assert_eq!(counter.current(), 1);
}

#[tokio::test]
async fn teardown_releases_the_active_resource() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, _counter) = controller(&engine);

    playback.teardown().await;
    assert!(engine.calls().is_empty());

    playback.play(&sky()).await;
    settle(&mut playback).await.unwrap();
    playback.play(&sky()).await; // paused
    let handle = playback.session().resource_handle().unwrap();

    playback.teardown().await;
    assert_eq!(playback.state(), PlaybackState::Idle);
    assert_eq!(engine.unloads(), vec![handle]);
}

#[tokio::test]
async fn teardown_during_a_load_unloads_the_late_result() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    playback.teardown().await;
    assert_eq!(playback.state(), PlaybackState::Idle);

    assert_eq!(settle(&mut playback).await.unwrap(), EventOutcome::Discarded);
    assert_eq!(engine.unloads().len(), 1);
    assert_eq!(playback.state(), PlaybackState::Idle);
    assert_eq!(counter.current(), 0);
}

#[tokio::test]
async fn sky_then_rain_walkthrough() {
    let engine = Arc::new(FakeEngine::default());
    let (mut playback, counter) = controller(&engine);

    playback.play(&sky()).await;
    settle(&mut playback).await.unwrap();
    assert_eq!(playback.state(), PlaybackState::Playing(1));
    assert_eq!(counter.current(), 1);
    let sky_handle = playback.session().resource_handle().unwrap();

    playback.play(&sky()).await;
    assert_eq!(playback.state(), PlaybackState::Paused(1));
    assert_eq!(counter.current(), 1);

    playback.play(&rain()).await;
    settle(&mut playback).await.unwrap();
    assert_eq!(engine.unloads(), vec![sky_handle]);
    assert_eq!(playback.state(), PlaybackState::Playing(2));
    assert_eq!(counter.current(), 2);
    let rain_handle = playback.session().resource_handle().unwrap();

    engine.finish(rain_handle);
    assert_eq!(settle(&mut playback).await.unwrap(), EventOutcome::Finished(2));
    assert_eq!(playback.state(), PlaybackState::Idle);
    assert_eq!(counter.current(), 2);
    assert_eq!(engine.unloads(), vec![sky_handle, rain_handle]);
}

// ============================================================================
// AppController
// ============================================================================

async fn app_with_catalog(
    engine: &Arc<FakeEngine>,
) -> (AppController<FakeEngine>, Arc<Mutex<AppModel>>, ClickCounter) {
    let model = Arc::new(Mutex::new(AppModel::new("Ada".to_string())));
    model.lock().await.set_catalog(vec![sky(), rain()]);
    let counter = ClickCounter::new();
    let app = AppController::new(model.clone(), engine.clone(), counter.clone());
    (app, model, counter)
}

/// Let the spawned load task run to completion on the test runtime.
async fn let_loads_land() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn play_selected_starts_the_highlighted_card() {
    let engine = Arc::new(FakeEngine::default());
    let (mut app, model, counter) = app_with_catalog(&engine).await;

    model.lock().await.move_selection_down();
    app.play_selected().await;
    let_loads_land().await;
    app.pump_engine_events().await;

    let info = app.playback_info();
    assert_eq!(info.state, PlaybackState::Playing(2));
    assert_eq!(info.play_count, 1);
    assert_eq!(counter.current(), 1);
}

#[tokio::test]
async fn load_failures_become_a_visible_notice() {
    let engine = Arc::new(FakeEngine::failing_for(&sky()));
    let (mut app, model, _counter) = app_with_catalog(&engine).await;

    app.play_selected().await;
    let_loads_land().await;
    app.pump_engine_events().await;

    let message = model.lock().await.get_ui_state().error_message;
    assert!(message.unwrap().contains("Sky"));
    assert_eq!(app.playback_info().state, PlaybackState::Idle);
}

#[tokio::test]
async fn logout_stops_playback_and_resets_the_count() {
    let engine = Arc::new(FakeEngine::default());
    let (mut app, model, counter) = app_with_catalog(&engine).await;

    app.play_selected().await;
    let_loads_land().await;
    app.pump_engine_events().await;
    assert_eq!(counter.current(), 1);

    app.logout().await;
    assert_eq!(counter.current(), 0);
    assert_eq!(app.playback_info().state, PlaybackState::Idle);
    assert_eq!(engine.unloads().len(), 1);
    assert!(model.lock().await.should_quit());
}

#[tokio::test]
async fn registration_resets_the_count() {
    let engine = Arc::new(FakeEngine::default());
    let (app, _model, counter) = app_with_catalog(&engine).await;

    counter.increment();
    app.complete_registration();
    assert_eq!(counter.current(), 0);
}
