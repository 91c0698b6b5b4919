//! In-memory player fakes for tests.
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream crates.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;
use ytclip_models::VideoRef;

use crate::backend::{PlayerBackend, PlayerInstance, PlayerLoader};
use crate::error::{PlayerError, PlayerResult};
use crate::options::EmbedOptions;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Commands received by a [`FakePlayer`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    SeekTo(f64),
    Play,
    Pause,
    Destroy,
}

/// Player whose position is set by the test. Seeking moves the position.
#[derive(Debug)]
pub struct FakePlayer {
    pub container_id: String,
    pub video: VideoRef,
    pub options: EmbedOptions,
    position: Mutex<Option<f64>>,
    calls: Mutex<Vec<PlayerCall>>,
    polls: AtomicUsize,
    ready: watch::Sender<bool>,
}

impl FakePlayer {
    fn new(container_id: &str, video: &VideoRef, options: &EmbedOptions, ready: bool) -> Self {
        let (ready_tx, _) = watch::channel(ready);
        Self {
            container_id: container_id.to_string(),
            video: video.clone(),
            options: options.clone(),
            position: Mutex::new(Some(options.start_offset as f64)),
            calls: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
            ready: ready_tx,
        }
    }

    /// Fire the readiness callback.
    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn set_position(&self, position: Option<f64>) {
        *lock(&self.position) = position;
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        lock(&self.calls).clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                PlayerCall::SeekTo(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn pause_count(&self) -> usize {
        lock(&self.calls).iter().filter(|c| **c == PlayerCall::Pause).count()
    }

    pub fn destroy_count(&self) -> usize {
        lock(&self.calls).iter().filter(|c| **c == PlayerCall::Destroy).count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroy_count() > 0
    }

    /// Number of position queries answered.
    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayerInstance for FakePlayer {
    async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }

    fn seek_to(&self, seconds: f64) {
        lock(&self.calls).push(PlayerCall::SeekTo(seconds));
        *lock(&self.position) = Some(seconds);
    }

    fn play(&self) {
        lock(&self.calls).push(PlayerCall::Play);
    }

    fn pause(&self) {
        lock(&self.calls).push(PlayerCall::Pause);
    }

    async fn current_time(&self) -> Option<f64> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.position)
    }

    fn destroy(&self) {
        lock(&self.calls).push(PlayerCall::Destroy);
    }
}

/// Backend recording every player it creates.
#[derive(Debug, Default)]
pub struct FakeBackend {
    hold_ready: bool,
    fail_next: AtomicBool,
    players: Mutex<Vec<Arc<FakePlayer>>>,
}

impl FakeBackend {
    /// Players become ready immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Players wait for [`FakePlayer::mark_ready`].
    pub fn held() -> Self {
        Self {
            hold_ready: true,
            ..Self::default()
        }
    }

    /// Make the next `create` call fail.
    pub fn fail_next_create(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn players(&self) -> Vec<Arc<FakePlayer>> {
        lock(&self.players).clone()
    }

    pub fn last(&self) -> Option<Arc<FakePlayer>> {
        lock(&self.players).last().cloned()
    }

    pub fn created_count(&self) -> usize {
        lock(&self.players).len()
    }

    /// Players not yet destroyed.
    pub fn live_players(&self) -> Vec<Arc<FakePlayer>> {
        lock(&self.players)
            .iter()
            .filter(|p| !p.is_destroyed())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PlayerBackend for FakeBackend {
    async fn create(
        &self,
        container_id: &str,
        video: &VideoRef,
        options: &EmbedOptions,
    ) -> PlayerResult<Arc<dyn PlayerInstance>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PlayerError::create_failed(container_id, "fake create failure"));
        }

        let player = Arc::new(FakePlayer::new(container_id, video, options, !self.hold_ready));
        lock(&self.players).push(Arc::clone(&player));
        Ok(player)
    }
}

/// Loader that can be held open and counts invocations.
#[derive(Debug)]
pub struct FakeLoader {
    backend: Arc<FakeBackend>,
    loads: AtomicUsize,
    fail_next: AtomicBool,
    released: watch::Sender<bool>,
}

impl FakeLoader {
    fn build(backend: Arc<FakeBackend>, released: bool, fail_next: bool) -> Self {
        let (released_tx, _) = watch::channel(released);
        Self {
            backend,
            loads: AtomicUsize::new(0),
            fail_next: AtomicBool::new(fail_next),
            released: released_tx,
        }
    }

    /// Loads complete immediately.
    pub fn new(backend: Arc<FakeBackend>) -> Self {
        Self::build(backend, true, false)
    }

    /// Loads wait for [`FakeLoader::release`].
    pub fn held(backend: Arc<FakeBackend>) -> Self {
        Self::build(backend, false, false)
    }

    /// The first load fails, later ones succeed.
    pub fn failing_once(backend: Arc<FakeBackend>) -> Self {
        Self::build(backend, true, true)
    }

    pub fn release(&self) {
        self.released.send_replace(true);
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayerLoader for FakeLoader {
    async fn load(&self) -> PlayerResult<Arc<dyn PlayerBackend>> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        let mut rx = self.released.subscribe();
        let _ = rx.wait_for(|released| *released).await;

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PlayerError::api_unavailable("fake load failure"));
        }

        let backend: Arc<dyn PlayerBackend> = self.backend.clone();
        Ok(backend)
    }
}
