//! Playback sessions and looping clip preview.
//!
//! A session binds one video to one player instance. Free-playback sessions
//! just show the video; clip sessions seek to the clip start once the player
//! is ready and keep re-seeking to it whenever the polled position reaches
//! the clip end.
//!
//! The lifecycle is `Uninitialized -> Creating -> Ready -> Looping -> Destroyed`.
//! Sessions are never reconfigured: a different video, clip or theme means a
//! new session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;
use ytclip_models::{ClipRange, Theme, VideoRef};

use crate::api::PlayerApi;
use crate::backend::PlayerInstance;
use crate::options::EmbedOptions;

/// Default period of the clip position poll.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shortest poll period accepted; zero would spin.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Not yet started
    Uninitialized,
    /// Player requested, waiting for it to become ready
    Creating,
    /// Player ready (free playback stays here)
    Ready,
    /// Clip preview running with the position poll active
    Looping,
    /// Torn down; all operations are no-ops
    Destroyed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Creating => "creating",
            SessionState::Ready => "ready",
            SessionState::Looping => "looping",
            SessionState::Destroyed => "destroyed",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, SessionState::Creating | SessionState::Ready | SessionState::Looping)
    }
}

/// What a session plays.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSpec {
    pub video: VideoRef,
    /// Clip to loop, or `None` for free playback.
    pub clip: Option<ClipRange>,
    pub theme: Theme,
}

impl SessionSpec {
    /// Unscoped playback of the whole video.
    pub fn free(video: VideoRef, theme: Theme) -> Self {
        Self {
            video,
            clip: None,
            theme,
        }
    }

    /// Looping preview of `clip`.
    pub fn clip(video: VideoRef, clip: ClipRange, theme: Theme) -> Self {
        Self {
            video,
            clip: Some(clip),
            theme,
        }
    }

    pub fn is_clip(&self) -> bool {
        self.clip.is_some()
    }

    pub fn embed_options(&self) -> EmbedOptions {
        EmbedOptions::for_session(self.clip.as_ref(), self.theme)
    }
}

struct SessionInner {
    state: SessionState,
    instance: Option<Arc<dyn PlayerInstance>>,
    failure: Option<String>,
}

/// State shared with the driver task. The poll loop takes this lock before
/// every seek, so once `close` has marked the session destroyed no further
/// seeks can reach the instance.
struct SessionShared {
    inner: Mutex<SessionInner>,
}

impl SessionShared {
    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One binding between a video and a live player instance.
pub struct PlaybackSession {
    id: Uuid,
    container_id: String,
    spec: SessionSpec,
    poll_interval: Duration,
    created_at: DateTime<Utc>,
    shared: Arc<SessionShared>,
    driver: Option<JoinHandle<()>>,
}

impl PlaybackSession {
    /// Create an unstarted session.
    pub fn new(spec: SessionSpec, poll_interval: Duration) -> Self {
        let id = Uuid::new_v4();
        let container_id = format!("youtube-player-{}-{}", spec.video, id);

        Self {
            id,
            container_id,
            spec,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            created_at: Utc::now(),
            shared: Arc::new(SessionShared {
                inner: Mutex::new(SessionInner {
                    state: SessionState::Uninitialized,
                    instance: None,
                    failure: None,
                }),
            }),
            driver: None,
        }
    }

    /// Create a session and start it.
    pub fn open(api: &PlayerApi, spec: SessionSpec, poll_interval: Duration) -> Self {
        let mut session = Self::new(spec, poll_interval);
        session.start(api);
        session
    }

    /// Spawn the driver task and return immediately.
    ///
    /// The driver waits for the player API, creates the player and runs the
    /// clip loop. Creation failures leave the session `Destroyed` with
    /// [`PlaybackSession::failure`] set. Starting a session that is not
    /// `Uninitialized` does nothing.
    pub fn start(&mut self, api: &PlayerApi) {
        {
            let mut inner = self.shared.lock();
            if inner.state != SessionState::Uninitialized {
                return;
            }
            inner.state = SessionState::Creating;
        }

        self.driver = Some(tokio::spawn(drive(
            Arc::clone(&self.shared),
            api.clone(),
            self.container_id.clone(),
            self.spec.clone(),
            self.poll_interval,
            self.id,
        )));
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Identifier of the element the player is bound to.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn spec(&self) -> &SessionSpec {
        &self.spec
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    /// Why the player could not be created, if it could not.
    pub fn failure(&self) -> Option<String> {
        self.shared.lock().failure.clone()
    }

    /// Live playback position, or `None` when no instance can report one.
    pub async fn current_time(&self) -> Option<f64> {
        let instance = {
            let inner = self.shared.lock();
            if inner.state == SessionState::Destroyed {
                return None;
            }
            inner.instance.clone()?
        };
        instance.current_time().await
    }

    pub fn pause(&self) {
        let inner = self.shared.lock();
        if inner.state == SessionState::Destroyed {
            return;
        }
        if let Some(instance) = &inner.instance {
            instance.pause();
        }
    }

    /// Stop the position poll, then destroy the player. Safe to call repeatedly.
    pub fn close(&mut self) {
        let instance = {
            let mut inner = self.shared.lock();
            if inner.state == SessionState::Destroyed {
                return;
            }
            inner.state = SessionState::Destroyed;
            if let Some(driver) = self.driver.take() {
                driver.abort();
            }
            inner.instance.take()
        };

        if let Some(instance) = instance {
            instance.destroy();
        }

        counter!("ytclip_player_sessions_closed_total").increment(1);
        debug!(session_id = %self.id, video_id = %self.spec.video, "Player session closed");
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("container_id", &self.container_id)
            .field("spec", &self.spec)
            .field("state", &self.state())
            .finish()
    }
}

/// Driver task: create the player, wait for readiness, then run the clip
/// loop if one is bound.
///
/// A position query already in flight when `close` runs may still reach the
/// destroyed widget; its answer is dropped because the state is rechecked
/// under the lock before any seek.
async fn drive(
    shared: Arc<SessionShared>,
    api: PlayerApi,
    container_id: String,
    spec: SessionSpec,
    poll_interval: Duration,
    session_id: Uuid,
) {
    let options = spec.embed_options();
    let created = match api.backend().await {
        Ok(backend) => backend.create(&container_id, &spec.video, &options).await,
        Err(e) => Err(e),
    };

    let instance = match created {
        Ok(instance) => instance,
        Err(e) => {
            warn!(session_id = %session_id, video_id = %spec.video, "Failed to create player: {}", e);
            let mut inner = shared.lock();
            inner.state = SessionState::Destroyed;
            inner.failure = Some(e.to_string());
            return;
        }
    };

    {
        let mut inner = shared.lock();
        if inner.state == SessionState::Destroyed {
            drop(inner);
            instance.destroy();
            return;
        }
        inner.instance = Some(Arc::clone(&instance));
    }

    counter!("ytclip_player_sessions_opened_total").increment(1);
    info!(
        session_id = %session_id,
        video_id = %spec.video,
        clip = spec.is_clip(),
        theme = %spec.theme,
        "Player session created"
    );

    instance.ready().await;

    let Some(range) = spec.clip else {
        let mut inner = shared.lock();
        if inner.state != SessionState::Destroyed {
            inner.state = SessionState::Ready;
            debug!(session_id = %session_id, "Player ready for free playback");
        }
        return;
    };

    {
        let mut inner = shared.lock();
        if inner.state == SessionState::Destroyed {
            return;
        }
        instance.seek_to(range.start());
        instance.play();
        inner.state = SessionState::Looping;
        debug!(
            session_id = %session_id,
            start = range.start(),
            end = range.end(),
            "Clip preview looping"
        );
    }

    // First poll one period after playback starts.
    let mut ticker = interval_at(Instant::now() + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if shared.lock().state != SessionState::Looping {
            break;
        }

        let Some(position) = instance.current_time().await else {
            continue;
        };

        let inner = shared.lock();
        if inner.state != SessionState::Looping {
            break;
        }
        if range.is_past_end(position) {
            instance.seek_to(range.start());
            counter!("ytclip_player_loop_wraps_total").increment(1);
            trace!(session_id = %session_id, position, "Clip end reached, looping to start");
        }
    }
}
