//! Clip workflow state machine.
//!
//! `Idle -> Loading -> Loaded -> PreviewReady`, with `reset` returning to
//! `Idle` from anywhere. The workflow owns the user-visible state and the two
//! player surfaces: the editor (free playback, source of live positions for
//! the start/end marks) and the preview (looping clip).

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use ytclip_models::{
    format_clock, is_clock_input, parse_clock, ClipBoundary, ShareTarget, Theme, VideoRef,
};
use ytclip_player::{PlaybackSession, PlayerApi, SessionSpec, SessionState};

use crate::config::ClipperConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::preferences::{resolve_theme, PreferenceStore};
use crate::state::{WorkflowEvent, WorkflowSnapshot, WorkflowStage, WorkflowState};

/// Player surfaces owned by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Editor,
    Preview,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Editor => "editor",
            Surface::Preview => "preview",
        }
    }
}

/// Which boundary field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Start,
    End,
}

/// Top-level controller sequencing load, marking, preview and export.
pub struct ClipWorkflow {
    config: ClipperConfig,
    share: ShareTarget,
    api: PlayerApi,
    preferences: Arc<dyn PreferenceStore>,
    theme: Theme,
    state: WorkflowState,
    editor: Option<PlaybackSession>,
    preview: Option<PlaybackSession>,
    events_tx: mpsc::UnboundedSender<WorkflowEvent>,
    events_rx: mpsc::UnboundedReceiver<WorkflowEvent>,
}

impl ClipWorkflow {
    /// Create a workflow in `Idle`, resolving the theme from the store.
    pub fn new(
        config: ClipperConfig,
        api: PlayerApi,
        preferences: Arc<dyn PreferenceStore>,
    ) -> WorkflowResult<Self> {
        let share = config.share_target()?;
        let theme = resolve_theme(preferences.as_ref(), config.prefers_dark);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        info!(theme = %theme, host = %config.video_host, "Clip workflow initialised");

        Ok(Self {
            config,
            share,
            api,
            preferences,
            theme,
            state: WorkflowState::new(),
            editor: None,
            preview: None,
            events_tx,
            events_rx,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn stage(&self) -> WorkflowStage {
        self.state.stage
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn boundary(&self) -> ClipBoundary {
        self.state.boundary
    }

    pub fn video(&self) -> Option<&VideoRef> {
        self.state.video.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// The surface's session, unless it failed to create its player.
    pub fn session(&self, surface: Surface) -> Option<&PlaybackSession> {
        let session = match surface {
            Surface::Editor => self.editor.as_ref(),
            Surface::Preview => self.preview.as_ref(),
        };
        session.filter(|s| s.state() != SessionState::Destroyed)
    }

    // ========================================================================
    // URL loading
    // ========================================================================

    /// Update the URL text without submitting it.
    pub fn set_url(&mut self, text: impl Into<String>) {
        self.state.url = text.into();
    }

    /// Submit a URL. On success the workflow enters `Loading` and a
    /// [`WorkflowEvent::LoadCompleted`] is delivered after the load delay.
    pub fn submit_url(&mut self, text: impl Into<String>) -> WorkflowResult<()> {
        self.state.url = text.into();

        if self.state.url.trim().is_empty() {
            return Err(self.report(WorkflowError::EmptyInput));
        }

        let Some(video) = VideoRef::from_url(&self.state.url) else {
            return Err(self.report(WorkflowError::InvalidUrl));
        };

        self.close_surface(Surface::Preview);
        self.close_surface(Surface::Editor);

        self.state.generation += 1;
        self.state.stage = WorkflowStage::Loading;
        self.state.video = None;
        self.state.boundary.clear();
        self.state.error = None;
        self.state.sync_inputs();

        let generation = self.state.generation;
        let delay = self.config.load_delay;
        let tx = self.events_tx.clone();

        info!(video_id = %video, generation, "Loading video");

        tokio::spawn(async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            // The receiver lives as long as the workflow.
            let _ = tx.send(WorkflowEvent::LoadCompleted { generation, video });
        });

        Ok(())
    }

    /// Wait for the next deferred event.
    pub async fn next_event(&mut self) -> Option<WorkflowEvent> {
        self.events_rx.recv().await
    }

    /// Wait for the next deferred event and apply it.
    pub async fn process_next_event(&mut self) {
        if let Some(event) = self.next_event().await {
            self.handle_event(event);
        }
    }

    /// Apply a deferred event. Events from a superseded submit are ignored.
    pub fn handle_event(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::LoadCompleted { generation, video } => {
                if generation != self.state.generation || self.state.stage != WorkflowStage::Loading {
                    debug!(
                        generation,
                        current = self.state.generation,
                        stage = self.state.stage.as_str(),
                        "Ignoring stale load completion"
                    );
                    return;
                }

                self.state.video = Some(video.clone());
                self.state.stage = WorkflowStage::Loaded;
                self.replace_session(Surface::Editor, SessionSpec::free(video.clone(), self.theme));

                info!(video_id = %video, "Video loaded");
            }
        }
    }

    // ========================================================================
    // Boundary marks
    // ========================================================================

    /// Set the start mark to the editor's live position and pause it.
    ///
    /// Does nothing when no position is available.
    pub async fn mark_start(&mut self) {
        let Some(position) = self.capture_position().await else {
            return;
        };
        debug!(position, "Start marked");
        self.state.boundary.set_start(position);
        self.boundary_changed();
    }

    /// Set the end mark to the editor's live position and pause it.
    ///
    /// Does nothing when no position is available.
    pub async fn mark_end(&mut self) {
        let Some(position) = self.capture_position().await else {
            return;
        };
        debug!(position, "End marked");
        self.state.boundary.set_end(position);
        self.boundary_changed();
    }

    /// Keystroke into the start field. Only digits and `:` are accepted.
    pub fn type_start_input(&mut self, text: &str) -> bool {
        self.type_input(Mark::Start, text)
    }

    /// Keystroke into the end field. Only digits and `:` are accepted.
    pub fn type_end_input(&mut self, text: &str) -> bool {
        self.type_input(Mark::End, text)
    }

    /// Commit typed start text.
    ///
    /// Invalid text reverts the field to the stored mark and leaves the boundary untouched.
    pub fn edit_start(&mut self, text: &str) -> WorkflowResult<()> {
        self.commit_edit(Mark::Start, text)
    }

    /// Commit typed end text.
    pub fn edit_end(&mut self, text: &str) -> WorkflowResult<()> {
        self.commit_edit(Mark::End, text)
    }

    /// Discard typed start text, showing the stored mark again.
    pub fn cancel_start_input(&mut self) {
        self.state.start_input = format_clock(self.state.boundary.start);
    }

    /// Discard typed end text, showing the stored mark again.
    pub fn cancel_end_input(&mut self) {
        self.state.end_input = format_clock(self.state.boundary.end);
    }

    /// Commit whatever is currently in the start field.
    pub fn commit_start_input(&mut self) -> WorkflowResult<()> {
        let text = self.state.start_input.clone();
        self.commit_edit(Mark::Start, &text)
    }

    /// Commit whatever is currently in the end field.
    pub fn commit_end_input(&mut self) -> WorkflowResult<()> {
        let text = self.state.end_input.clone();
        self.commit_edit(Mark::End, &text)
    }

    // ========================================================================
    // Preview, reset, theme
    // ========================================================================

    /// Start the looping preview. Returns `false` (and does nothing) unless a
    /// video is bound and the marks form a valid clip.
    pub fn generate_clip(&mut self) -> bool {
        let (Some(video), Some(range)) = (self.state.video.clone(), self.state.boundary.range()) else {
            debug!("Generate ignored: clip not eligible");
            return false;
        };

        self.replace_session(Surface::Preview, SessionSpec::clip(video.clone(), range, self.theme));
        self.state.stage = WorkflowStage::PreviewReady;

        info!(
            video_id = %video,
            start = range.start(),
            end = range.end(),
            "Clip preview generated"
        );
        true
    }

    /// Return to `Idle`, dropping the video, marks, error and both sessions.
    pub fn reset(&mut self) {
        self.close_surface(Surface::Preview);
        self.close_surface(Surface::Editor);

        let generation = self.state.generation + 1;
        self.state = WorkflowState::new();
        self.state.generation = generation;

        info!(generation, "Workflow reset");
    }

    /// Change the theme, persist it, and rebuild live sessions with it.
    pub fn set_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        self.theme = theme;

        if let Err(e) = self.preferences.save_theme(theme) {
            warn!(theme = %theme, "Failed to save theme preference: {}", e);
        }

        self.reopen_sessions();
        info!(theme = %theme, "Theme changed");
    }

    pub fn toggle_theme(&mut self) {
        self.set_theme(self.theme.toggled());
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// Both marks set with `start < end`.
    pub fn can_generate(&self) -> bool {
        self.state.boundary.is_generatable()
    }

    /// `end - start` when generatable, otherwise zero.
    pub fn clip_duration(&self) -> f64 {
        self.state.boundary.duration()
    }

    /// Share link, empty unless a clip can be generated.
    pub fn share_url(&self) -> String {
        match (&self.state.video, self.state.boundary.range()) {
            (Some(video), Some(range)) => self.share.share_url(video, &range),
            _ => String::new(),
        }
    }

    /// Downloader command for the current marks, once a video is bound.
    pub fn download_command(&self) -> Option<String> {
        self.state
            .video
            .as_ref()
            .map(|video| self.share.download_command(video, &self.state.boundary))
    }

    /// Inline hint for marks that are both set but out of order.
    pub fn boundary_hint(&self) -> Option<WorkflowError> {
        let boundary = &self.state.boundary;
        (boundary.is_complete() && !boundary.is_generatable()).then_some(WorkflowError::IneligibleBoundary)
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let boundary = self.state.boundary;
        let can_generate = self.can_generate();
        let duration = self.clip_duration();

        WorkflowSnapshot {
            stage: self.state.stage,
            url: self.state.url.clone(),
            video_id: self.state.video.as_ref().map(|v| v.to_string()),
            theme: self.theme,
            boundary,
            start_label: format_clock(boundary.start),
            end_label: format_clock(boundary.end),
            start_input: self.state.start_input.clone(),
            end_input: self.state.end_input.clone(),
            can_generate,
            duration_secs: duration,
            duration_label: format_clock(Some(duration)),
            duration_hint_secs: can_generate.then(|| duration.round() as u64),
            share_url: self.share_url(),
            download_command: self.download_command(),
            error: self.state.error.clone(),
            boundary_hint: self.boundary_hint().map(|e| e.to_string()),
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn report(&mut self, error: WorkflowError) -> WorkflowError {
        if error.is_reported() {
            warn!(url = %self.state.url, "{}", error);
            self.state.error = Some(error.to_string());
        }
        error
    }

    /// Read the editor position and pause playback.
    async fn capture_position(&self) -> Option<f64> {
        let editor = self.editor.as_ref()?;
        let position = editor.current_time().await?;
        editor.pause();
        Some(position)
    }

    fn type_input(&mut self, mark: Mark, text: &str) -> bool {
        if !is_clock_input(text) {
            return false;
        }
        match mark {
            Mark::Start => self.state.start_input = text.to_string(),
            Mark::End => self.state.end_input = text.to_string(),
        }
        true
    }

    fn commit_edit(&mut self, mark: Mark, text: &str) -> WorkflowResult<()> {
        if self.state.video.is_none() {
            return Ok(());
        }

        let Some(seconds) = parse_clock(text) else {
            self.state.sync_inputs();
            debug!(text, "Reverted invalid time edit");
            return Err(WorkflowError::InvalidTimeText(text.to_string()));
        };

        match mark {
            Mark::Start => self.state.boundary.set_start(seconds),
            Mark::End => self.state.boundary.set_end(seconds),
        }
        self.boundary_changed();
        Ok(())
    }

    /// Keep the edit fields and the preview in step with the marks.
    fn boundary_changed(&mut self) {
        self.state.sync_inputs();

        if self.state.stage != WorkflowStage::PreviewReady {
            return;
        }

        match (self.state.video.clone(), self.state.boundary.range()) {
            (Some(video), Some(range)) => {
                let unchanged = self
                    .preview
                    .as_ref()
                    .is_some_and(|session| session.spec().clip == Some(range));
                if unchanged {
                    return;
                }
                self.replace_session(Surface::Preview, SessionSpec::clip(video, range, self.theme));
            }
            _ => {
                self.close_surface(Surface::Preview);
                self.state.stage = WorkflowStage::Loaded;
                debug!("Preview closed: clip no longer eligible");
            }
        }
    }

    fn reopen_sessions(&mut self) {
        let Some(video) = self.state.video.clone() else {
            return;
        };

        if self.state.stage.has_video() {
            self.replace_session(Surface::Editor, SessionSpec::free(video.clone(), self.theme));
        }

        if self.state.stage == WorkflowStage::PreviewReady {
            if let Some(range) = self.state.boundary.range() {
                self.replace_session(Surface::Preview, SessionSpec::clip(video, range, self.theme));
            }
        }
    }

    /// Close the surface's session and start a new one. Opening never waits
    /// for the player; creation failures surface as a `Destroyed` session,
    /// which [`Self::session`] hides.
    fn replace_session(&mut self, surface: Surface, spec: SessionSpec) {
        self.close_surface(surface);

        let session = PlaybackSession::open(&self.api, spec, self.config.poll_interval);
        debug!(
            surface = surface.as_str(),
            session_id = %session.id(),
            "Player session opening"
        );

        match surface {
            Surface::Editor => self.editor = Some(session),
            Surface::Preview => self.preview = Some(session),
        }
    }

    fn close_surface(&mut self, surface: Surface) {
        let session = match surface {
            Surface::Editor => self.editor.take(),
            Surface::Preview => self.preview.take(),
        };
        if let Some(mut session) = session {
            session.close();
        }
    }
}

impl std::fmt::Debug for ClipWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipWorkflow")
            .field("state", &self.state)
            .field("theme", &self.theme)
            .field("editor", &self.editor)
            .field("preview", &self.preview)
            .finish()
    }
}
