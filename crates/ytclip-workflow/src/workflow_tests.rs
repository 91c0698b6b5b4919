use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use ytclip_models::{Theme, VideoRef};
use ytclip_player::testing::{FakeBackend, FakeLoader, FakePlayer, PlayerCall};
use ytclip_player::{PlayerApi, SessionState};

use crate::config::ClipperConfig;
use crate::error::WorkflowError;
use crate::preferences::{MemoryPreferenceStore, PreferenceStore};
use crate::state::{WorkflowEvent, WorkflowStage};
use crate::workflow::{ClipWorkflow, Surface};

const URL: &str = "https://youtu.be/abc12345678";

struct Harness {
    workflow: ClipWorkflow,
    backend: Arc<FakeBackend>,
    store: Arc<MemoryPreferenceStore>,
}

fn harness_with(config: ClipperConfig, store: MemoryPreferenceStore) -> Harness {
    let backend = Arc::new(FakeBackend::new());
    let store = Arc::new(store);
    let api = PlayerApi::ready(backend.clone());
    let workflow = ClipWorkflow::new(config, api, store.clone()).unwrap();
    Harness {
        workflow,
        backend,
        store,
    }
}

fn harness() -> Harness {
    harness_with(ClipperConfig::default(), MemoryPreferenceStore::default())
}

/// Let spawned driver tasks run.
async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

impl Harness {
    async fn load(&mut self, url: &str) {
        self.workflow.submit_url(url).unwrap();
        self.workflow.process_next_event().await;
        settle().await;
    }

    fn editor(&self) -> Arc<FakePlayer> {
        let container = self.workflow.session(Surface::Editor).unwrap().container_id().to_string();
        self.player(&container)
    }

    fn preview(&self) -> Arc<FakePlayer> {
        let container = self.workflow.session(Surface::Preview).unwrap().container_id().to_string();
        self.player(&container)
    }

    fn player(&self, container: &str) -> Arc<FakePlayer> {
        self.backend
            .players()
            .into_iter()
            .find(|p| p.container_id == container)
            .unwrap()
    }

    async fn mark_at(&mut self, start: f64, end: f64) {
        self.editor().set_position(Some(start));
        self.workflow.mark_start().await;
        self.editor().set_position(Some(end));
        self.workflow.mark_end().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_load_mark_and_generate() {
    let mut h = harness();

    h.workflow.submit_url(URL).unwrap();
    assert_eq!(h.workflow.stage(), WorkflowStage::Loading);
    assert!(h.workflow.session(Surface::Editor).is_none());

    h.workflow.process_next_event().await;
    settle().await;

    assert_eq!(h.workflow.stage(), WorkflowStage::Loaded);
    assert_eq!(h.workflow.video().unwrap().as_str(), "abc12345678");
    assert_eq!(h.workflow.boundary().start, None);
    assert_eq!(h.workflow.boundary().end, None);

    let editor = h.editor();
    assert!(editor.options.show_controls);
    assert_eq!(editor.options.start_offset, 0);

    h.mark_at(5.0, 15.0).await;
    assert_eq!(editor.pause_count(), 2);
    assert!(h.workflow.can_generate());
    assert_eq!(h.workflow.clip_duration(), 10.0);

    assert!(h.workflow.generate_clip());
    settle().await;

    assert_eq!(h.workflow.stage(), WorkflowStage::PreviewReady);
    let preview = h.preview();
    assert_eq!(preview.options.start_offset, 5);
    assert_eq!(&preview.calls()[..2], &[PlayerCall::SeekTo(5.0), PlayerCall::Play]);
    assert_eq!(
        h.workflow.session(Surface::Preview).unwrap().state(),
        SessionState::Looping
    );

    assert_eq!(
        h.workflow.share_url(),
        "https://www.youtube.com/watch?v=abc12345678&start=5&end=15"
    );
    assert_eq!(
        h.workflow.download_command().unwrap(),
        "yt-dlp --download-sections \"*00:00:05-00:00:15\" \"https://www.youtube.com/watch?v=abc12345678\""
    );
}

#[tokio::test(start_paused = true)]
async fn test_preview_loops_back_to_start() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(5.0, 15.0).await;
    h.workflow.generate_clip();
    settle().await;

    let preview = h.preview();
    preview.set_position(Some(15.2));
    sleep(Duration::from_millis(300)).await;

    assert_eq!(preview.seeks(), vec![5.0, 5.0]);
}

#[tokio::test(start_paused = true)]
async fn test_mark_start_past_end_clears_end() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(10.0, 20.0).await;

    h.editor().set_position(Some(25.0));
    h.workflow.mark_start().await;

    assert_eq!(h.workflow.boundary().start, Some(25.0));
    assert_eq!(h.workflow.boundary().end, None);
    assert_eq!(h.workflow.state().end_input, "--:--");
    assert!(!h.workflow.can_generate());
}

#[tokio::test(start_paused = true)]
async fn test_mark_end_before_start_is_kept() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(20.0, 10.0).await;

    assert_eq!(h.workflow.boundary().start, Some(20.0));
    assert_eq!(h.workflow.boundary().end, Some(10.0));
    assert!(!h.workflow.can_generate());
    assert!(matches!(
        h.workflow.boundary_hint(),
        Some(WorkflowError::IneligibleBoundary)
    ));
    assert_eq!(h.workflow.share_url(), "");
}

#[tokio::test(start_paused = true)]
async fn test_mark_without_position_is_noop() {
    let mut h = harness();
    h.load(URL).await;

    let editor = h.editor();
    editor.set_position(None);
    h.workflow.mark_start().await;

    assert_eq!(h.workflow.boundary().start, None);
    assert_eq!(editor.pause_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_mark_before_load_is_noop() {
    let mut h = harness();
    h.workflow.mark_start().await;
    h.workflow.mark_end().await;
    assert_eq!(h.workflow.boundary().start, None);
    assert_eq!(h.workflow.boundary().end, None);
}

#[tokio::test(start_paused = true)]
async fn test_generate_ineligible_is_noop() {
    let mut h = harness();

    // no video
    assert!(!h.workflow.generate_clip());
    assert_eq!(h.workflow.stage(), WorkflowStage::Idle);

    h.load(URL).await;

    // only start
    h.editor().set_position(Some(5.0));
    h.workflow.mark_start().await;
    assert!(!h.workflow.generate_clip());

    // start after end
    h.editor().set_position(Some(3.0));
    h.workflow.mark_end().await;
    assert!(!h.workflow.generate_clip());

    assert_eq!(h.workflow.stage(), WorkflowStage::Loaded);
    assert!(h.workflow.session(Surface::Preview).is_none());
    assert_eq!(h.backend.created_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_from_preview() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(5.0, 15.0).await;
    h.workflow.generate_clip();
    settle().await;

    let editor = h.editor();
    let preview = h.preview();

    h.workflow.reset();

    assert_eq!(h.workflow.stage(), WorkflowStage::Idle);
    assert!(h.workflow.video().is_none());
    assert_eq!(h.workflow.boundary().start, None);
    assert!(h.workflow.error().is_none());
    assert_eq!(h.workflow.state().url, "");
    assert!(h.workflow.session(Surface::Editor).is_none());
    assert!(h.workflow.session(Surface::Preview).is_none());
    assert!(editor.is_destroyed());
    assert!(preview.is_destroyed());
    assert!(h.backend.live_players().is_empty());
    assert!(!h.workflow.can_generate());
    assert_eq!(h.workflow.share_url(), "");
    assert!(h.workflow.download_command().is_none());

    // Poll stopped with the session.
    let polls = preview.poll_count();
    sleep(Duration::from_secs(2)).await;
    assert_eq!(preview.poll_count(), polls);
}

#[tokio::test(start_paused = true)]
async fn test_stale_load_ignored_after_reset() {
    let mut h = harness();
    h.workflow.submit_url(URL).unwrap();
    h.workflow.reset();

    let event = h.workflow.next_event().await.unwrap();
    assert!(matches!(event, WorkflowEvent::LoadCompleted { .. }));
    h.workflow.handle_event(event);

    assert_eq!(h.workflow.stage(), WorkflowStage::Idle);
    assert!(h.workflow.video().is_none());
    assert_eq!(h.backend.created_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resubmit_supersedes_pending_load() {
    let mut h = harness();
    h.workflow.submit_url(URL).unwrap();
    h.workflow.submit_url("https://www.youtube.com/watch?v=xyz98765432").unwrap();

    // Completions may arrive in either order; only the latest submit binds.
    h.workflow.process_next_event().await;
    h.workflow.process_next_event().await;
    assert_eq!(h.workflow.stage(), WorkflowStage::Loaded);
    assert_eq!(h.workflow.video().unwrap().as_str(), "xyz98765432");
    assert_eq!(h.backend.created_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_load_delay_is_honoured() {
    let mut h = harness();
    h.workflow.submit_url(URL).unwrap();

    let started = tokio::time::Instant::now();
    h.workflow.process_next_event().await;
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_eq!(h.workflow.stage(), WorkflowStage::Loaded);
}

#[tokio::test(start_paused = true)]
async fn test_empty_and_invalid_urls() {
    let mut h = harness();

    let err = h.workflow.submit_url("   ").unwrap_err();
    assert!(matches!(err, WorkflowError::EmptyInput));
    assert_eq!(h.workflow.error(), Some("Please enter a YouTube video URL."));
    assert_eq!(h.workflow.stage(), WorkflowStage::Idle);

    let err = h.workflow.submit_url("https://vimeo.com/123").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidUrl));
    assert_eq!(
        h.workflow.error(),
        Some("Invalid YouTube URL. Please check and try again.")
    );
    assert_eq!(h.workflow.stage(), WorkflowStage::Idle);

    h.load(URL).await;
    assert!(h.workflow.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_url_keeps_loaded_video() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(5.0, 15.0).await;

    assert!(h.workflow.submit_url("not a url").is_err());
    assert_eq!(h.workflow.stage(), WorkflowStage::Loaded);
    assert_eq!(h.workflow.boundary().start, Some(5.0));
    assert!(h.workflow.session(Surface::Editor).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_edit_valid_and_invalid_text() {
    let mut h = harness();
    h.load(URL).await;

    h.workflow.edit_start("1:05").unwrap();
    h.workflow.edit_end("02:00").unwrap();
    assert_eq!(h.workflow.boundary().start, Some(65.0));
    assert_eq!(h.workflow.boundary().end, Some(120.0));
    assert_eq!(h.workflow.state().start_input, "01:05");

    assert!(h.workflow.type_end_input("1:75"));
    let err = h.workflow.commit_end_input().unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTimeText(ref t) if t == "1:75"));
    assert_eq!(h.workflow.boundary().end, Some(120.0));
    assert_eq!(h.workflow.state().end_input, "02:00");
    assert!(h.workflow.error().is_none());

    assert!(h.workflow.edit_start("abc").is_err());
    assert_eq!(h.workflow.boundary().start, Some(65.0));
}

#[tokio::test(start_paused = true)]
async fn test_edit_without_video_is_ignored() {
    let mut h = harness();
    h.workflow.edit_start("00:10").unwrap();
    assert_eq!(h.workflow.boundary().start, None);
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_filter() {
    let mut h = harness();
    assert!(h.workflow.type_start_input("01:2"));
    assert_eq!(h.workflow.state().start_input, "01:2");
    assert!(!h.workflow.type_start_input("01:2a"));
    assert_eq!(h.workflow.state().start_input, "01:2");
    assert!(!h.workflow.type_end_input("-5"));
}

#[tokio::test(start_paused = true)]
async fn test_preview_replaced_when_marks_change() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(5.0, 15.0).await;
    h.workflow.generate_clip();
    settle().await;

    let first = h.preview();
    h.workflow.edit_end("00:20").unwrap();
    settle().await;

    assert!(first.is_destroyed());
    let second = h.preview();
    assert_eq!(second.seeks(), vec![5.0]);
    let clip = h.workflow.session(Surface::Preview).unwrap().spec().clip.unwrap();
    assert_eq!(clip.end(), 20.0);
    assert_eq!(h.workflow.stage(), WorkflowStage::PreviewReady);

    // Same range again keeps the running preview.
    h.workflow.edit_end("00:20").unwrap();
    assert!(!second.is_destroyed());
}

#[tokio::test(start_paused = true)]
async fn test_preview_closed_when_marks_become_ineligible() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(5.0, 15.0).await;
    h.workflow.generate_clip();
    settle().await;
    let preview = h.preview();

    h.workflow.edit_start("00:30").unwrap();

    assert!(preview.is_destroyed());
    assert!(h.workflow.session(Surface::Preview).is_none());
    assert_eq!(h.workflow.stage(), WorkflowStage::Loaded);
    assert_eq!(h.workflow.boundary().end, None);
}

#[tokio::test(start_paused = true)]
async fn test_new_url_replaces_sessions() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(5.0, 15.0).await;
    h.workflow.generate_clip();
    settle().await;

    h.load("https://www.youtube.com/shorts/xyz98765432").await;

    assert_eq!(h.workflow.stage(), WorkflowStage::Loaded);
    assert_eq!(h.workflow.boundary().start, None);
    assert_eq!(h.backend.live_players().len(), 1);
    assert_eq!(h.editor().video, VideoRef::try_from("xyz98765432".to_string()).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_player_failure_leaves_no_session() {
    let mut h = harness();
    h.backend.fail_next_create();
    h.load(URL).await;

    assert_eq!(h.workflow.stage(), WorkflowStage::Loaded);
    assert!(h.workflow.session(Surface::Editor).is_none());
    h.workflow.mark_start().await;
    assert_eq!(h.workflow.boundary().start, None);
}

#[tokio::test(start_paused = true)]
async fn test_theme_toggle_persists_and_rebuilds_sessions() {
    let mut h = harness();
    assert_eq!(h.workflow.theme(), Theme::Light);

    h.load(URL).await;
    h.mark_at(5.0, 15.0).await;
    h.workflow.generate_clip();
    settle().await;
    let old_editor = h.editor();
    let old_preview = h.preview();

    h.workflow.toggle_theme();
    settle().await;

    assert_eq!(h.workflow.theme(), Theme::Dark);
    assert_eq!(h.store.writes(), vec![Theme::Dark]);
    assert!(old_editor.is_destroyed());
    assert!(old_preview.is_destroyed());
    assert_eq!(h.editor().options.theme, Theme::Dark);
    assert_eq!(h.preview().options.theme, Theme::Dark);
    assert_eq!(h.backend.live_players().len(), 2);
    assert_eq!(h.workflow.boundary().start, Some(5.0));
    assert_eq!(h.workflow.stage(), WorkflowStage::PreviewReady);
}

#[tokio::test(start_paused = true)]
async fn test_theme_change_while_idle() {
    let mut h = harness();
    h.workflow.set_theme(Theme::Dark);
    h.workflow.set_theme(Theme::Dark);
    assert_eq!(h.store.writes(), vec![Theme::Dark]);
    assert_eq!(h.backend.created_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_startup_theme_resolution() {
    let config = ClipperConfig {
        prefers_dark: Some(true),
        ..ClipperConfig::default()
    };
    let h = harness_with(config.clone(), MemoryPreferenceStore::default());
    assert_eq!(h.workflow.theme(), Theme::Dark);

    let h = harness_with(config, MemoryPreferenceStore::with_theme(Theme::Light));
    assert_eq!(h.workflow.theme(), Theme::Light);
    assert_eq!(h.store.load_theme().unwrap(), Some(Theme::Light));
}

#[tokio::test(start_paused = true)]
async fn test_snapshot() {
    let mut h = harness();
    h.load(URL).await;

    let snapshot = h.workflow.snapshot();
    assert_eq!(snapshot.start_label, "--:--");
    assert!(!snapshot.can_generate);
    assert_eq!(snapshot.share_url, "");
    assert_eq!(
        snapshot.download_command.as_deref(),
        Some("yt-dlp --download-sections \"*00:00:00-00:00:00\" \"https://www.youtube.com/watch?v=abc12345678\"")
    );

    h.mark_at(65.0, 125.6).await;
    let snapshot = h.workflow.snapshot();
    assert_eq!(snapshot.start_label, "01:05");
    assert_eq!(snapshot.end_label, "02:05");
    assert_eq!(snapshot.duration_label, "01:00");
    assert_eq!(snapshot.duration_hint_secs, Some(61));
    assert_eq!(snapshot.video_id.as_deref(), Some("abc12345678"));

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["stage"], "loaded");
    assert_eq!(json["theme"], "light");
}

#[test]
fn test_invalid_share_config_rejected() {
    let config = ClipperConfig {
        video_host: "bad/host".to_string(),
        ..ClipperConfig::default()
    };
    let api = PlayerApi::ready(Arc::new(FakeBackend::new()));
    let result = ClipWorkflow::new(config, api, Arc::new(MemoryPreferenceStore::default()));
    assert!(matches!(result, Err(WorkflowError::Share(_))));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_edit_restores_stored_marks() {
    let mut h = harness();
    h.load(URL).await;
    h.mark_at(5.0, 15.0).await;

    assert!(h.workflow.type_start_input("3:4"));
    assert!(h.workflow.type_end_input(""));
    h.workflow.cancel_start_input();
    h.workflow.cancel_end_input();

    assert_eq!(h.workflow.state().start_input, "00:05");
    assert_eq!(h.workflow.state().end_input, "00:15");
    assert_eq!(h.workflow.boundary().start, Some(5.0));
    assert_eq!(h.workflow.boundary().end, Some(15.0));
    assert!(h.workflow.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_edit_with_unset_mark() {
    let mut h = harness();
    assert!(h.workflow.type_end_input("12:00"));
    h.workflow.cancel_end_input();
    assert_eq!(h.workflow.state().end_input, "--:--");
    assert_eq!(h.workflow.boundary().end, None);
}

fn held_harness() -> (ClipWorkflow, Arc<FakeBackend>, Arc<FakeLoader>) {
    let backend = Arc::new(FakeBackend::new());
    let loader = Arc::new(FakeLoader::held(backend.clone()));
    let workflow = ClipWorkflow::new(
        ClipperConfig::default(),
        PlayerApi::new(loader.clone()),
        Arc::new(MemoryPreferenceStore::default()),
    )
    .unwrap();
    (workflow, backend, loader)
}

#[tokio::test(start_paused = true)]
async fn test_workflow_usable_while_player_api_loads() {
    let (mut workflow, backend, loader) = held_harness();

    workflow.submit_url(URL).unwrap();
    workflow.process_next_event().await;
    settle().await;

    assert_eq!(workflow.stage(), WorkflowStage::Loaded);
    assert_eq!(
        workflow.session(Surface::Editor).unwrap().state(),
        SessionState::Creating
    );

    // Marking has no position yet, theme changes and reset still go through.
    workflow.mark_start().await;
    assert_eq!(workflow.boundary().start, None);
    workflow.toggle_theme();
    assert_eq!(workflow.theme(), Theme::Dark);
    workflow.reset();
    assert!(workflow.session(Surface::Editor).is_none());

    loader.release();
    settle().await;

    assert_eq!(backend.created_count(), 0);
    assert_eq!(workflow.stage(), WorkflowStage::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_editor_created_once_player_api_loads() {
    let (mut workflow, backend, loader) = held_harness();

    workflow.submit_url(URL).unwrap();
    workflow.process_next_event().await;
    settle().await;
    assert_eq!(backend.created_count(), 0);

    loader.release();
    settle().await;

    let editor = workflow.session(Surface::Editor).unwrap();
    assert_eq!(editor.state(), SessionState::Ready);
    assert_eq!(backend.created_count(), 1);
    assert_eq!(backend.last().unwrap().container_id, editor.container_id());
}
