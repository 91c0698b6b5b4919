//! Workflow state and its read-only snapshot.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ytclip_models::{format_clock, ClipBoundary, Theme, VideoRef};

/// Stage of the clip workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    /// Waiting for a URL
    #[default]
    Idle,
    /// URL accepted, player not shown yet
    Loading,
    /// Video bound, marks can be set
    Loaded,
    /// Clip preview looping
    PreviewReady,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Idle => "idle",
            WorkflowStage::Loading => "loading",
            WorkflowStage::Loaded => "loaded",
            WorkflowStage::PreviewReady => "preview_ready",
        }
    }

    /// Stages in which a video is bound.
    pub fn has_video(&self) -> bool {
        matches!(self, WorkflowStage::Loaded | WorkflowStage::PreviewReady)
    }
}

/// Everything the workflow owns apart from its sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowState {
    pub stage: WorkflowStage,
    pub url: String,
    pub video: Option<VideoRef>,
    pub boundary: ClipBoundary,
    pub error: Option<String>,
    /// Text shown in the start edit field
    pub start_input: String,
    /// Text shown in the end edit field
    pub end_input: String,
    /// Bumped on every submit and reset; stale load completions carry an older value
    pub generation: u64,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            stage: WorkflowStage::Idle,
            url: String::new(),
            video: None,
            boundary: ClipBoundary::default(),
            error: None,
            start_input: format_clock(None),
            end_input: format_clock(None),
            generation: 0,
        }
    }

    /// Reset the edit fields to the stored marks.
    pub fn sync_inputs(&mut self) {
        self.start_input = format_clock(self.boundary.start);
        self.end_input = format_clock(self.boundary.end);
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events produced off the user's path and applied by the hosting loop.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// The load delay for a submitted URL has elapsed.
    LoadCompleted { generation: u64, video: VideoRef },
}

/// Read model for a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct WorkflowSnapshot {
    pub stage: WorkflowStage,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub theme: Theme,
    pub boundary: ClipBoundary,
    /// `MM:SS` of the start mark, `--:--` when unset
    pub start_label: String,
    pub end_label: String,
    pub start_input: String,
    pub end_input: String,
    pub can_generate: bool,
    pub duration_secs: f64,
    /// `MM:SS` of the clip length
    pub duration_label: String,
    /// Whole-second length for the generate hint, when generatable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hint_secs: Option<u64>,
    /// Empty unless a clip can be generated
    pub share_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary_hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_shows_unset_inputs() {
        let state = WorkflowState::new();
        assert_eq!(state.stage, WorkflowStage::Idle);
        assert_eq!(state.start_input, "--:--");
        assert_eq!(state.end_input, "--:--");
    }

    #[test]
    fn test_sync_inputs() {
        let mut state = WorkflowState::new();
        state.boundary.set_start(65.4);
        state.sync_inputs();
        assert_eq!(state.start_input, "01:05");
        assert_eq!(state.end_input, "--:--");
    }

    #[test]
    fn test_stage_serialization() {
        assert_eq!(
            serde_json::to_string(&WorkflowStage::PreviewReady).unwrap(),
            "\"preview_ready\""
        );
        assert!(WorkflowStage::Loaded.has_video());
        assert!(!WorkflowStage::Loading.has_video());
    }

    #[test]
    fn test_snapshot_schema_lists_fields() {
        let schema = schemars::schema_for!(WorkflowSnapshot);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("share_url"));
        assert!(json.contains("download_command"));
    }
}
