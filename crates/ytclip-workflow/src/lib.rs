//! Clip workflow for the YouTube clipper.
//!
//! Sequences URL submission, boundary marking, clip preview and export, and
//! owns the editor and preview player sessions.

pub mod config;
pub mod error;
pub mod logging;
pub mod preferences;
pub mod state;
pub mod workflow;

#[cfg(test)]
mod workflow_tests;

pub use config::ClipperConfig;
pub use error::{WorkflowError, WorkflowResult};
pub use logging::init_tracing;
pub use preferences::{
    resolve_theme, JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceResult,
    PreferenceStore,
};
pub use state::{WorkflowEvent, WorkflowSnapshot, WorkflowStage, WorkflowState};
pub use workflow::{ClipWorkflow, Surface};
