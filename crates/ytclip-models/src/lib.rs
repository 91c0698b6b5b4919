//! Shared data models for the YouTube clipper.
//!
//! This crate provides:
//! - `MM:SS` / `HH:MM:SS` time formatting and parsing
//! - Video identifier extraction from pasted URLs
//! - Clip boundary marks and validated ranges
//! - Share links and downloader commands
//! - Display theme

pub mod clip;
pub mod share;
pub mod theme;
pub mod timecode;
pub mod video_ref;

// Re-export common types
pub use clip::{ClipBoundary, ClipRange, ClipRangeError};
pub use share::{ShareError, ShareTarget, DEFAULT_DOWNLOADER, DEFAULT_VIDEO_HOST};
pub use theme::Theme;
pub use timecode::{format_clock, format_for_tool, is_clock_input, parse_clock};
pub use video_ref::{extract_video_id, InvalidVideoId, VideoRef};
