//! Embedded player sessions for the YouTube clipper.
//!
//! This crate provides:
//! - Capability traits over the embeddable player widget
//! - A shared, load-once handle to the player API
//! - Playback sessions with looping clip preview and ordered teardown
//! - Embed options for free playback and clip preview

pub mod api;
pub mod backend;
pub mod error;
pub mod options;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::PlayerApi;
pub use backend::{PlayerBackend, PlayerInstance, PlayerLoader};
pub use error::{PlayerError, PlayerResult};
pub use options::EmbedOptions;
pub use session::{PlaybackSession, SessionSpec, SessionState, DEFAULT_POLL_INTERVAL};
