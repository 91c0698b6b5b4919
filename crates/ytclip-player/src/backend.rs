//! Capability traits over the embeddable player widget.
//!
//! A host (browser bridge, desktop webview, test fake) implements these to
//! plug a concrete player into sessions.

use std::sync::Arc;

use async_trait::async_trait;
use ytclip_models::VideoRef;

use crate::error::PlayerResult;
use crate::options::EmbedOptions;

/// Acquires the embed API. Invoked at most once per successful load.
#[async_trait]
pub trait PlayerLoader: Send + Sync {
    async fn load(&self) -> PlayerResult<Arc<dyn PlayerBackend>>;
}

/// Creates player instances bound to a container element.
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    async fn create(
        &self,
        container_id: &str,
        video: &VideoRef,
        options: &EmbedOptions,
    ) -> PlayerResult<Arc<dyn PlayerInstance>>;
}

/// One live player widget.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerInstance: Send + Sync {
    /// Resolves once the widget has finished loading.
    async fn ready(&self);

    fn seek_to(&self, seconds: f64);

    fn play(&self);

    fn pause(&self);

    /// Current playback position. `None` when the widget cannot report one.
    async fn current_time(&self) -> Option<f64>;

    fn destroy(&self);
}
