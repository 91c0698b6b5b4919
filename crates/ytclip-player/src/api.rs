//! Process-wide player API readiness.
//!
//! The embed API is acquired once and shared by every session. Callers that
//! arrive while the load is in flight wait on the same initialisation.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::backend::{PlayerBackend, PlayerLoader};
use crate::error::{PlayerError, PlayerResult};

/// Shared handle to the (possibly not yet loaded) player API.
#[derive(Clone)]
pub struct PlayerApi {
    inner: Arc<ApiInner>,
}

struct ApiInner {
    loader: Option<Arc<dyn PlayerLoader>>,
    backend: OnceCell<Arc<dyn PlayerBackend>>,
}

impl PlayerApi {
    /// Create a handle that loads the API on first use.
    pub fn new(loader: Arc<dyn PlayerLoader>) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                loader: Some(loader),
                backend: OnceCell::new(),
            }),
        }
    }

    /// Create a handle around an already available backend.
    pub fn ready(backend: Arc<dyn PlayerBackend>) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                loader: None,
                backend: OnceCell::new_with(Some(backend)),
            }),
        }
    }

    /// Whether the API has finished loading.
    pub fn is_ready(&self) -> bool {
        self.inner.backend.initialized()
    }

    /// Wait for the API and return its backend.
    ///
    /// The loader runs once; a failed load is retried by the next caller.
    pub async fn backend(&self) -> PlayerResult<Arc<dyn PlayerBackend>> {
        let backend = self
            .inner
            .backend
            .get_or_try_init(|| async {
                let loader = self
                    .inner
                    .loader
                    .as_ref()
                    .ok_or_else(|| PlayerError::api_unavailable("no player loader configured"))?;

                info!("Loading player API");
                match loader.load().await {
                    Ok(backend) => {
                        info!("Player API ready");
                        Ok(backend)
                    }
                    Err(e) => {
                        warn!("Player API failed to load: {}", e);
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(backend))
    }
}

impl fmt::Debug for PlayerApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerApi")
            .field("ready", &self.is_ready())
            .finish()
    }
}
