//! Workflow configuration.

use std::path::PathBuf;
use std::time::Duration;

use ytclip_models::{ShareError, ShareTarget, DEFAULT_DOWNLOADER, DEFAULT_VIDEO_HOST};
use ytclip_player::DEFAULT_POLL_INTERVAL;

/// Cosmetic pause between accepting a URL and showing the player.
const DEFAULT_LOAD_DELAY_MS: u64 = 500;

const DEFAULT_PREFERENCES_PATH: &str = ".ytclip/preferences.json";

/// Clipper configuration.
#[derive(Debug, Clone)]
pub struct ClipperConfig {
    /// Delay before a submitted URL finishes loading (may be zero)
    pub load_delay: Duration,
    /// Position poll period for clip previews
    pub poll_interval: Duration,
    /// Host used in watch and share links
    pub video_host: String,
    /// Downloader executable named in the copyable command
    pub downloader: String,
    /// Where the theme preference is persisted
    pub preferences_path: PathBuf,
    /// OS-level dark mode hint, if the host knows it
    pub prefers_dark: Option<bool>,
}

impl Default for ClipperConfig {
    fn default() -> Self {
        Self {
            load_delay: Duration::from_millis(DEFAULT_LOAD_DELAY_MS),
            poll_interval: DEFAULT_POLL_INTERVAL,
            video_host: DEFAULT_VIDEO_HOST.to_string(),
            downloader: DEFAULT_DOWNLOADER.to_string(),
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
            prefers_dark: None,
        }
    }
}

impl ClipperConfig {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            load_delay: Duration::from_millis(env_parse("YTCLIP_LOAD_DELAY_MS").unwrap_or(DEFAULT_LOAD_DELAY_MS)),
            poll_interval: env_parse("YTCLIP_POLL_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            video_host: std::env::var("YTCLIP_VIDEO_HOST").unwrap_or_else(|_| DEFAULT_VIDEO_HOST.to_string()),
            downloader: std::env::var("YTCLIP_DOWNLOADER").unwrap_or_else(|_| DEFAULT_DOWNLOADER.to_string()),
            preferences_path: std::env::var("YTCLIP_PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PREFERENCES_PATH)),
            prefers_dark: std::env::var("YTCLIP_PREFERS_DARK").ok().and_then(|v| parse_flag(&v)),
        }
    }

    /// Link builder for the configured host and downloader.
    pub fn share_target(&self) -> Result<ShareTarget, ShareError> {
        ShareTarget::new(&self.video_host, self.downloader.clone())
    }

    /// Same config with no load delay.
    pub fn without_load_delay(mut self) -> Self {
        self.load_delay = Duration::ZERO;
        self
    }
}

fn env_parse(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Parse a boolean flag the way env toggles are usually written.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "dark" => Some(true),
        "0" | "false" | "no" | "off" | "light" => Some(false),
        _ => None,
    }
}
