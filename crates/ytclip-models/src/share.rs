//! Share locators and downloader invocations for a marked clip.

use thiserror::Error;
use url::Url;

use crate::clip::{ClipBoundary, ClipRange};
use crate::timecode::format_for_tool;
use crate::video_ref::VideoRef;

/// Host used for watch and share links.
pub const DEFAULT_VIDEO_HOST: &str = "www.youtube.com";

/// Downloader named in the copyable command.
pub const DEFAULT_DOWNLOADER: &str = "yt-dlp";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Invalid video host '{0}'")]
    InvalidHost(String),

    #[error("Invalid watch URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Downloader name cannot be empty")]
    EmptyDownloader,
}

/// Builds the externally visible links for a video.
#[derive(Debug, Clone)]
pub struct ShareTarget {
    watch_base: Url,
    downloader: String,
}

impl ShareTarget {
    /// Create a target for `https://<host>/watch` and the given downloader executable.
    pub fn new(host: &str, downloader: impl Into<String>) -> Result<Self, ShareError> {
        let host = host.trim();
        if host.is_empty() || host.contains(&['/', '?', '#', '@', ' '][..]) {
            return Err(ShareError::InvalidHost(host.to_string()));
        }

        let watch_base = Url::parse(&format!("https://{}/watch", host))?;

        let downloader = downloader.into();
        if downloader.trim().is_empty() {
            return Err(ShareError::EmptyDownloader);
        }

        Ok(Self { watch_base, downloader })
    }

    pub fn downloader(&self) -> &str {
        &self.downloader
    }

    /// `https://<host>/watch?v=<id>`
    pub fn watch_url(&self, video: &VideoRef) -> String {
        let mut url = self.watch_base.clone();
        url.query_pairs_mut().append_pair("v", video.as_str());
        url.into()
    }

    /// `https://<host>/watch?v=<id>&start=<floor(start)>&end=<floor(end)>`
    pub fn share_url(&self, video: &VideoRef, range: &ClipRange) -> String {
        let mut url = self.watch_base.clone();
        url.query_pairs_mut()
            .append_pair("v", video.as_str())
            .append_pair("start", &range.start_secs().to_string())
            .append_pair("end", &range.end_secs().to_string());
        url.into()
    }

    /// `<tool> --download-sections "*HH:MM:SS-HH:MM:SS" "<watch url>"`
    ///
    /// Unset marks render as `00:00:00`.
    pub fn download_command(&self, video: &VideoRef, boundary: &ClipBoundary) -> String {
        format!(
            "{} --download-sections \"*{}-{}\" \"{}\"",
            self.downloader,
            format_for_tool(boundary.start),
            format_for_tool(boundary.end),
            self.watch_url(video)
        )
    }
}

impl Default for ShareTarget {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_HOST, DEFAULT_DOWNLOADER).expect("default share target is valid")
    }
}
