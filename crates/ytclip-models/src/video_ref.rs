//! Video identifier extraction from YouTube URLs.
//!
//! Resolution is purely syntactic: nothing here checks that the video exists.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a canonical video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// Recognised URL shapes:
/// - youtube.com/watch?v=VIDEO_ID
/// - youtube.com/embed/VIDEO_ID
/// - youtube.com/v/VIDEO_ID
/// - youtube.com/shorts/VIDEO_ID
/// - youtu.be/VIDEO_ID
///
/// Scheme and one subdomain label (`www.`, `m.`, `music.`) are optional. The id
/// may be followed by a query, fragment or path.
const VIDEO_URL_PATTERN: &str = r"^(?:https?://)?(?:[A-Za-z0-9-]+\.)?(?:youtube\.com/(?:watch\?v=|embed/|v/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[?&#/].*)?$";

static VIDEO_URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn video_url_regex() -> &'static Regex {
    VIDEO_URL_REGEX.get_or_init(|| Regex::new(VIDEO_URL_PATTERN).expect("video URL pattern compiles"))
}

/// Error for identifiers that are not exactly 11 characters of `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Video ID has invalid format: {0:?}")]
pub struct InvalidVideoId(pub String);

/// Opaque identifier of a video on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct VideoRef(String);

impl VideoRef {
    /// Resolve a pasted URL into a video reference.
    pub fn from_url(url: &str) -> Option<Self> {
        extract_video_id(url)
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for VideoRef {
    type Error = InvalidVideoId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_video_id(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidVideoId(value))
        }
    }
}

impl From<VideoRef> for String {
    fn from(value: VideoRef) -> Self {
        value.0
    }
}

/// Check if a string has the shape of a video identifier.
fn is_valid_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract the video identifier from a URL.
///
/// Returns `None` for empty input, unknown hosts, unsupported paths, and
/// identifiers of the wrong length or alphabet.
///
/// # Examples
/// ```
/// use ytclip_models::video_ref::extract_video_id;
/// let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
/// assert_eq!(id.as_str(), "dQw4w9WgXcQ");
/// assert!(extract_video_id("not a url").is_none());
/// ```
pub fn extract_video_id(url: &str) -> Option<VideoRef> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let captures = video_url_regex().captures(url)?;
    let id = captures.get(1)?.as_str();
    Some(VideoRef(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(url: &str) -> Option<String> {
        extract_video_id(url).map(String::from)
    }

    #[test]
    fn test_extract_supported_shapes() {
        let expected = Some("dQw4w9WgXcQ".to_string());

        assert_eq!(id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(id("https://youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ"), expected);
        assert_eq!(id("https://youtube.com/embed/dQw4w9WgXcQ"), expected);
        assert_eq!(id("https://www.youtube.com/v/dQw4w9WgXcQ"), expected);
        assert_eq!(id("https://youtube.com/shorts/dQw4w9WgXcQ"), expected);
        assert_eq!(id("https://m.youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(id("https://music.youtube.com/watch?v=dQw4w9WgXcQ&feature=share"), expected);
        assert_eq!(id("m.youtube.com/shorts/dQw4w9WgXcQ"), expected);
    }

    #[test]
    fn test_extract_optional_scheme_and_www() {
        assert_eq!(id("youtube.com/watch?v=dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(id("www.youtube.com/shorts/abc_def-123").as_deref(), Some("abc_def-123"));
        assert_eq!(id("http://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_extract_with_trailing_parameters() {
        assert_eq!(
            id("https://youtube.com/watch?v=dQw4w9WgXcQ&list=PLrAXtmRdnEQy4qtr").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ?t=30").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(id("https://youtube.com/embed/dQw4w9WgXcQ#t=1").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(id("  https://youtu.be/dQw4w9WgXcQ  ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_extract_rejects() {
        assert_eq!(id(""), None);
        assert_eq!(id("not a url"), None);
        assert_eq!(id("https://example.com"), None);
        assert_eq!(id("https://vimeo.com/123456789"), None);
        assert_eq!(id("https://youtube.com"), None);
        assert_eq!(id("https://youtu.be/"), None);
        assert_eq!(id("https://youtube.com/watch?v=abc123"), None);
        assert_eq!(id("https://youtu.be/abc123def456789"), None);
        assert_eq!(id("https://youtube.com/watch?v=abc123def!!"), None);
        assert_eq!(id("https://notyoutube.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(id("https://a.b.youtube.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(id("https://youtube.com.evil.io/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(id("https://www.youtube.com/playlist?list=PLrAXtmRdnEQy"), None);
    }

    #[test]
    fn test_video_ref_deserialize_validates() {
        let ok: VideoRef = serde_json::from_str("\"abc12345678\"").unwrap();
        assert_eq!(ok.as_str(), "abc12345678");
        assert!(serde_json::from_str::<VideoRef>("\"short\"").is_err());
    }

    #[test]
    fn test_video_ref_display() {
        let video = VideoRef::from_url("https://youtu.be/abc12345678").unwrap();
        assert_eq!(video.to_string(), "abc12345678");
    }
}
