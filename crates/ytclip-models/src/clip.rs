//! Clip boundary marks and validated clip ranges.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building a [`ClipRange`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ClipRangeError {
    #[error("Clip bounds must be finite and non-negative")]
    OutOfRange,

    #[error("Start time must be before end time")]
    StartNotBeforeEnd,
}

/// A validated `[start, end)` interval in seconds with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct ClipRange {
    start: f64,
    end: f64,
}

impl ClipRange {
    /// Build a range, rejecting negative, non-finite or empty intervals.
    pub fn new(start: f64, end: f64) -> Result<Self, ClipRangeError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end < 0.0 {
            return Err(ClipRangeError::OutOfRange);
        }
        if start >= end {
            return Err(ClipRangeError::StartNotBeforeEnd);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length of the range in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether a playback position has reached the end of the range.
    pub fn is_past_end(&self, position: f64) -> bool {
        position >= self.end
    }

    /// Start in whole seconds, as used in share links.
    pub fn start_secs(&self) -> u64 {
        self.start.floor() as u64
    }

    /// End in whole seconds, as used in share links.
    pub fn end_secs(&self) -> u64 {
        self.end.floor() as u64
    }
}

/// Start/end marks chosen by the user. Either side may be unset.
///
/// The pair is only usable as a clip when both marks are set and `start < end`.
/// An end placed before the start is kept as-is (generation is simply disabled),
/// while moving the start onto or past the end clears the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipBoundary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl ClipBoundary {
    /// Set the start mark. An end at or before the new start is cleared.
    pub fn set_start(&mut self, position: f64) {
        self.start = Some(position);
        if matches!(self.end, Some(end) if end <= position) {
            self.end = None;
        }
    }

    /// Set the end mark.
    pub fn set_end(&mut self, position: f64) {
        self.end = Some(position);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Both marks set with `start < end`.
    pub fn is_generatable(&self) -> bool {
        self.range().is_some()
    }

    /// The validated range, if the marks form one.
    pub fn range(&self) -> Option<ClipRange> {
        ClipRange::new(self.start?, self.end?).ok()
    }

    /// `end - start` when generatable, otherwise zero.
    pub fn duration(&self) -> f64 {
        self.range().map(|r| r.duration()).unwrap_or(0.0)
    }
}
