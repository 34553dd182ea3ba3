use tracing::warn;

use crate::memory::layout::timing::FRAMES_PER_SECOND;

/// Parse a capture duration into a frame count.
///
/// Accepts `<n>f` (frames) and `<x>s` (seconds, `floor(x * 60)` frames).
/// The unit is case-insensitive; anything else, negative and non-finite
/// values included, is `None`.
pub fn parse_frame_count(text: &str) -> Option<u32> {
    let text = text.trim();
    let unit = text.chars().last()?;
    let amount = &text[..text.len() - unit.len_utf8()];

    match unit.to_ascii_lowercase() {
        'f' => amount.parse::<u32>().ok(),
        's' => {
            let seconds: f64 = amount.parse().ok()?;
            if !seconds.is_finite() || seconds < 0.0 {
                return None;
            }
            let frames = (seconds * f64::from(FRAMES_PER_SECOND)).floor();
            (frames <= f64::from(u32::MAX)).then_some(frames as u32)
        }
        _ => None,
    }
}

/// How many snapshots a run takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    SingleShot,
    Sequence(u32),
}

impl CaptureMode {
    /// Fewer than two frames is a single snapshot.
    pub fn from_frames(frames: u32) -> Self {
        if frames < 2 {
            Self::SingleShot
        } else {
            Self::Sequence(frames)
        }
    }

    /// Mode for a configured duration; empty means single-shot and an
    /// unparseable value falls back to single-shot with a warning.
    pub fn from_duration(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::SingleShot;
        }
        match parse_frame_count(text) {
            Some(frames) => Self::from_frames(frames),
            None => {
                warn!(
                    "Couldn't parse duration '{}' (expected e.g. 150f or 12.4s); capturing a single snapshot",
                    text
                );
                Self::SingleShot
            }
        }
    }

    pub fn frames(&self) -> u32 {
        match self {
            Self::SingleShot => 1,
            Self::Sequence(frames) => *frames,
        }
    }
}
