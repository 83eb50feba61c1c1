//! Click-to-playback mapping: a clicked surface coordinate becomes a bounded
//! autoplay range; no click means "play the whole buffer, paused".

use serde::{Deserialize, Serialize};

/// Seconds of audio played after a click.
pub const CLICK_PLAY_WINDOW_SECS: f64 = 0.5;

/// What the audio player should do next.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackCue {
    /// Bounded (start, end) range in seconds, or `None` for the whole buffer.
    pub range: Option<(f64, f64)>,
    pub autoplay: bool,
}

impl PlaybackCue {
    /// Idle state: whole buffer as source, no autoplay.
    pub fn idle() -> Self {
        Self {
            range: None,
            autoplay: false,
        }
    }

    /// Cue derived from a click at `time` seconds on the surface.
    ///
    /// Only the time component of the click matters. Both ends are clamped
    /// into [0, duration] so a click near either edge never produces a range
    /// outside the buffer.
    pub fn from_click(time: f64, duration_secs: f64) -> Self {
        let start = time.clamp(0.0, duration_secs);
        let end = (start + CLICK_PLAY_WINDOW_SECS).min(duration_secs);
        Self {
            range: Some((start, end)),
            autoplay: true,
        }
    }

    /// Media-fragment suffix for the playback URI: `"#t=<start>,<end>"`, or
    /// empty for the idle state.
    pub fn fragment(&self) -> String {
        match self.range {
            Some((start, end)) => format!("#t={},{}", start, end),
            None => String::new(),
        }
    }
}
