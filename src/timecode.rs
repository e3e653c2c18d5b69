//! `HH:MM:SS.ff` timecodes and frame/time conversion.
//!
//! The fractional part of a timecode is a frame number within the second,
//! not a decimal fraction: at 25 fps `00:00:01.12` is frame 37. All
//! conversions truncate; none of them round.
//!
//! # Example
//!
//! ```
//! use framescrub::Timecode;
//!
//! let timecode: Timecode = "0:01:05.10".parse()?;
//! assert_eq!(timecode.to_string(), "00:01:05.10");
//! assert_eq!(timecode.to_frame_index(25.0), 65 * 25 + 10);
//! # Ok::<(), framescrub::TimecodeError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use thiserror::Error;

/// Why a timecode string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    /// The text does not have the `HH:MM:SS[.ff]` shape.
    #[error("'{0}' is not a valid time, expected HH:MM:SS[.ff]")]
    Malformed(String),
    /// Minutes or seconds are 60 or more.
    #[error("'{0}' has minutes or seconds out of range (00-59)")]
    OutOfRange(String),
}

/// A position expressed as hours, minutes, seconds and a frame within the
/// second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timecode {
    /// Whole hours.
    pub hours: u32,
    /// Minutes, `0..60`.
    pub minutes: u32,
    /// Seconds, `0..60`.
    pub seconds: u32,
    /// Frame number within the second.
    pub frames: u32,
}

impl Timecode {
    /// Build a timecode from a position in seconds, truncating every field.
    pub fn from_seconds(seconds: f64, frames_per_second: f64) -> Self {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        let whole = seconds.trunc();
        // The epsilon absorbs float noise such as 1.2 - 1.0 = 0.19999...
        // The clamp keeps the result inside the second.
        let frames = if frames_per_second > 0.0 {
            let last_in_second = (frames_per_second.ceil() as u32).saturating_sub(1);
            (((seconds - whole) * frames_per_second + 1e-6) as u32).min(last_in_second)
        } else {
            0
        };
        let whole = whole as u64;
        Self {
            hours: (whole / 3600) as u32,
            minutes: ((whole % 3600) / 60) as u32,
            seconds: (whole % 60) as u32,
            frames,
        }
    }

    /// Timecode of a frame index.
    pub fn from_frame_index(frame_index: u64, frames_per_second: f64) -> Self {
        if frames_per_second <= 0.0 {
            return Self::default();
        }
        Self::from_seconds(frame_index as f64 / frames_per_second, frames_per_second)
    }

    /// Position in seconds: `h·3600 + m·60 + s + ff/fps`.
    pub fn to_seconds(&self, frames_per_second: f64) -> f64 {
        let whole = self.hours as f64 * 3600.0 + self.minutes as f64 * 60.0 + self.seconds as f64;
        if frames_per_second > 0.0 {
            whole + self.frames as f64 / frames_per_second
        } else {
            whole
        }
    }

    /// Frame index at this position: `floor(seconds × fps)`.
    pub fn to_frame_index(&self, frames_per_second: f64) -> u64 {
        if frames_per_second <= 0.0 {
            return 0;
        }
        let whole = self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64;
        (whole as f64 * frames_per_second).floor() as u64 + self.frames as u64
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    /// Accepts `H:MM:SS`, `HH:MM:SS`, each optionally followed by a two or
    /// three digit frame suffix (`.ff` / `.fff`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let malformed = || TimecodeError::Malformed(trimmed.to_string());

        let (clock, frames) = match trimmed.split_once('.') {
            Some((clock, frames)) => (clock, Some(frames)),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = clock.split(':').collect();
        let [hours, minutes, seconds] = parts[..] else {
            return Err(malformed());
        };

        let digits = |text: &str, min_len: usize, max_len: usize| -> Option<u32> {
            let valid = (min_len..=max_len).contains(&text.len())
                && text.bytes().all(|byte| byte.is_ascii_digit());
            valid.then(|| text.parse().ok()).flatten()
        };

        let hours = digits(hours, 1, 2).ok_or_else(malformed)?;
        let minutes = digits(minutes, 2, 2).ok_or_else(malformed)?;
        let seconds = digits(seconds, 2, 2).ok_or_else(malformed)?;
        let frames = match frames {
            Some(frames) => digits(frames, 2, 3).ok_or_else(malformed)?,
            None => 0,
        };

        if minutes >= 60 || seconds >= 60 {
            return Err(TimecodeError::OutOfRange(trimmed.to_string()));
        }

        Ok(Self {
            hours,
            minutes,
            seconds,
            frames,
        })
    }
}

impl Display for Timecode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Convert a time in seconds to a frame index by truncation.
pub fn time_to_frame(seconds: f64, frames_per_second: f64) -> u64 {
    (seconds * frames_per_second).max(0.0) as u64
}

/// Convert a frame index to its timecode.
pub fn frame_to_time(frame_index: u64, frames_per_second: f64) -> Timecode {
    Timecode::from_frame_index(frame_index, frames_per_second)
}
