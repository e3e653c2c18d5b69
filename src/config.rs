//! Playback and controller configuration.
//!
//! [`PlaybackOptions`] tunes the producer/consumer pipeline of a single
//! [`VideoSession`](crate::VideoSession). [`ScrubberOptions`] wraps it with
//! the settings the [`FrameScrubber`](crate::FrameScrubber) controller owns:
//! where output goes, how far a rewind/forward steps, and JPEG quality.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use framescrub::{PlaybackOptions, ScrubberOptions, StepSize};
//!
//! let options = ScrubberOptions::new()
//!     .with_playback(
//!         PlaybackOptions::new()
//!             .with_queue_capacity(60)
//!             .with_backoff_interval(Duration::from_millis(2)),
//!     )
//!     .with_step_size(StepSize::OneSecond)
//!     .with_output_dir("frames");
//! assert_eq!(options.playback.queue_capacity, 60);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::{queue::DEFAULT_QUEUE_CAPACITY, step::StepSize};

/// Default sleep while the frame queue is full.
pub const DEFAULT_BACKOFF_INTERVAL: Duration = Duration::from_millis(5);

/// Default JPEG quality for saved frames.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Settings for the playback pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackOptions {
    /// Frames buffered ahead of the consumer. At least 1.
    pub queue_capacity: usize,
    /// How long the producer sleeps before re-checking a full queue.
    pub backoff_interval: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackOptions {
    /// Defaults: 30 buffered frames, 5 ms backoff.
    pub fn new() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backoff_interval: DEFAULT_BACKOFF_INTERVAL,
        }
    }

    /// Set the frame queue capacity. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the producer backoff interval. Clamped to a minimum of 1 ms so
    /// the producer never spins.
    #[must_use]
    pub fn with_backoff_interval(mut self, interval: Duration) -> Self {
        self.backoff_interval = interval.max(Duration::from_millis(1));
        self
    }
}

/// Settings owned by the [`FrameScrubber`](crate::FrameScrubber) controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubberOptions {
    /// Pipeline settings for each loaded session.
    pub playback: PlaybackOptions,
    /// Root directory for saved frames and batch output.
    pub output_dir: PathBuf,
    /// Distance moved by rewind/forward.
    pub step_size: StepSize,
    /// JPEG quality, `1..=100`.
    pub jpeg_quality: u8,
}

impl Default for ScrubberOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrubberOptions {
    /// Defaults: current working directory, one-frame steps, quality 95.
    pub fn new() -> Self {
        Self {
            playback: PlaybackOptions::new(),
            output_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            step_size: StepSize::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the playback pipeline settings.
    #[must_use]
    pub fn with_playback(mut self, playback: PlaybackOptions) -> Self {
        self.playback = playback;
        self
    }

    /// Set the output root directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the rewind/forward step size.
    #[must_use]
    pub fn with_step_size(mut self, step_size: StepSize) -> Self {
        self.step_size = step_size;
        self
    }

    /// Set JPEG quality. Clamped to `1..=100`.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}
