//! Video metadata.
//!
//! [`VideoMetadata`] is captured once when a [`FrameSource`](crate::FrameSource)
//! is opened and cached for the lifetime of the source.

use std::time::Duration;

/// Frame rate assumed when a stream does not report a usable one.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Metadata for a video stream.
///
/// # Example
///
/// ```no_run
/// use framescrub::{FfmpegOpener, FrameSource, SourceOpener};
///
/// let source = FfmpegOpener.open("input.mp4".as_ref())?;
/// let metadata = source.metadata();
/// println!("{}x{} @ {} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// # Ok::<(), framescrub::ScrubError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames.
    pub frame_count: u64,
    /// Total duration of the stream.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Frame rate to drive timing with, falling back to
    /// [`DEFAULT_FRAME_RATE`] when the stream reports none.
    pub fn effective_frame_rate(&self) -> f64 {
        if self.frames_per_second.is_finite() && self.frames_per_second > 0.0 {
            self.frames_per_second
        } else {
            DEFAULT_FRAME_RATE
        }
    }

    /// Index of the last frame, or `None` for an empty stream.
    pub fn last_frame_index(&self) -> Option<u64> {
        self.frame_count.checked_sub(1)
    }

    /// Clamp a frame index into `[0, frame_count - 1]`.
    pub fn clamp_frame(&self, frame_index: u64) -> u64 {
        frame_index.min(self.last_frame_index().unwrap_or(0))
    }

    /// Length of the video in seconds, derived from the frame count.
    pub fn length_seconds(&self) -> f64 {
        self.frame_count as f64 / self.effective_frame_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(frames_per_second: f64, frame_count: u64) -> VideoMetadata {
        VideoMetadata {
            width: 640,
            height: 360,
            frames_per_second,
            frame_count,
            duration: Duration::ZERO,
            codec: "test".to_string(),
        }
    }

    #[test]
    fn clamp_frame_limits_to_last_index() {
        let meta = metadata(25.0, 100);
        assert_eq!(meta.clamp_frame(150), 99);
        assert_eq!(meta.clamp_frame(42), 42);
    }

    #[test]
    fn empty_stream_has_no_last_frame() {
        let meta = metadata(25.0, 0);
        assert_eq!(meta.last_frame_index(), None);
        assert_eq!(meta.clamp_frame(10), 0);
    }

    #[test]
    fn zero_frame_rate_falls_back() {
        let meta = metadata(0.0, 90);
        assert_eq!(meta.effective_frame_rate(), DEFAULT_FRAME_RATE);
        assert!((meta.length_seconds() - 3.0).abs() < 1e-9);
    }
}
