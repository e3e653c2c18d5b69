//! Decoder handle abstraction.
//!
//! The playback engine and the batch worker never talk to FFmpeg directly.
//! They drive a [`FrameSource`], obtained from a [`SourceOpener`], so the
//! same coordination logic runs against [`FfmpegSource`](crate::FfmpegSource)
//! in production and against synthetic sources in tests.

use std::path::Path;

use image::RgbImage;

use crate::{error::ScrubError, metadata::VideoMetadata};

/// An opened video that can be positioned and read sequentially.
///
/// A source is exclusively owned. It may move between threads (the playback
/// producer borrows the session's source for the duration of a run) but is
/// never accessed from two threads at once. Dropping the source releases it.
pub trait FrameSource: Send + 'static {
    /// Metadata captured when the source was opened.
    fn metadata(&self) -> &VideoMetadata;

    /// Position the source so the next [`read_next`](FrameSource::read_next)
    /// returns the frame at `frame_index`.
    fn seek(&mut self, frame_index: u64) -> Result<(), ScrubError>;

    /// Decode the next frame.
    ///
    /// Returns `Ok(None)` at end-of-stream.
    fn read_next(&mut self) -> Result<Option<RgbImage>, ScrubError>;

    /// Frames per second reported by the stream.
    fn frame_rate(&self) -> f64 {
        self.metadata().frames_per_second
    }

    /// Total number of frames reported by the stream.
    fn frame_count(&self) -> u64 {
        self.metadata().frame_count
    }

    /// Seek to `frame_index` and decode that single frame.
    fn read_at(&mut self, frame_index: u64) -> Result<Option<RgbImage>, ScrubError> {
        self.seek(frame_index)?;
        self.read_next()
    }
}

/// Opens [`FrameSource`]s by path.
///
/// Openers are shared between the foreground controller and the batch
/// worker thread, each of which opens its own independent source.
pub trait SourceOpener: Send + Sync + 'static {
    /// The kind of source this opener produces.
    type Source: FrameSource;

    /// Open the video at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::FileOpen`] or [`ScrubError::NoVideoStream`] if
    /// the file cannot be used.
    fn open(&self, path: &Path) -> Result<Self::Source, ScrubError>;
}
