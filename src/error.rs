//! Error types for the `framescrub` crate.
//!
//! This module defines [`ScrubError`], the unified error type returned by all
//! fallible operations in the crate. End-of-stream and cancellation are not
//! errors: decoders report end-of-stream as `Ok(None)` and cancelled batch
//! jobs finish with a partial [`BatchSummary`](crate::BatchSummary).

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The unified error type for all `framescrub` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScrubError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the opener.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// User input failed validation. Every violated constraint is listed in
    /// the report.
    #[error("Invalid input:\n{0}")]
    InvalidInput(ValidationReport),

    /// The operation needs a loaded video.
    #[error("No video is loaded")]
    NoVideoLoaded,

    /// Saving was requested before any frame was displayed.
    #[error("No frame has been displayed yet")]
    NoFrameDisplayed,

    /// The operation is not allowed while playback is running.
    #[error("Operation not allowed while playback is running")]
    PlaybackActive,

    /// A batch extraction job is already running.
    #[error("A batch extraction is already in progress")]
    BatchInProgress,

    /// The session's decoder handle was lost because a background task
    /// terminated abnormally.
    #[error("Decoder unavailable: {0}")]
    DecoderUnavailable(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while cropping or encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for ScrubError {
    fn from(error: FfmpegError) -> Self {
        ScrubError::FfmpegError(error.to_string())
    }
}
