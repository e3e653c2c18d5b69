//! # framescrub
//!
//! Frame-accurate video scrubbing and extraction.
//!
//! `framescrub` opens a video, lets a user step and drag through it frame by
//! frame, plays it back at its native rate, and writes selected frames
//! (single frames, or strided ranges optionally cropped to a region of
//! interest) to disk as JPEG images. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Scrub and Save a Frame
//!
//! ```no_run
//! use framescrub::{DisplaySink, FfmpegOpener, Frame, FrameScrubber, ScrubberOptions, StepSize};
//!
//! struct Screen;
//! impl DisplaySink for Screen {
//!     fn show(&mut self, frame: &Frame) {
//!         println!("showing frame {}", frame.index);
//!     }
//!     fn update_position_indicator(&mut self, _frame_index: u64) {}
//! }
//!
//! let options = ScrubberOptions::new()
//!     .with_output_dir("frames")
//!     .with_step_size(StepSize::OneSecond);
//! let mut scrubber = FrameScrubber::new(FfmpegOpener, options);
//! scrubber.load("input.mp4", &mut Screen).unwrap();
//! scrubber.forward(&mut Screen).unwrap();
//! let path = scrubber.save_frame().unwrap();
//! ```
//!
//! ### Batch Extraction
//!
//! ```no_run
//! use framescrub::{DisplaySink, FfmpegOpener, Frame, FrameScrubber, ScrubberOptions};
//!
//! # struct Screen;
//! # impl DisplaySink for Screen {
//! #     fn show(&mut self, _frame: &Frame) {}
//! #     fn update_position_indicator(&mut self, _frame_index: u64) {}
//! # }
//! let mut scrubber = FrameScrubber::new(FfmpegOpener, ScrubberOptions::new());
//! scrubber.load("input.mp4", &mut Screen).unwrap();
//!
//! // Every 5th frame from the playhead to the end, cropped.
//! let request = scrubber
//!     .batch_request()
//!     .unwrap()
//!     .with_frame_step("5")
//!     .with_crop_text(["0", "0", "320", "240"]);
//! let summary = scrubber.start_batch(&request).unwrap().wait().unwrap();
//! println!("{} frames in {}", summary.written, summary.output_dir.display());
//! ```
//!
//! ## Architecture
//!
//! - **Decoder handle**: [`FrameSource`] / [`SourceOpener`], implemented over
//!   FFmpeg by [`FfmpegSource`] / [`FfmpegOpener`]
//! - **Frame buffer queue**: [`FrameBufferQueue`], bounded FIFO between
//!   producer and consumer
//! - **Playback producer**: [`PlaybackProducer`], a background decode thread
//!   that owns the session's source while it runs
//! - **Playback clock/consumer**: [`PlaybackClock`] and
//!   [`VideoSession::tick`]
//! - **Seek controller**: drag preview, seek release and relative steps on
//!   [`VideoSession`]
//! - **Batch extraction worker**: [`BatchHandle`] running [`run_batch`] with
//!   its own source
//! - **Controller**: [`FrameScrubber`], owner of the session and the batch
//!   job
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod batch;
pub mod clock;
pub mod config;
pub mod crop;
pub mod decoder;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod metadata;
pub mod producer;
pub mod progress;
pub mod queue;
pub mod scrubber;
pub mod session;
pub mod source;
pub mod step;
pub mod timecode;
mod utilities;
pub mod validation;

pub use batch::{
    BATCH_DIR_NAME, BatchEvent, BatchHandle, BatchJob, BatchOutcome, BatchRequest, BatchSummary,
    run_batch,
};
pub use clock::PlaybackClock;
pub use config::{DEFAULT_BACKOFF_INTERVAL, DEFAULT_JPEG_QUALITY, PlaybackOptions, ScrubberOptions};
pub use crop::CropRegion;
pub use decoder::{FfmpegOpener, FfmpegSource};
pub use error::ScrubError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::Frame;
pub use metadata::{DEFAULT_FRAME_RATE, VideoMetadata};
pub use producer::PlaybackProducer;
pub use progress::{CancellationToken, ProgressInfo, ProgressSink};
pub use queue::{DEFAULT_QUEUE_CAPACITY, FrameBufferQueue};
pub use scrubber::FrameScrubber;
pub use session::{DisplaySink, PlaybackState, TickOutcome, VideoSession};
pub use source::{FrameSource, SourceOpener};
pub use step::{StepDirection, StepSize};
pub use timecode::{Timecode, TimecodeError, frame_to_time, time_to_frame};
pub use validation::ValidationReport;
