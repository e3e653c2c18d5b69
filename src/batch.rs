//! Batch frame extraction.
//!
//! A [`BatchRequest`] holds the raw text a user typed (times, frame step,
//! crop coordinates). Validating it against the loaded video yields a
//! [`BatchJob`], which [`BatchHandle::spawn`] runs on its own thread with its
//! own [`FrameSource`], independent of playback.
//!
//! The worker decodes every frame of the range sequentially, since seeking
//! per selected frame is slower than decoding through a typical GOP, and
//! writes every `frame_step`-th one as a JPEG. Progress and the final
//! [`BatchSummary`] travel back over a channel; nothing is called on the
//! worker thread except the source and the filesystem.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framescrub::{BatchHandle, BatchRequest, FfmpegOpener, FrameSource, SourceOpener};
//!
//! let path = std::path::Path::new("input.mp4");
//! let metadata = FfmpegOpener.open(path)?.metadata().clone();
//! let job = BatchRequest::new("00:00:00.00", "00:00:10.00")
//!     .with_frame_step("5")
//!     .with_crop_text(["0", "0", "320", "240"])
//!     .validate(&metadata, path, "frames".as_ref())?;
//!
//! let mut handle = BatchHandle::spawn(Arc::new(FfmpegOpener), job)?;
//! let summary = handle.wait()?;
//! println!("{} of {} frames written", summary.written, summary.total);
//! # Ok::<(), framescrub::ScrubError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    config::DEFAULT_JPEG_QUALITY,
    crop::CropRegion,
    error::ScrubError,
    metadata::VideoMetadata,
    progress::{CancellationToken, ProgressInfo, ProgressSink, ProgressTracker},
    source::{FrameSource, SourceOpener},
    timecode::Timecode,
    utilities,
    validation::validate_batch_request,
};

/// Name of the batch output directory under `<output_root>/<video_stem>`.
pub const BATCH_DIR_NAME: &str = "batch_extract";

/// Unvalidated batch extraction input, as typed by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Start time, `HH:MM:SS[.ff]`.
    pub start_time: String,
    /// End time (inclusive), `HH:MM:SS[.ff]`.
    pub end_time: String,
    /// Write every n-th frame. Must parse as an integer ≥ 1.
    pub frame_step: String,
    /// Optional `[x1, y1, x2, y2]` crop coordinates.
    pub crop: Option<[String; 4]>,
}

impl BatchRequest {
    /// A request for every frame between two times, without cropping.
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            frame_step: "1".to_string(),
            crop: None,
        }
    }

    /// Defaults offered for a loaded video: from the playhead to the end of
    /// the video, every frame, no crop.
    pub fn defaults_for(metadata: &VideoMetadata, current_frame: u64) -> Self {
        let frames_per_second = metadata.effective_frame_rate();
        Self::new(
            Timecode::from_frame_index(current_frame, frames_per_second).to_string(),
            Timecode::from_seconds(metadata.length_seconds(), frames_per_second).to_string(),
        )
    }

    #[must_use]
    pub fn with_frame_step(mut self, frame_step: impl Into<String>) -> Self {
        self.frame_step = frame_step.into();
        self
    }

    /// Set crop coordinates from text, validated later.
    #[must_use]
    pub fn with_crop_text<T: Into<String>>(mut self, coordinates: [T; 4]) -> Self {
        self.crop = Some(coordinates.map(Into::into));
        self
    }

    /// Set crop coordinates from a region.
    #[must_use]
    pub fn with_crop(self, region: CropRegion) -> Self {
        self.with_crop_text([
            region.x1.to_string(),
            region.y1.to_string(),
            region.x2.to_string(),
            region.y2.to_string(),
        ])
    }

    #[must_use]
    pub fn without_crop(mut self) -> Self {
        self.crop = None;
        self
    }

    /// Check the request against `metadata` and build the job.
    ///
    /// Output goes to `<output_root>/<video_stem>/batch_extract`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::InvalidInput`] listing every problem found.
    pub fn validate(
        &self,
        metadata: &VideoMetadata,
        video_path: &Path,
        output_root: &Path,
    ) -> Result<BatchJob, ScrubError> {
        let output_dir = output_root
            .join(utilities::video_stem(video_path))
            .join(BATCH_DIR_NAME);
        validate_batch_request(self, metadata, video_path, &output_dir)
    }
}

/// A validated extraction job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    /// Video to decode. The worker opens it independently.
    pub video_path: PathBuf,
    /// Directory the JPEGs are written to, created on first write.
    pub output_dir: PathBuf,
    /// First frame of the range.
    pub start_frame: u64,
    /// Last frame of the range (inclusive).
    pub end_frame: u64,
    /// Write every n-th frame, counted from `start_frame`. At least 1.
    pub frame_step: u64,
    /// Region written instead of the full frame.
    pub crop: Option<CropRegion>,
    /// JPEG quality, `1..=100`.
    pub jpeg_quality: u8,
}

impl BatchJob {
    /// Number of frames the job writes when it runs to completion:
    /// `1 + (end - start) / step`.
    pub fn total_selected(&self) -> u64 {
        if self.end_frame < self.start_frame {
            return 0;
        }
        1 + (self.end_frame - self.start_frame) / self.frame_step.max(1)
    }

    /// Returns `true` if `frame_index` is written.
    pub fn is_selected(&self, frame_index: u64) -> bool {
        (self.start_frame..=self.end_frame).contains(&frame_index)
            && (frame_index - self.start_frame) % self.frame_step.max(1) == 0
    }

    /// Indices the job writes, in order.
    pub fn selected_frames(&self) -> impl Iterator<Item = u64> + '_ {
        (self.start_frame..=self.end_frame).step_by(self.frame_step.max(1) as usize)
    }

    /// `<output_dir>/<video_stem>_frame_<index>.jpg`
    pub fn output_path(&self, frame_index: u64) -> PathBuf {
        utilities::frame_file_path(
            &self.output_dir,
            &utilities::video_stem(&self.video_path),
            frame_index,
        )
    }

    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

/// How a batch job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every frame of the range was processed.
    Completed,
    /// The job was cancelled. Frames already written stay on disk.
    Cancelled,
    /// The video ended, or stopped decoding, before the end of the range.
    EndOfStream,
    /// The job could not continue.
    Failed(String),
}

impl Display for BatchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BatchOutcome::Completed => f.write_str("completed"),
            BatchOutcome::Cancelled => f.write_str("cancelled"),
            BatchOutcome::EndOfStream => f.write_str("end of stream"),
            BatchOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Final report of a batch job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Frames written to disk.
    pub written: u64,
    /// Frames the job would have written if it ran to completion.
    pub total: u64,
    /// Last frame decoded, if any.
    pub last_frame: Option<u64>,
    /// Where the frames were written.
    pub output_dir: PathBuf,
    pub outcome: BatchOutcome,
}

impl BatchSummary {
    fn new(job: &BatchJob, written: u64, last_frame: Option<u64>, outcome: BatchOutcome) -> Self {
        Self {
            written,
            total: job.total_selected(),
            last_frame,
            output_dir: job.output_dir.clone(),
            outcome,
        }
    }

    /// Returns `true` if every selected frame was written.
    pub fn is_complete(&self) -> bool {
        self.outcome == BatchOutcome::Completed
    }
}

/// Messages from the batch worker to the foreground.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Posted after every decoded frame.
    Progress(ProgressInfo),
    /// Posted exactly once, last.
    Completed(BatchSummary),
}

/// Run `job` on the calling thread.
///
/// `on_progress` is called after every decoded frame of the range. Decode
/// failures end the job as [`BatchOutcome::EndOfStream`]; failures to seek
/// or write end it as [`BatchOutcome::Failed`].
pub fn run_batch<S, F>(
    source: &mut S,
    job: &BatchJob,
    token: &CancellationToken,
    mut on_progress: F,
) -> BatchSummary
where
    S: FrameSource + ?Sized,
    F: FnMut(&ProgressInfo),
{
    let mut tracker = ProgressTracker::new(job.total_selected());
    let mut last_frame = None;

    log::debug!(
        "Batch extraction of frames {}..={} (step {}) into {}",
        job.start_frame,
        job.end_frame,
        job.frame_step,
        job.output_dir.display(),
    );

    let outcome = match source.seek(job.start_frame) {
        Err(error) => BatchOutcome::Failed(error.to_string()),
        Ok(()) => {
            let mut outcome = BatchOutcome::Completed;
            for frame_index in job.start_frame..=job.end_frame {
                if token.is_cancelled() {
                    outcome = BatchOutcome::Cancelled;
                    break;
                }

                let image = match source.read_next() {
                    Ok(Some(image)) => image,
                    Ok(None) => {
                        outcome = BatchOutcome::EndOfStream;
                        break;
                    }
                    Err(error) => {
                        log::warn!("Batch extraction failed to decode frame {frame_index}: {error}");
                        outcome = BatchOutcome::EndOfStream;
                        break;
                    }
                };

                let selected = job.is_selected(frame_index);
                if selected {
                    let image = match &job.crop {
                        Some(region) => region.apply(&image),
                        None => image,
                    };
                    let path = job.output_path(frame_index);
                    if let Err(error) = utilities::write_jpeg(&image, &path, job.jpeg_quality) {
                        outcome = BatchOutcome::Failed(format!(
                            "could not write {}: {error}",
                            path.display()
                        ));
                        break;
                    }
                }

                last_frame = Some(frame_index);
                on_progress(&tracker.advance(frame_index, selected));
            }
            outcome
        }
    };

    let summary = BatchSummary::new(job, tracker.written(), last_frame, outcome);
    log::debug!(
        "Batch extraction {}: {}/{} frames written",
        summary.outcome,
        summary.written,
        summary.total,
    );
    summary
}

/// A batch job running on a background thread.
///
/// Dropping the handle cancels the job and waits for the thread.
#[derive(Debug)]
pub struct BatchHandle {
    token: CancellationToken,
    events: Receiver<BatchEvent>,
    thread: Option<JoinHandle<()>>,
    summary: Option<BatchSummary>,
    output_dir: PathBuf,
    total: u64,
}

impl BatchHandle {
    /// Start `job` on a new thread. The thread opens its own source with
    /// `opener` and releases it before posting the summary.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::IoError`] if the thread cannot be spawned.
    /// Failing to open the video is reported as a
    /// [`BatchOutcome::Failed`] summary instead.
    pub fn spawn<O: SourceOpener>(opener: Arc<O>, job: BatchJob) -> Result<Self, ScrubError> {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let (sender, events) = crossbeam_channel::unbounded();
        let output_dir = job.output_dir.clone();
        let total = job.total_selected();

        let thread = thread::Builder::new()
            .name("framescrub-batch".into())
            .spawn(move || extract(opener.as_ref(), &job, &worker_token, &sender))?;

        Ok(Self {
            token,
            events,
            thread: Some(thread),
            summary: None,
            output_dir,
            total,
        })
    }

    /// Ask the worker to stop after the current frame. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the thread. Idempotent.
    pub fn stop(&mut self) {
        self.token.cancel();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// Returns `true` once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Next pending event, without blocking.
    pub fn try_event(&mut self) -> Option<BatchEvent> {
        let event = self.events.try_recv().ok()?;
        if let BatchEvent::Completed(summary) = &event {
            self.summary = Some(summary.clone());
        }
        Some(event)
    }

    /// Forward every pending event to `sink`. Returns how many were
    /// delivered.
    pub fn dispatch(&mut self, sink: &mut dyn ProgressSink) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.try_event() {
            match &event {
                BatchEvent::Progress(info) => sink.on_progress(info),
                BatchEvent::Completed(summary) => sink.on_complete(summary),
            }
            delivered += 1;
        }
        delivered
    }

    /// Wait for the worker and return its summary. Pending progress events
    /// are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::DecoderUnavailable`] if the worker panicked
    /// before reporting.
    pub fn wait(&mut self) -> Result<BatchSummary, ScrubError> {
        if let Some(thread) = self.thread.take() {
            thread.join().map_err(|_| {
                ScrubError::DecoderUnavailable("batch worker panicked".to_string())
            })?;
        }
        while self.try_event().is_some() {}
        self.summary.clone().ok_or_else(|| {
            ScrubError::DecoderUnavailable("batch worker exited without a summary".to_string())
        })
    }

    /// Summary of the finished job, once its completion event was received.
    pub fn summary(&self) -> Option<&BatchSummary> {
        self.summary.as_ref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Frames the job writes if it runs to completion.
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl Drop for BatchHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker thread body: open, run, release, report.
fn extract<O: SourceOpener + ?Sized>(
    opener: &O,
    job: &BatchJob,
    token: &CancellationToken,
    sender: &Sender<BatchEvent>,
) {
    let summary = match opener.open(&job.video_path) {
        Ok(mut source) => run_batch(&mut source, job, token, |info| {
            let _ = sender.send(BatchEvent::Progress(info.clone()));
        }),
        Err(error) => {
            log::warn!(
                "Batch extraction could not open {}: {error}",
                job.video_path.display()
            );
            BatchSummary::new(job, 0, None, BatchOutcome::Failed(error.to_string()))
        }
    };
    let _ = sender.send(BatchEvent::Completed(summary));
}
