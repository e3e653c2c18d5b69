//! The application-level controller.
//!
//! [`FrameScrubber`] is what UI events call into. It owns at most one
//! [`VideoSession`], the settings shared across sessions, and at most one
//! running [`BatchHandle`]. Playback operations on an empty scrubber are
//! no-ops rather than errors, matching buttons that stay clickable before a
//! video is loaded.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use crate::{
    batch::{BatchHandle, BatchRequest},
    config::ScrubberOptions,
    error::ScrubError,
    session::{DisplaySink, PlaybackState, TickOutcome, VideoSession},
    source::SourceOpener,
    step::{StepDirection, StepSize},
};

/// Owner of the active video session and batch job.
///
/// # Example
///
/// ```no_run
/// use framescrub::{DisplaySink, FfmpegOpener, Frame, FrameScrubber, ScrubberOptions};
///
/// struct Ignore;
/// impl DisplaySink for Ignore {
///     fn show(&mut self, _frame: &Frame) {}
///     fn update_position_indicator(&mut self, _frame_index: u64) {}
/// }
///
/// let mut scrubber = FrameScrubber::new(FfmpegOpener, ScrubberOptions::new());
/// scrubber.load("input.mp4", &mut Ignore)?;
/// scrubber.forward(&mut Ignore)?;
/// let saved = scrubber.save_frame()?;
/// println!("saved {}", saved.display());
/// # Ok::<(), framescrub::ScrubError>(())
/// ```
pub struct FrameScrubber<O: SourceOpener> {
    opener: Arc<O>,
    options: ScrubberOptions,
    session: Option<VideoSession<O::Source>>,
    batch: Option<BatchHandle>,
}

impl<O: SourceOpener> FrameScrubber<O> {
    pub fn new(opener: O, options: ScrubberOptions) -> Self {
        Self {
            opener: Arc::new(opener),
            options,
            session: None,
            batch: None,
        }
    }

    pub fn options(&self) -> &ScrubberOptions {
        &self.options
    }

    /// Replace the current video with `path` and show its first frame.
    ///
    /// The previous session is torn down first, so on failure nothing is
    /// loaded.
    ///
    /// # Errors
    ///
    /// Whatever the opener or the first decode returns.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        self.reset();
        let path = path.as_ref();
        log::debug!("Loading {}", path.display());

        let mut session =
            VideoSession::open(self.opener.as_ref(), path, self.options.playback.clone())?;
        session.show_frame(0, sink)?;
        self.session = Some(session);
        Ok(())
    }

    /// Drop the current session, stopping its producer and releasing its
    /// source. Idempotent. A running batch job is unaffected.
    pub fn reset(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(error) = session.pause() {
                log::warn!("Error while stopping playback: {error}");
            }
            log::debug!("Closed {}", session.path().display());
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map_or(PlaybackState::NoVideo, VideoSession::state)
    }

    pub fn session(&self) -> Option<&VideoSession<O::Source>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut VideoSession<O::Source>> {
        self.session.as_mut()
    }

    pub fn play(&mut self) -> Result<(), ScrubError> {
        self.with_session(VideoSession::play)
    }

    pub fn pause(&mut self) -> Result<(), ScrubError> {
        self.with_session(VideoSession::pause)
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), ScrubError> {
        self.with_session(VideoSession::toggle_play_pause)
    }

    /// See [`VideoSession::tick`]. [`TickOutcome::Idle`] with nothing loaded.
    pub fn tick(&mut self, sink: &mut dyn DisplaySink) -> Result<TickOutcome, ScrubError> {
        match self.session.as_mut() {
            Some(session) => session.tick(sink),
            None => Ok(TickOutcome::Idle),
        }
    }

    /// See [`VideoSession::poll`]. [`TickOutcome::Idle`] with nothing loaded.
    pub fn poll(
        &mut self,
        now: Instant,
        sink: &mut dyn DisplaySink,
    ) -> Result<TickOutcome, ScrubError> {
        match self.session.as_mut() {
            Some(session) => session.poll(now, sink),
            None => Ok(TickOutcome::Idle),
        }
    }

    pub fn seek_press(&mut self) -> Result<(), ScrubError> {
        self.with_session(VideoSession::seek_press)
    }

    pub fn seek_move(
        &mut self,
        frame_index: u64,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        self.with_session(|session| session.seek_move(frame_index, sink))
    }

    pub fn seek_release(
        &mut self,
        frame_index: u64,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        self.with_session(|session| session.seek_release(frame_index, sink))
    }

    /// Step back by the configured [`StepSize`].
    pub fn rewind(&mut self, sink: &mut dyn DisplaySink) -> Result<(), ScrubError> {
        let step_size = self.options.step_size;
        self.with_session(|session| session.step(StepDirection::Backward, step_size, sink))
    }

    /// Step forward by the configured [`StepSize`].
    pub fn forward(&mut self, sink: &mut dyn DisplaySink) -> Result<(), ScrubError> {
        let step_size = self.options.step_size;
        self.with_session(|session| session.step(StepDirection::Forward, step_size, sink))
    }

    pub fn set_step_size(&mut self, step_size: StepSize) {
        self.options.step_size = step_size;
    }

    pub fn step_size(&self) -> StepSize {
        self.options.step_size
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.options.output_dir = dir.into();
    }

    pub fn output_dir(&self) -> &Path {
        &self.options.output_dir
    }

    /// Save the displayed frame under the output directory.
    ///
    /// # Errors
    ///
    /// [`ScrubError::NoVideoLoaded`] with nothing loaded, otherwise see
    /// [`VideoSession::save_current_frame`].
    pub fn save_frame(&self) -> Result<PathBuf, ScrubError> {
        let session = self.session.as_ref().ok_or(ScrubError::NoVideoLoaded)?;
        session.save_current_frame(&self.options.output_dir, self.options.jpeg_quality)
    }

    /// Batch input prefilled from the loaded video.
    ///
    /// # Errors
    ///
    /// [`ScrubError::NoVideoLoaded`] with nothing loaded.
    pub fn batch_request(&self) -> Result<BatchRequest, ScrubError> {
        let session = self.session.as_ref().ok_or(ScrubError::NoVideoLoaded)?;
        Ok(BatchRequest::defaults_for(
            session.metadata(),
            session.current_frame(),
        ))
    }

    /// Validate `request` and start it in the background.
    ///
    /// # Errors
    ///
    /// [`ScrubError::NoVideoLoaded`], [`ScrubError::BatchInProgress`] while
    /// a previous job is still running, or [`ScrubError::InvalidInput`].
    pub fn start_batch(&mut self, request: &BatchRequest) -> Result<&mut BatchHandle, ScrubError> {
        let session = self.session.as_ref().ok_or(ScrubError::NoVideoLoaded)?;
        if self.batch.as_ref().is_some_and(|batch| !batch.is_finished()) {
            return Err(ScrubError::BatchInProgress);
        }

        let job = request
            .validate(session.metadata(), session.path(), &self.options.output_dir)?
            .with_jpeg_quality(self.options.jpeg_quality);
        log::debug!("Batch extraction started");

        let handle = BatchHandle::spawn(Arc::clone(&self.opener), job)?;
        Ok(self.batch.insert(handle))
    }

    /// The current or most recent batch job.
    pub fn batch(&self) -> Option<&BatchHandle> {
        self.batch.as_ref()
    }

    pub fn batch_mut(&mut self) -> Option<&mut BatchHandle> {
        self.batch.as_mut()
    }

    /// Cancel the batch job and wait for it. Idempotent.
    pub fn cancel_batch(&mut self) {
        if let Some(batch) = self.batch.as_mut() {
            batch.stop();
        }
    }

    fn with_session<F>(&mut self, operation: F) -> Result<(), ScrubError>
    where
        F: FnOnce(&mut VideoSession<O::Source>) -> Result<(), ScrubError>,
    {
        match self.session.as_mut() {
            Some(session) => operation(session),
            None => Ok(()),
        }
    }
}

impl<O: SourceOpener> Drop for FrameScrubber<O> {
    fn drop(&mut self) {
        self.reset();
        self.cancel_batch();
    }
}
