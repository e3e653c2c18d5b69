//! A loaded video and its playback pipeline.
//!
//! [`VideoSession`] owns one [`FrameSource`] and coordinates three users of
//! it: the background [`PlaybackProducer`] while playing, direct
//! seek-and-read while paused or dragging, and the consumer side of the
//! [`FrameBufferQueue`] driven by [`tick`](VideoSession::tick).
//!
//! The source is either idle in the session or lent to the producer, never
//! both. Every operation that needs it for a direct read first stops the
//! producer and takes the source back.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Instant;
//!
//! use framescrub::{
//!     DisplaySink, FfmpegOpener, Frame, PlaybackOptions, TickOutcome, VideoSession,
//! };
//!
//! struct Print;
//! impl DisplaySink for Print {
//!     fn show(&mut self, frame: &Frame) {
//!         println!("frame {}", frame.index);
//!     }
//!     fn update_position_indicator(&mut self, _frame_index: u64) {}
//! }
//!
//! let mut session =
//!     VideoSession::open(&FfmpegOpener, "input.mp4".as_ref(), PlaybackOptions::new())?;
//! session.play()?;
//! loop {
//!     match session.poll(Instant::now(), &mut Print)? {
//!         TickOutcome::Finished(_) | TickOutcome::EndOfStream => break,
//!         _ => std::thread::sleep(std::time::Duration::from_millis(1)),
//!     }
//! }
//! # Ok::<(), framescrub::ScrubError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Instant,
};

use crate::{
    clock::PlaybackClock,
    config::PlaybackOptions,
    error::ScrubError,
    frame::Frame,
    metadata::VideoMetadata,
    producer::PlaybackProducer,
    queue::FrameBufferQueue,
    source::{FrameSource, SourceOpener},
    step::{StepDirection, StepSize},
    timecode::Timecode,
    utilities,
};

/// Receives frames chosen for display.
pub trait DisplaySink {
    /// Present a frame.
    fn show(&mut self, frame: &Frame);

    /// Move the position indicator (seek bar, labels) to `frame_index`.
    fn update_position_indicator(&mut self, frame_index: u64);
}

/// Where playback stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing is loaded.
    #[default]
    NoVideo,
    /// A video is loaded and the producer and clock are stopped.
    Paused,
    /// The producer is decoding and the clock is running.
    Playing,
}

impl Display for PlaybackState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            PlaybackState::NoVideo => "no video",
            PlaybackState::Paused => "paused",
            PlaybackState::Playing => "playing",
        })
    }
}

/// What a single consumer step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock deadline has not passed yet.
    NotDue,
    /// Playback is not running.
    Idle,
    /// The queue was empty. Nothing was shown and no frame was skipped.
    Empty,
    /// A frame was shown.
    Displayed(u64),
    /// The last frame was shown and playback paused.
    Finished(u64),
    /// The producer ran out of frames before the last index and the queue is
    /// drained. Playback paused.
    EndOfStream,
}

/// One opened video with its producer, queue and clock.
#[derive(Debug)]
pub struct VideoSession<S: FrameSource> {
    path: PathBuf,
    metadata: VideoMetadata,
    current_frame: u64,
    state: PlaybackState,
    dragging: bool,
    source: Option<S>,
    producer: Option<PlaybackProducer<S>>,
    queue: FrameBufferQueue,
    clock: PlaybackClock,
    last_frame: Option<Frame>,
    options: PlaybackOptions,
}

impl<S: FrameSource> VideoSession<S> {
    /// Open `path` with `opener` and wrap the source in a paused session.
    ///
    /// No frame is shown; call [`show_frame`](VideoSession::show_frame) to
    /// display the first one.
    ///
    /// # Errors
    ///
    /// Whatever the opener returns.
    pub fn open<O>(opener: &O, path: &Path, options: PlaybackOptions) -> Result<Self, ScrubError>
    where
        O: SourceOpener<Source = S>,
    {
        let source = opener.open(path)?;
        Ok(Self::new(path, source, options))
    }

    /// Wrap an already opened source.
    pub fn new(path: impl Into<PathBuf>, source: S, options: PlaybackOptions) -> Self {
        let metadata = source.metadata().clone();
        let clock = PlaybackClock::new(metadata.effective_frame_rate());
        log::debug!(
            "Session ready: {}x{} @ {:.3} fps, {} frames",
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
        );
        Self {
            path: path.into(),
            metadata,
            current_frame: 0,
            state: PlaybackState::Paused,
            dragging: false,
            source: Some(source),
            producer: None,
            queue: FrameBufferQueue::new(options.queue_capacity),
            clock,
            last_frame: None,
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Committed playhead position.
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Returns `true` between [`seek_press`](VideoSession::seek_press) and
    /// [`seek_release`](VideoSession::seek_release).
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// The frame most recently handed to a display sink.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// The buffer of the current (or most recent) playback run.
    pub fn queue(&self) -> &FrameBufferQueue {
        &self.queue
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Start index of the running producer, if any.
    pub fn producer_start_frame(&self) -> Option<u64> {
        self.producer.as_ref().map(PlaybackProducer::start_frame)
    }

    /// Position of the committed playhead as a timecode.
    pub fn current_timecode(&self) -> Timecode {
        Timecode::from_frame_index(self.current_frame, self.metadata.effective_frame_rate())
    }

    /// Length of the video as a timecode.
    pub fn duration_timecode(&self) -> Timecode {
        Timecode::from_seconds(
            self.metadata.length_seconds(),
            self.metadata.effective_frame_rate(),
        )
    }

    /// Start playback from the current frame. Does nothing while playing.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::DecoderUnavailable`] if the source was lost to a
    /// panicked producer.
    pub fn play(&mut self) -> Result<(), ScrubError> {
        if self.is_playing() {
            return Ok(());
        }
        self.start_playback(self.current_frame)
    }

    /// Stop the producer and the clock. Idempotent.
    pub fn pause(&mut self) -> Result<(), ScrubError> {
        self.halt()
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), ScrubError> {
        if self.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Run one consumer step if the clock is due at `now`.
    pub fn poll(
        &mut self,
        now: Instant,
        sink: &mut dyn DisplaySink,
    ) -> Result<TickOutcome, ScrubError> {
        if !self.is_playing() {
            return Ok(TickOutcome::Idle);
        }
        if !self.clock.poll(now) {
            return Ok(TickOutcome::NotDue);
        }
        self.tick(sink)
    }

    /// Take at most one frame from the queue and display it.
    ///
    /// The playhead follows the displayed frame unless the user is
    /// dragging. Showing the last frame, or finding the queue drained after
    /// the producer has exited, pauses playback.
    pub fn tick(&mut self, sink: &mut dyn DisplaySink) -> Result<TickOutcome, ScrubError> {
        if !self.is_playing() {
            return Ok(TickOutcome::Idle);
        }

        // Checked before taking so a frame queued just before exit is not lost.
        let producer_done = self
            .producer
            .as_ref()
            .is_none_or(PlaybackProducer::is_finished);

        let Some(frame) = self.queue.try_take() else {
            if producer_done {
                log::debug!("Playback reached end of stream at frame {}", self.current_frame);
                self.halt()?;
                return Ok(TickOutcome::EndOfStream);
            }
            return Ok(TickOutcome::Empty);
        };

        let index = frame.index;
        if !self.dragging {
            self.current_frame = self.metadata.clamp_frame(index);
            sink.update_position_indicator(self.current_frame);
        }
        sink.show(&frame);
        self.last_frame = Some(frame);

        if self
            .metadata
            .last_frame_index()
            .is_some_and(|last| index >= last)
        {
            self.halt()?;
            return Ok(TickOutcome::Finished(index));
        }
        Ok(TickOutcome::Displayed(index))
    }

    /// Pause and display `frame_index`, committing it as the playhead.
    pub fn show_frame(
        &mut self,
        frame_index: u64,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        self.halt()?;
        self.display_frame(self.metadata.clamp_frame(frame_index), true, sink)?;
        Ok(())
    }

    /// The user grabbed the seek bar: stop playback until release.
    pub fn seek_press(&mut self) -> Result<(), ScrubError> {
        self.dragging = true;
        self.halt()
    }

    /// Preview `frame_index` while dragging. The playhead does not move.
    /// Ignored when not dragging.
    pub fn seek_move(
        &mut self,
        frame_index: u64,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        if !self.dragging {
            return Ok(());
        }
        self.display_frame(self.metadata.clamp_frame(frame_index), false, sink)?;
        Ok(())
    }

    /// The user let go of the seek bar at `frame_index`: commit it, show it
    /// and resume playback from there.
    pub fn seek_release(
        &mut self,
        frame_index: u64,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        self.dragging = false;
        let target = self.metadata.clamp_frame(frame_index);
        self.halt()?;
        self.display_frame(target, true, sink)?;
        self.current_frame = target;
        self.start_playback(target)
    }

    /// Move the playhead by `step_size` and pause there.
    pub fn step(
        &mut self,
        direction: StepDirection,
        step_size: StepSize,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        let distance = step_size.frames(self.metadata.effective_frame_rate());
        let target = match direction {
            StepDirection::Backward => self.current_frame.saturating_sub(distance),
            StepDirection::Forward => self
                .metadata
                .clamp_frame(self.current_frame.saturating_add(distance)),
        };
        self.halt()?;
        self.display_frame(target, true, sink)?;
        Ok(())
    }

    pub fn rewind(
        &mut self,
        step_size: StepSize,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        self.step(StepDirection::Backward, step_size, sink)
    }

    pub fn forward(
        &mut self,
        step_size: StepSize,
        sink: &mut dyn DisplaySink,
    ) -> Result<(), ScrubError> {
        self.step(StepDirection::Forward, step_size, sink)
    }

    /// Write the displayed frame to
    /// `<output_root>/<stem>/<stem>_frame_<index>.jpg`.
    ///
    /// The index is the one of the displayed image, which differs from the
    /// playhead after an uncommitted drag preview.
    ///
    /// # Errors
    ///
    /// [`ScrubError::PlaybackActive`] while playing,
    /// [`ScrubError::NoFrameDisplayed`] before anything was shown, or the
    /// I/O or encoding failure.
    pub fn save_current_frame(
        &self,
        output_root: &Path,
        jpeg_quality: u8,
    ) -> Result<PathBuf, ScrubError> {
        if self.is_playing() {
            return Err(ScrubError::PlaybackActive);
        }
        let frame = self.last_frame.as_ref().ok_or(ScrubError::NoFrameDisplayed)?;

        let stem = utilities::video_stem(&self.path);
        let path = utilities::frame_file_path(&output_root.join(&stem), &stem, frame.index);
        utilities::write_jpeg(&frame.image, &path, jpeg_quality)?;

        log::info!("Frame saved to {}", path.display());
        Ok(path)
    }

    /// Seek the idle source, decode one frame and show it.
    ///
    /// Returns `false` (and shows nothing) if the source has no frame there.
    fn display_frame(
        &mut self,
        frame_index: u64,
        commit: bool,
        sink: &mut dyn DisplaySink,
    ) -> Result<bool, ScrubError> {
        let source = self.source.as_mut().ok_or_else(|| {
            ScrubError::DecoderUnavailable("the session's source was lost".to_string())
        })?;

        let Some(image) = source.read_at(frame_index)? else {
            log::warn!("No frame at index {frame_index}");
            return Ok(false);
        };

        let frame = Frame::new(frame_index, image);
        if commit {
            self.current_frame = frame_index;
            sink.update_position_indicator(frame_index);
        }
        sink.show(&frame);
        self.last_frame = Some(frame);
        Ok(true)
    }

    /// Start a fresh producer run at `start_frame` and the clock.
    fn start_playback(&mut self, start_frame: u64) -> Result<(), ScrubError> {
        self.halt()?;
        let source = self.source.take().ok_or_else(|| {
            ScrubError::DecoderUnavailable("the session's source was lost".to_string())
        })?;

        self.queue = FrameBufferQueue::new(self.options.queue_capacity);
        self.producer = Some(PlaybackProducer::spawn(
            source,
            start_frame,
            self.queue.clone(),
            self.options.backoff_interval,
        )?);
        self.clock.start(Instant::now());
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Stop the clock, join the producer and take the source back.
    fn halt(&mut self) -> Result<(), ScrubError> {
        self.clock.stop();
        self.state = PlaybackState::Paused;
        if let Some(producer) = self.producer.take() {
            self.source = Some(producer.stop()?);
        }
        self.queue.clear();
        Ok(())
    }
}
