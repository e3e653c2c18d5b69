//! Progress reporting and cancellation support.
//!
//! Background work never calls into the UI directly. The batch worker posts
//! [`ProgressInfo`] snapshots onto a channel and the foreground forwards them
//! to a [`ProgressSink`] when it drains the channel. Cancellation is
//! cooperative through a shared [`CancellationToken`], which also serves as
//! the playback producer's stop flag.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use crate::batch::BatchSummary;

/// A snapshot of batch extraction progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Frames written to disk so far.
    pub written: u64,
    /// Frames the job will write if it runs to completion.
    pub total: u64,
    /// Frames decoded so far, selected or not.
    pub processed: u64,
    /// Index of the frame just processed.
    pub current_frame: u64,
    /// Wall-clock time since the job started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
}

impl ProgressInfo {
    /// Completion percentage in `0.0..=100.0`, or `None` for an empty job.
    pub fn percentage(&self) -> Option<f32> {
        (self.total > 0).then(|| (self.written as f32 / self.total as f32) * 100.0)
    }
}

/// Receives batch progress on the foreground thread.
///
/// Sinks are infallible: they observe but cannot halt the job. Use
/// [`CancellationToken`] (or [`BatchHandle::cancel`](crate::BatchHandle::cancel))
/// to stop it.
pub trait ProgressSink {
    /// Called after every processed frame.
    fn on_progress(&mut self, info: &ProgressInfo);

    /// Called exactly once when the job ends, however it ends.
    fn on_complete(&mut self, summary: &BatchSummary);
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state; cancelling any clone is observed by all of them.
///
/// # Example
///
/// ```
/// use framescrub::CancellationToken;
///
/// let token = CancellationToken::new();
/// let worker_side = token.clone();
/// token.cancel();
/// assert!(worker_side.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Calling this more than once has no further
    /// effect.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks counts and timing for a batch job and builds snapshots.
pub(crate) struct ProgressTracker {
    total: u64,
    written: u64,
    processed: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(total: u64) -> Self {
        Self {
            total,
            written: 0,
            processed: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one decoded frame and return the snapshot to report.
    pub(crate) fn advance(&mut self, frame_index: u64, wrote: bool) -> ProgressInfo {
        self.processed += 1;
        if wrote {
            self.written += 1;
        }

        let elapsed = self.start_time.elapsed();
        let estimated_remaining = (self.written > 0).then(|| {
            let remaining = self.total.saturating_sub(self.written);
            elapsed.div_f64(self.written as f64).mul_f64(remaining as f64)
        });

        ProgressInfo {
            written: self.written,
            total: self.total,
            processed: self.processed,
            current_frame: frame_index,
            elapsed,
            estimated_remaining,
        }
    }

    pub(crate) fn written(&self) -> u64 {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_counts_written_and_processed_separately() {
        let mut tracker = ProgressTracker::new(2);
        let first = tracker.advance(0, true);
        let second = tracker.advance(1, false);
        assert_eq!((first.written, first.processed), (1, 1));
        assert_eq!((second.written, second.processed), (1, 2));
        assert_eq!(second.current_frame, 1);
        assert_eq!(tracker.written(), 1);
    }

    #[test]
    fn percentage_is_none_for_empty_job() {
        let mut tracker = ProgressTracker::new(0);
        assert_eq!(tracker.advance(0, false).percentage(), None);
    }

    #[test]
    fn percentage_tracks_written_frames() {
        let mut tracker = ProgressTracker::new(4);
        tracker.advance(0, true);
        let info = tracker.advance(1, true);
        assert_eq!(info.percentage(), Some(50.0));
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancellationToken::default();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
