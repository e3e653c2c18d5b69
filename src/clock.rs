//! Frame-interval timer for the playback consumer.
//!
//! [`PlaybackClock`] does not own a thread or a timer. The foreground loop
//! asks it whether a tick is due via [`poll`](PlaybackClock::poll), which
//! keeps every consumer action on the caller's thread.

use std::time::{Duration, Instant};

use crate::metadata::DEFAULT_FRAME_RATE;

/// Periodic deadline at the video's frame interval.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl PlaybackClock {
    /// Create a stopped clock ticking every `floor(1000 / frame_rate)` ms.
    ///
    /// Non-positive or non-finite rates fall back to 30 fps; the interval
    /// never drops below 1 ms.
    pub fn new(frame_rate: f64) -> Self {
        let frame_rate = if frame_rate.is_finite() && frame_rate > 0.0 {
            frame_rate
        } else {
            DEFAULT_FRAME_RATE
        };
        let millis = ((1000.0 / frame_rate) as u64).max(1);
        Self {
            interval: Duration::from_millis(millis),
            next_deadline: None,
        }
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking. The first tick is due one interval after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_deadline = Some(now + self.interval);
    }

    /// Stop ticking. Stopping a stopped clock does nothing.
    pub fn stop(&mut self) {
        self.next_deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_deadline.is_some()
    }

    /// Returns `true` if a tick is due at `now` and schedules the next one.
    ///
    /// Missed deadlines collapse into a single tick: the next deadline is
    /// one interval after `now`, not after the missed deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_deadline {
            Some(deadline) if now >= deadline => {
                self.next_deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// How long until the next tick, `None` when stopped.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
