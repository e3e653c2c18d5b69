//! Bounded frame buffer between the playback producer and the consumer.
//!
//! [`FrameBufferQueue`] is a FIFO of decoded [`Frame`]s backed by a bounded
//! [`crossbeam_channel`]. Neither side ever blocks: the producer polls
//! [`is_full`](FrameBufferQueue::is_full) and backs off so it keeps observing
//! its stop flag, and the consumer takes at most one frame per clock tick.
//!
//! # Example
//!
//! ```
//! use framescrub::{Frame, FrameBufferQueue};
//! use image::RgbImage;
//!
//! let queue = FrameBufferQueue::new(2);
//! assert!(queue.try_put(Frame::new(0, RgbImage::new(4, 4))).is_ok());
//! assert!(queue.try_put(Frame::new(1, RgbImage::new(4, 4))).is_ok());
//! assert!(queue.try_put(Frame::new(2, RgbImage::new(4, 4))).is_err());
//!
//! assert_eq!(queue.try_take().map(|frame| frame.index), Some(0));
//! ```

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::frame::Frame;

/// Default number of frames buffered ahead of the consumer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 30;

/// A bounded, thread-safe FIFO of decoded frames.
///
/// Cloning the queue yields another handle to the same buffer; the session
/// keeps one handle and lends a clone to the producer thread.
#[derive(Debug, Clone)]
pub struct FrameBufferQueue {
    sender: Sender<Frame>,
    receiver: Receiver<Frame>,
    capacity: usize,
}

impl FrameBufferQueue {
    /// Create an empty queue holding at most `capacity` frames.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Enqueue a frame without blocking.
    ///
    /// # Errors
    ///
    /// Hands the frame back when the queue is at capacity.
    pub fn try_put(&self, frame: Frame) -> Result<(), Frame> {
        self.sender.try_send(frame).map_err(|error| match error {
            TrySendError::Full(frame) | TrySendError::Disconnected(frame) => frame,
        })
    }

    /// Dequeue the oldest frame, or `None` if the queue is empty.
    pub fn try_take(&self) -> Option<Frame> {
        self.receiver.try_recv().ok()
    }

    /// Drop every buffered frame.
    pub fn clear(&self) {
        while self.receiver.try_recv().is_ok() {}
    }

    /// Number of frames currently buffered.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no frames are buffered.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Returns `true` if the queue is at capacity.
    pub fn is_full(&self) -> bool {
        self.sender.is_full()
    }

    /// Maximum number of buffered frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for FrameBufferQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
