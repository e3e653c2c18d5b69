//! Background playback producer.
//!
//! A [`PlaybackProducer`] takes the session's [`FrameSource`] by value, seeks
//! it once and decodes sequentially into a [`FrameBufferQueue`] on a
//! dedicated thread. The source comes back out of
//! [`stop`](PlaybackProducer::stop) once the thread has been joined, so the
//! session cannot touch its decoder while the producer still owns it.

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    error::ScrubError, frame::Frame, progress::CancellationToken, queue::FrameBufferQueue,
    source::FrameSource,
};

/// A running producer thread and its stop flag.
#[derive(Debug)]
pub struct PlaybackProducer<S: FrameSource> {
    token: CancellationToken,
    handle: Option<JoinHandle<S>>,
    start_frame: u64,
}

impl<S: FrameSource> PlaybackProducer<S> {
    /// Start decoding from `start_frame` into `queue`.
    ///
    /// While the queue is full the thread sleeps for `backoff` and then
    /// re-checks both the stop flag and the queue, so a stop request is
    /// observed within roughly one backoff interval.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::IoError`] if the thread cannot be spawned. The
    /// source is dropped in that case.
    pub fn spawn(
        source: S,
        start_frame: u64,
        queue: FrameBufferQueue,
        backoff: Duration,
    ) -> Result<Self, ScrubError> {
        let token = CancellationToken::new();
        let worker_token = token.clone();

        let handle = thread::Builder::new()
            .name("framescrub-producer".into())
            .spawn(move || produce(source, start_frame, &queue, &worker_token, backoff))?;

        log::debug!("Playback producer started at frame {start_frame}");

        Ok(Self {
            token,
            handle: Some(handle),
            start_frame,
        })
    }

    /// Frame the producer was started at.
    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// Ask the thread to exit without waiting for it. Idempotent.
    pub fn request_stop(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the decode loop has exited, whether through a stop
    /// request, end-of-stream or a decode failure.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the thread, wait for it, and take back the source.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::DecoderUnavailable`] if the thread panicked; the
    /// source is lost with it.
    pub fn stop(mut self) -> Result<S, ScrubError> {
        self.token.cancel();
        let handle = self.handle.take().ok_or_else(|| {
            ScrubError::DecoderUnavailable("playback producer already joined".to_string())
        })?;
        let source = handle.join().map_err(|_| {
            ScrubError::DecoderUnavailable("playback producer panicked".to_string())
        })?;
        log::debug!("Playback producer stopped");
        Ok(source)
    }
}

impl<S: FrameSource> Drop for PlaybackProducer<S> {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// The decode loop. Returns the source when it exits.
fn produce<S: FrameSource>(
    mut source: S,
    start_frame: u64,
    queue: &FrameBufferQueue,
    token: &CancellationToken,
    backoff: Duration,
) -> S {
    if let Err(error) = source.seek(start_frame) {
        log::warn!("Playback producer could not seek to frame {start_frame}: {error}");
        return source;
    }

    let mut next_index = start_frame;
    loop {
        if token.is_cancelled() {
            break;
        }
        if queue.is_full() {
            thread::sleep(backoff);
            continue;
        }

        match source.read_next() {
            Ok(Some(image)) => {
                // Single producer: a queue that was not full still has room.
                if queue.try_put(Frame::new(next_index, image)).is_err() {
                    log::warn!("Frame queue rejected frame {next_index}");
                    break;
                }
                next_index += 1;
            }
            Ok(None) => {
                log::debug!("Playback producer reached end of stream at frame {next_index}");
                break;
            }
            Err(error) => {
                log::warn!("Playback producer failed to decode frame {next_index}: {error}");
                break;
            }
        }
    }

    source
}
