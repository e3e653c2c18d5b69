//! Synthetic frame sources shared by the integration tests.
//!
//! Every pixel of synthetic frame `n` has the value `n % 256`, so a test can
//! tell which frame it is looking at from the image alone.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use framescrub::{
    DisplaySink, Frame, FrameSource, ScrubError, SourceOpener, VideoMetadata,
};
use image::{Rgb, RgbImage};

/// A decoder that fabricates frames on demand.
#[derive(Debug)]
pub struct SyntheticSource {
    metadata: VideoMetadata,
    available: u64,
    position: u64,
    decode_delay: Duration,
    fail_at: Option<u64>,
}

impl FrameSource for SyntheticSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), ScrubError> {
        self.position = frame_index;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<RgbImage>, ScrubError> {
        if !self.decode_delay.is_zero() {
            thread::sleep(self.decode_delay);
        }
        if self.fail_at == Some(self.position) {
            return Err(ScrubError::VideoDecodeError(format!(
                "synthetic failure at frame {}",
                self.position
            )));
        }
        if self.position >= self.available {
            return Ok(None);
        }
        let image = synthetic_image(self.metadata.width, self.metadata.height, self.position);
        self.position += 1;
        Ok(Some(image))
    }
}

/// Opens [`SyntheticSource`]s. Paths containing `missing` fail to open.
#[derive(Debug, Clone)]
pub struct SyntheticOpener {
    pub width: u32,
    pub height: u32,
    pub frames_per_second: f64,
    pub frame_count: u64,
    /// Frames actually decodable. Defaults to `frame_count`.
    pub available: u64,
    pub decode_delay: Duration,
    pub fail_at: Option<u64>,
}

impl SyntheticOpener {
    pub fn new(frame_count: u64, frames_per_second: f64) -> Self {
        Self {
            width: 64,
            height: 48,
            frames_per_second,
            frame_count,
            available: frame_count,
            decode_delay: Duration::ZERO,
            fail_at: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_available(mut self, available: u64) -> Self {
        self.available = available;
        self
    }

    pub fn with_decode_delay(mut self, delay: Duration) -> Self {
        self.decode_delay = delay;
        self
    }

    pub fn with_failure_at(mut self, frame_index: u64) -> Self {
        self.fail_at = Some(frame_index);
        self
    }

    pub fn source(&self) -> SyntheticSource {
        SyntheticSource {
            metadata: VideoMetadata {
                width: self.width,
                height: self.height,
                frames_per_second: self.frames_per_second,
                frame_count: self.frame_count,
                duration: Duration::from_secs_f64(
                    self.frame_count as f64 / self.frames_per_second,
                ),
                codec: "synthetic".to_string(),
            },
            available: self.available,
            position: 0,
            decode_delay: self.decode_delay,
            fail_at: self.fail_at,
        }
    }
}

impl SourceOpener for SyntheticOpener {
    type Source = SyntheticSource;

    fn open(&self, path: &Path) -> Result<SyntheticSource, ScrubError> {
        if path.to_string_lossy().contains("missing") {
            return Err(ScrubError::FileOpen {
                path: path.to_path_buf(),
                reason: "No such file or directory".to_string(),
            });
        }
        Ok(self.source())
    }
}

pub fn synthetic_image(width: u32, height: u32, frame_index: u64) -> RgbImage {
    let value = (frame_index % 256) as u8;
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// Value of the top-left pixel's red channel.
pub fn frame_value(image: &RgbImage) -> u8 {
    image.get_pixel(0, 0)[0]
}

/// Records everything a session shows.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub shown: Vec<u64>,
    pub shown_values: Vec<u8>,
    pub positions: Vec<u64>,
}

impl DisplaySink for RecordingSink {
    fn show(&mut self, frame: &Frame) {
        self.shown.push(frame.index);
        self.shown_values.push(frame_value(&frame.image));
    }

    fn update_position_indicator(&mut self, frame_index: u64) {
        self.positions.push(frame_index);
    }
}

pub fn video_path() -> PathBuf {
    PathBuf::from("/videos/clip.mp4")
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
