//! Decoded frames.

use image::RgbImage;

/// A decoded RGB image paired with its zero-based frame index.
///
/// Frames are moved, never shared: whoever dequeues or decodes a frame owns
/// it until it is replaced or dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Zero-based position of the frame within the video.
    pub index: u64,
    /// Tightly packed 8-bit RGB pixels.
    pub image: RgbImage,
}

impl Frame {
    /// Pair an image with its frame index.
    pub fn new(index: u64, image: RgbImage) -> Self {
        Self { index, image }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
