//! Rectangular regions of interest applied to extracted frames.

use std::fmt::{Display, Formatter, Result as FmtResult};

use image::{RgbImage, imageops};

/// A crop rectangle in pixel coordinates, `x1..x2` by `y1..y2`.
///
/// The right and bottom edges are exclusive, so the cropped image is
/// `(x2 - x1) × (y2 - y1)` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRegion {
    /// Left edge (inclusive).
    pub x1: u32,
    /// Top edge (inclusive).
    pub y1: u32,
    /// Right edge (exclusive).
    pub x2: u32,
    /// Bottom edge (exclusive).
    pub y2: u32,
}

impl CropRegion {
    /// Create a region from its four edges. No validation is performed; see
    /// [`violations`](CropRegion::violations).
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width of the region, zero if inverted.
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    /// Height of the region, zero if inverted.
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Every way this region fails to fit a `frame_width × frame_height`
    /// frame. Empty when the region is usable.
    pub fn violations(&self, frame_width: u32, frame_height: u32) -> Vec<String> {
        let mut problems = Vec::new();
        if self.x1 >= self.x2 {
            problems.push(format!("crop x1 ({}) must be less than x2 ({})", self.x1, self.x2));
        }
        if self.y1 >= self.y2 {
            problems.push(format!("crop y1 ({}) must be less than y2 ({})", self.y1, self.y2));
        }
        if self.x2 > frame_width {
            problems.push(format!(
                "crop x2 ({}) exceeds the frame width ({frame_width})",
                self.x2
            ));
        }
        if self.y2 > frame_height {
            problems.push(format!(
                "crop y2 ({}) exceeds the frame height ({frame_height})",
                self.y2
            ));
        }
        problems
    }

    /// Returns `true` if the region lies inside a frame of the given size.
    pub fn fits(&self, frame_width: u32, frame_height: u32) -> bool {
        self.violations(frame_width, frame_height).is_empty()
    }

    /// Copy the region out of `image`. Parts outside the image are clipped.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        imageops::crop_imm(image, self.x1, self.y1, self.width(), self.height()).to_image()
    }
}

impl Display for CropRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    #[test]
    fn inverted_region_is_rejected() {
        let region = CropRegion::new(10, 10, 5, 20);
        let problems = region.violations(640, 360);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("x1"));
        assert!(!region.fits(640, 360));
    }

    #[test]
    fn every_violation_is_reported() {
        let region = CropRegion::new(700, 400, 650, 380);
        assert_eq!(region.violations(640, 360).len(), 4);
    }

    #[test]
    fn region_touching_frame_edge_fits() {
        assert!(CropRegion::new(0, 0, 640, 360).fits(640, 360));
    }

    #[test]
    fn apply_copies_the_requested_pixels() {
        let image = RgbImage::from_fn(8, 8, |x, y| Rgb([x as u8, y as u8, 0]));
        let cropped = CropRegion::new(2, 3, 6, 5).apply(&image);
        assert_eq!(cropped.dimensions(), (4, 2));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([2, 3, 0]));
        assert_eq!(cropped.get_pixel(3, 1), &Rgb([5, 4, 0]));
    }
}
