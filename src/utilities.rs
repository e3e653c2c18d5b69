//! Internal utility functions.
//!
//! Helpers for pixel-data copying, frame/timestamp conversion, and output
//! file naming that do not belong in any single public module.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use ffmpeg_next::{Rational, frame::Video as VideoFrame};
use image::{RgbImage, codecs::jpeg::JpegEncoder};

use crate::{error::ScrubError, metadata::VideoMetadata};

/// Copy pixel data from an FFmpeg RGB24 frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3).
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Rescale a PTS value to a frame number at the stream's effective rate.
pub(crate) fn pts_to_frame_number(pts: i64, time_base: Rational, metadata: &VideoMetadata) -> u64 {
    let seconds =
        pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    (seconds * metadata.effective_frame_rate()).max(0.0) as u64
}

/// Convert a frame number to a container seek timestamp in AV_TIME_BASE
/// (microseconds), as expected by `Input::seek` with no stream selected.
pub(crate) fn frame_number_to_seek_timestamp(frame_number: u64, frames_per_second: f64) -> i64 {
    let seconds = frame_number as f64 / frames_per_second;
    (seconds * 1_000_000.0) as i64
}

/// File stem of a video path, used to name output files.
pub(crate) fn video_stem(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}

/// `<dir>/<stem>_frame_<index>.jpg`
pub(crate) fn frame_file_path(dir: &Path, stem: &str, frame_index: u64) -> PathBuf {
    dir.join(format!("{stem}_frame_{frame_index}.jpg"))
}

/// Encode an RGB image as JPEG, creating the parent directory if needed.
pub(crate) fn write_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), ScrubError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);
    encoder.encode_image(image)?;
    Ok(())
}
