//! FFmpeg-backed frame source.
//!
//! [`FfmpegSource`] wraps a demuxer, a video decoder and an RGB24 scaler
//! behind the [`FrameSource`] contract. Seeking lands on the nearest
//! keyframe before the target and decodes forward until the requested frame
//! is reached, so positioning is frame-accurate even for long GOPs.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{
    error::ScrubError,
    metadata::VideoMetadata,
    source::{FrameSource, SourceOpener},
};

/// Opens videos through FFmpeg.
///
/// # Example
///
/// ```no_run
/// use framescrub::{FfmpegOpener, FrameSource, SourceOpener};
///
/// let mut source = FfmpegOpener.open("input.mp4".as_ref())?;
/// if let Some(image) = source.read_at(100)? {
///     image.save("frame_100.png")?;
/// }
/// # Ok::<(), framescrub::ScrubError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegOpener;

impl SourceOpener for FfmpegOpener {
    type Source = FfmpegSource;

    fn open(&self, path: &Path) -> Result<FfmpegSource, ScrubError> {
        FfmpegSource::open(path)
    }
}

/// A video opened with FFmpeg, decoding to RGB24.
pub struct FfmpegSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    metadata: VideoMetadata,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    /// Frame located by the last seek, handed out by the next read.
    pending: Option<RgbImage>,
    eof_sent: bool,
    file_path: PathBuf,
}

// SAFETY: every FFmpeg context held here is exclusively owned by this value
// and only touched through `&mut self`. The playback producer moves a source
// to its thread and hands it back on join; it is never shared.
unsafe impl Send for FfmpegSource {}

impl Debug for FfmpegSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegSource")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl FfmpegSource {
    /// Open a video file and prepare its best video stream for decoding.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::FileOpen`] if FFmpeg cannot open the file or
    /// build a decoder, and [`ScrubError::NoVideoStream`] if it has no
    /// video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScrubError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video file: {}", file_path.display());

        let open_error = |reason: String| ScrubError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(ScrubError::NoVideoStream)?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| open_error(format!("Failed to read codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let width = decoder.width();
        let height = decoder.height();

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 && frame_rate.numerator() > 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        // Prefer the container's frame count; estimate from duration when
        // the container does not record one.
        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| open_error(format!("Failed to create scaler: {error}")))?;

        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count,
            duration,
            codec,
        };

        log::debug!(
            "Opened {}: {}x{} @ {:.3} fps, {} frames",
            file_path.display(),
            width,
            height,
            frames_per_second,
            frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            metadata,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            pending: None,
            eof_sent: false,
            file_path,
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Pull the next decoded frame into `decoded_frame`.
    ///
    /// Returns `Ok(false)` once the decoder is fully drained.
    fn decode_next(&mut self) -> Result<bool, ScrubError> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return Ok(true);
            }

            if self.eof_sent {
                return Ok(false);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    return Err(ScrubError::VideoDecodeError(format!(
                        "Failed to read packet: {error}"
                    )));
                }
            }
        }
    }

    /// Frame number of the frame currently held in `decoded_frame`.
    fn decoded_frame_number(&self) -> u64 {
        let pts = self
            .decoded_frame
            .timestamp()
            .or_else(|| self.decoded_frame.pts())
            .unwrap_or(0);
        crate::utilities::pts_to_frame_number(pts, self.time_base, &self.metadata)
    }

    /// Scale the current `decoded_frame` to RGB24 and copy it out.
    fn convert_decoded_frame(&mut self) -> Result<RgbImage, ScrubError> {
        self.scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;

        let width = self.metadata.width;
        let height = self.metadata.height;
        let buffer = crate::utilities::frame_to_rgb_buffer(&self.rgb_frame, width, height);
        RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            ScrubError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })
    }
}

impl FrameSource for FfmpegSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), ScrubError> {
        self.pending = None;

        let frames_per_second = self.metadata.effective_frame_rate();
        let target =
            crate::utilities::frame_number_to_seek_timestamp(frame_index, frames_per_second);
        self.input_context.seek(target, ..target)?;
        self.decoder.flush();
        self.eof_sent = false;

        // Decode forward from the keyframe until the target is reached.
        while self.decode_next()? {
            if self.decoded_frame_number() >= frame_index {
                let image = self.convert_decoded_frame()?;
                self.pending = Some(image);
                break;
            }
        }

        log::trace!("Seeked {} to frame {frame_index}", self.file_path.display());
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<RgbImage>, ScrubError> {
        if let Some(image) = self.pending.take() {
            return Ok(Some(image));
        }
        if !self.decode_next()? {
            return Ok(None);
        }
        self.convert_decoded_frame().map(Some)
    }
}
