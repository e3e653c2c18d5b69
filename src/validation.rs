//! Batch extraction input validation.
//!
//! [`BatchRequest::validate`](crate::BatchRequest::validate) checks raw user
//! input against the loaded video and either produces a [`BatchJob`] or a
//! [`ValidationReport`] listing every violated constraint at once, so a user
//! can fix all of them in one pass.
//!
//! # Example
//!
//! ```no_run
//! use framescrub::{BatchRequest, FfmpegOpener, FrameSource, ScrubError, SourceOpener};
//!
//! let source = FfmpegOpener.open("input.mp4".as_ref())?;
//! let request = BatchRequest::new("00:00:01.00", "00:00:00.00").with_frame_step("zero");
//! match request.validate(source.metadata(), "input.mp4".as_ref(), "frames".as_ref()) {
//!     Err(ScrubError::InvalidInput(report)) => {
//!         for error in &report.errors {
//!             println!("{error}");
//!         }
//!     }
//!     other => println!("{other:?}"),
//! }
//! # Ok::<(), ScrubError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use crate::{
    batch::{BatchJob, BatchRequest},
    config::DEFAULT_JPEG_QUALITY,
    crop::CropRegion,
    error::ScrubError,
    metadata::VideoMetadata,
    timecode::Timecode,
};

/// Summary of input validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Adjustments made to otherwise valid input (e.g. clamped times).
    pub warnings: Vec<String>,
    /// Violated constraints. Any entry here rejects the input.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.warnings.is_empty() && self.errors.is_empty() {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Validate a request and build the job it describes.
///
/// Called by [`BatchRequest::validate`](crate::BatchRequest::validate).
pub(crate) fn validate_batch_request(
    request: &BatchRequest,
    metadata: &VideoMetadata,
    video_path: &Path,
    output_dir: &Path,
) -> Result<BatchJob, ScrubError> {
    let mut report = ValidationReport::default();
    let frames_per_second = metadata.effective_frame_rate();

    let mut parse_time = |label: &str, text: &str| match text.parse::<Timecode>() {
        Ok(timecode) => Some(timecode),
        Err(error) => {
            report.errors.push(format!("{label} time: {error}"));
            None
        }
    };
    let start = parse_time("start", &request.start_time);
    let end = parse_time("end", &request.end_time);

    let frame_step = match request.frame_step.trim().parse::<i64>() {
        Ok(step) if step >= 1 => Some(step as u64),
        Ok(step) => {
            report
                .errors
                .push(format!("frame step must be at least 1 (got {step})"));
            None
        }
        Err(_) => {
            report.errors.push(format!(
                "frame step '{}' is not a whole number",
                request.frame_step.trim()
            ));
            None
        }
    };

    let crop = request
        .crop
        .as_ref()
        .and_then(|coordinates| parse_crop(coordinates, metadata, &mut report));

    let mut frames = None;
    if let (Some(start), Some(end)) = (start, end) {
        // Compare frame indices: a suffix such as `.30` at 25 fps spills
        // into the next second, so timecode order alone is not enough.
        let start_frame = start.to_frame_index(frames_per_second);
        let end_frame = end.to_frame_index(frames_per_second);
        if start_frame > end_frame {
            report
                .errors
                .push(format!("start time {start} is after end time {end}"));
        } else {
            let last = metadata.last_frame_index().unwrap_or(0);
            let mut clamp = |label: &str, timecode: Timecode, frame: u64| {
                if frame > last {
                    report.warnings.push(format!(
                        "{label} time {timecode} is past the last frame, clamped to frame {last}"
                    ));
                }
                frame.min(last)
            };
            frames = Some((clamp("start", start, start_frame), clamp("end", end, end_frame)));
        }
    }

    if !report.is_valid() {
        return Err(ScrubError::InvalidInput(report));
    }

    for warning in &report.warnings {
        log::warn!("{warning}");
    }

    match (frames, frame_step) {
        (Some((start_frame, end_frame)), Some(frame_step)) => Ok(BatchJob {
            video_path: video_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            start_frame,
            end_frame,
            frame_step,
            crop,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }),
        _ => Err(ScrubError::InvalidInput(report)),
    }
}

/// Parse the four crop coordinates and check them against the frame size.
fn parse_crop(
    coordinates: &[String; 4],
    metadata: &VideoMetadata,
    report: &mut ValidationReport,
) -> Option<CropRegion> {
    let names = ["x1", "y1", "x2", "y2"];
    let mut values = [0_u32; 4];
    let mut all_parsed = true;

    for ((name, text), value) in names.iter().zip(coordinates).zip(values.iter_mut()) {
        match text.trim().parse::<u32>() {
            Ok(parsed) => *value = parsed,
            Err(_) => {
                report.errors.push(format!(
                    "crop {name} '{}' is not a non-negative whole number",
                    text.trim()
                ));
                all_parsed = false;
            }
        }
    }

    if !all_parsed {
        return None;
    }

    let region = CropRegion::new(values[0], values[1], values[2], values[3]);
    let problems = region.violations(metadata.width, metadata.height);
    if problems.is_empty() {
        Some(region)
    } else {
        report.errors.extend(problems);
        None
    }
}
