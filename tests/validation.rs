//! Batch request validation integration tests.
//!
//! These run against synthetic metadata and need no fixtures.

mod common;

use std::path::Path;

use common::{SyntheticOpener, video_path};
use framescrub::{
    BatchJob, BatchRequest, CropRegion, FrameSource, ScrubError, ValidationReport,
};

fn validate(opener: &SyntheticOpener, request: &BatchRequest) -> Result<BatchJob, ScrubError> {
    request.validate(opener.source().metadata(), &video_path(), Path::new("frames"))
}

fn rejection(result: Result<BatchJob, ScrubError>) -> ValidationReport {
    match result {
        Err(ScrubError::InvalidInput(report)) => report,
        other => panic!("expected a validation failure, got {other:?}"),
    }
}

// ── Times ──────────────────────────────────────────────────────────

#[test]
fn frame_suffix_is_a_frame_number() {
    let opener = SyntheticOpener::new(250, 25.0);
    let job = validate(&opener, &BatchRequest::new("00:00:01.12", "00:00:02.24"))
        .expect("Failed to validate batch request");
    assert_eq!(job.start_frame, 37);
    assert_eq!(job.end_frame, 74);
    assert_eq!(job.total_selected(), 38);
}

#[test]
fn single_digit_hours_are_accepted() {
    let opener = SyntheticOpener::new(250, 25.0);
    let job = validate(&opener, &BatchRequest::new("0:00:01", "0:00:03.05"))
        .expect("Failed to validate batch request");
    assert_eq!((job.start_frame, job.end_frame), (25, 80));
}

#[test]
fn malformed_times_are_named() {
    let opener = SyntheticOpener::new(250, 25.0);
    let report = rejection(validate(&opener, &BatchRequest::new("1.5", "00:99:00")));

    assert_eq!(report.errors.len(), 2, "{report}");
    assert!(report.errors[0].starts_with("start time"), "{report}");
    assert!(report.errors[1].starts_with("end time"), "{report}");
}

#[test]
fn start_after_end_is_rejected() {
    let opener = SyntheticOpener::new(250, 25.0);
    let report = rejection(validate(&opener, &BatchRequest::new("00:00:05.00", "00:00:01.00")));
    assert_eq!(report.errors.len(), 1, "{report}");
    assert!(report.errors[0].contains("after"), "{report}");
}

#[test]
fn frame_suffix_past_the_second_cannot_invert_the_range() {
    // Frame 55 at 25 fps lands after frame 50.
    let opener = SyntheticOpener::new(250, 25.0);
    let report = rejection(validate(&opener, &BatchRequest::new("00:00:01.30", "00:00:02.00")));
    assert_eq!(report.errors.len(), 1, "{report}");
    assert!(report.errors[0].contains("after"), "{report}");
}

#[test]
fn single_frame_range_is_valid() {
    let opener = SyntheticOpener::new(250, 25.0);
    let job = validate(&opener, &BatchRequest::new("00:00:04.00", "00:00:04.00"))
        .expect("Failed to validate batch request");
    assert_eq!(job.total_selected(), 1);
    assert_eq!(job.selected_frames().collect::<Vec<_>>(), vec![100]);
}

// ── Step ───────────────────────────────────────────────────────────

#[test]
fn step_must_be_a_positive_whole_number() {
    let opener = SyntheticOpener::new(250, 25.0);
    for step in ["0", "-2", "2.5", "every"] {
        let report = rejection(validate(
            &opener,
            &BatchRequest::new("00:00:00.00", "00:00:01.00").with_frame_step(step),
        ));
        assert_eq!(report.errors.len(), 1, "step {step:?}: {report}");
        assert!(report.errors[0].contains("frame step"), "{report}");
    }
}

#[test]
fn step_larger_than_the_range_selects_the_start_only() {
    let opener = SyntheticOpener::new(250, 25.0);
    let job = validate(
        &opener,
        &BatchRequest::new("00:00:00.00", "00:00:01.00").with_frame_step("1000"),
    )
    .expect("Failed to validate batch request");
    assert_eq!(job.selected_frames().collect::<Vec<_>>(), vec![0]);
}

// ── Crop ───────────────────────────────────────────────────────────

#[test]
fn crop_text_is_parsed() {
    let opener = SyntheticOpener::new(250, 25.0).with_size(640, 360);
    let job = validate(
        &opener,
        &BatchRequest::new("00:00:00.00", "00:00:01.00").with_crop_text([" 10", "20", "330", "200 "]),
    )
    .expect("Failed to validate batch request");
    assert_eq!(job.crop, Some(CropRegion::new(10, 20, 330, 200)));
}

#[test]
fn crop_must_fit_the_frame() {
    let opener = SyntheticOpener::new(250, 25.0).with_size(640, 360);
    let report = rejection(validate(
        &opener,
        &BatchRequest::new("00:00:00.00", "00:00:01.00").with_crop(CropRegion::new(0, 0, 641, 361)),
    ));
    assert_eq!(report.errors.len(), 2, "{report}");
}

#[test]
fn full_frame_crop_is_valid() {
    let opener = SyntheticOpener::new(250, 25.0).with_size(640, 360);
    let job = validate(
        &opener,
        &BatchRequest::new("00:00:00.00", "00:00:01.00").with_crop(CropRegion::new(0, 0, 640, 360)),
    )
    .expect("Failed to validate batch request");
    assert!(job.crop.is_some());
}

#[test]
fn without_crop_clears_a_region() {
    let opener = SyntheticOpener::new(250, 25.0);
    let job = validate(
        &opener,
        &BatchRequest::new("00:00:00.00", "00:00:01.00")
            .with_crop_text(["x", "y", "z", "w"])
            .without_crop(),
    )
    .expect("Failed to validate batch request");
    assert_eq!(job.crop, None);
}

// ── Report ─────────────────────────────────────────────────────────

#[test]
fn report_display_lists_each_entry() {
    let report = ValidationReport {
        warnings: vec!["end time clamped".to_string()],
        errors: vec!["frame step must be at least 1 (got 0)".to_string()],
    };
    let text = report.to_string();
    assert!(text.contains("[WARN] end time clamped"));
    assert!(text.contains("[ERROR] frame step must be at least 1 (got 0)"));
    assert!(!report.is_valid());

    let empty = ValidationReport::default();
    assert!(empty.is_valid());
    assert_eq!(empty.to_string().trim(), "No issues found.");
}

#[test]
fn invalid_input_error_carries_the_report() {
    let opener = SyntheticOpener::new(250, 25.0);
    let error = validate(&opener, &BatchRequest::new("soon", "later"))
        .expect_err("Garbage times should be rejected");
    let message = error.to_string();
    assert!(message.starts_with("Invalid input:"), "{message}");
    assert!(message.contains("start time"), "{message}");
    assert!(message.contains("end time"), "{message}");
}
