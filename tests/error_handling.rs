//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

mod common;

use std::sync::Arc;

use common::{RecordingSink, SyntheticOpener, video_path};
use framescrub::{
    BatchHandle, BatchOutcome, BatchRequest, CancellationToken, FrameSource, PlaybackOptions,
    ScrubError, VideoSession, run_batch,
};

/// A plain file where a directory is expected, so directory creation fails.
fn blocking_file(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("not_a_directory");
    std::fs::write(&path, b"occupied").expect("Failed to write blocking file");
    path
}

#[test]
fn open_failure_names_the_path() {
    let opener = SyntheticOpener::new(10, 25.0);
    let result = VideoSession::open(
        &opener,
        std::path::Path::new("/videos/missing.mp4"),
        PlaybackOptions::new(),
    );
    let error = result.expect_err("Opening a missing file should fail");

    let message = error.to_string();
    assert!(
        message.contains("Failed to open video file") && message.contains("missing.mp4"),
        "Error message should name the file: {message}",
    );
}

#[test]
fn save_into_an_unwritable_location_is_an_io_error() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let opener = SyntheticOpener::new(10, 25.0);
    let mut session = VideoSession::new(video_path(), opener.source(), PlaybackOptions::new());
    let mut sink = RecordingSink::default();
    session.show_frame(3, &mut sink).expect("Show failed");

    let result = session.save_current_frame(&blocking_file(output.path()), 95);
    assert!(matches!(result, Err(ScrubError::IoError(_))), "{result:?}");
}

#[test]
fn batch_write_failure_is_reported_in_the_summary() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let opener = SyntheticOpener::new(50, 10.0);
    let job = BatchRequest::new("00:00:00.00", "00:00:01.00")
        .validate(
            opener.source().metadata(),
            &video_path(),
            &blocking_file(output.path()),
        )
        .expect("Failed to validate batch request");

    let summary = run_batch(&mut opener.source(), &job, &CancellationToken::new(), |_| {});
    let BatchOutcome::Failed(reason) = &summary.outcome else {
        panic!("expected a failed batch, got {}", summary.outcome);
    };
    assert!(reason.contains("could not write"), "{reason}");
    assert_eq!(summary.written, 0);
    assert_eq!(summary.last_frame, None);
}

#[test]
fn worker_open_failure_still_completes_once() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let opener = SyntheticOpener::new(50, 10.0);
    let mut job = BatchRequest::new("00:00:00.00", "00:00:01.00")
        .validate(opener.source().metadata(), &video_path(), output.path())
        .expect("Failed to validate batch request");
    job.video_path = "/videos/missing.mp4".into();

    let mut handle = BatchHandle::spawn(Arc::new(opener), job).expect("Failed to spawn worker");
    let summary = handle.wait().expect("Failed to wait for worker");
    let BatchOutcome::Failed(reason) = &summary.outcome else {
        panic!("expected a failed batch, got {}", summary.outcome);
    };
    assert!(reason.contains("missing.mp4"), "{reason}");
    assert!(handle.try_event().is_none());
}

#[test]
fn state_errors_have_readable_messages() {
    assert_eq!(ScrubError::NoVideoLoaded.to_string(), "No video is loaded");
    assert_eq!(
        ScrubError::NoFrameDisplayed.to_string(),
        "No frame has been displayed yet"
    );
    assert_eq!(
        ScrubError::BatchInProgress.to_string(),
        "A batch extraction is already in progress"
    );
    assert!(
        ScrubError::PlaybackActive
            .to_string()
            .contains("while playback is running")
    );
}

#[test]
fn io_errors_convert() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: ScrubError = io_error.into();
    assert!(matches!(error, ScrubError::IoError(_)));
    assert!(error.to_string().contains("denied"));
}

#[test]
fn ffmpeg_errors_convert() {
    let error: ScrubError = ffmpeg_next::Error::Eof.into();
    assert!(matches!(error, ScrubError::FfmpegError(_)));
    assert!(error.to_string().starts_with("FFmpeg error:"));
}
