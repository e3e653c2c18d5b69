//! FFmpeg frame source integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::{path::Path, sync::Arc};

use framescrub::{
    BatchHandle, BatchOutcome, BatchRequest, FfmpegOpener, FfmpegSource, FrameBufferQueue,
    FrameSource, PlaybackProducer, ScrubError, SourceOpener,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn open_sample() -> Option<FfmpegSource> {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return None;
    }
    Some(FfmpegOpener.open(Path::new(path)).expect("Failed to open test video"))
}

// ── Opening ────────────────────────────────────────────────────────

#[test]
fn open_nonexistent_file() {
    let result = FfmpegSource::open("this_file_does_not_exist.mp4");
    let error = result.expect_err("Opening a missing file should fail");
    assert!(matches!(error, ScrubError::FileOpen { .. }));
    assert!(
        error.to_string().contains("Failed to open video file"),
        "Error message should mention file open failure: {error}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a video file")
        .expect("Failed to write invalid file");

    let result = FfmpegOpener.open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid video file");
}

#[test]
fn metadata_matches_fixture() {
    let Some(source) = open_sample() else {
        return;
    };
    let metadata = source.metadata();

    assert_eq!(metadata.width, 640);
    assert_eq!(metadata.height, 480);
    assert!((metadata.frames_per_second - 30.0).abs() < 0.01);
    assert!(
        (295..=305).contains(&metadata.frame_count),
        "Unexpected frame count {}",
        metadata.frame_count,
    );
    assert!((metadata.length_seconds() - 10.0).abs() < 0.2);
    assert_eq!(source.path(), Path::new(sample_video_path()));
}

// ── Seeking and reading ────────────────────────────────────────────

#[test]
fn read_at_returns_full_size_frames() {
    let Some(mut source) = open_sample() else {
        return;
    };

    for index in [0, 1, 75, 150, 299] {
        let image = source
            .read_at(index)
            .expect("Failed to read frame")
            .expect("Frame should exist");
        assert_eq!(image.dimensions(), (640, 480), "frame {index}");
    }
}

#[test]
fn seeking_is_frame_accurate() {
    let Some(mut source) = open_sample() else {
        return;
    };

    source.seek(100).expect("Failed to seek");
    let sequential = [
        source.read_next().expect("Read failed").expect("Frame 100 missing"),
        source.read_next().expect("Read failed").expect("Frame 101 missing"),
    ];

    let direct = source
        .read_at(101)
        .expect("Failed to read frame")
        .expect("Frame 101 missing");
    assert_eq!(direct, sequential[1]);
    assert_ne!(sequential[0], sequential[1]);

    // Seeking backwards lands on the same frame again.
    let again = source
        .read_at(100)
        .expect("Failed to read frame")
        .expect("Frame 100 missing");
    assert_eq!(again, sequential[0]);
}

#[test]
fn reading_past_the_end_returns_none() {
    let Some(mut source) = open_sample() else {
        return;
    };

    let beyond = source.metadata().frame_count + 100;
    assert!(source.read_at(beyond).expect("Read failed").is_none());
}

// ── Pipelines ──────────────────────────────────────────────────────

#[test]
fn producer_decodes_in_order_from_a_seek() {
    let Some(source) = open_sample() else {
        return;
    };

    let queue = FrameBufferQueue::new(8);
    let producer = PlaybackProducer::spawn(
        source,
        120,
        queue.clone(),
        std::time::Duration::from_millis(5),
    )
    .expect("Failed to spawn producer");

    let mut indices = Vec::new();
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while indices.len() < 20 && std::time::Instant::now() < deadline {
        match queue.try_take() {
            Some(frame) => indices.push(frame.index),
            None => std::thread::sleep(std::time::Duration::from_millis(1)),
        }
    }
    producer.stop().expect("Failed to stop producer");

    assert_eq!(indices, (120..140).collect::<Vec<_>>());
}

#[test]
fn batch_worker_extracts_from_a_real_video() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let source = FfmpegOpener.open(Path::new(path)).expect("Failed to open test video");

    let job = BatchRequest::new("00:00:01.00", "00:00:02.00")
        .with_frame_step("10")
        .with_crop_text(["0", "0", "320", "240"])
        .validate(source.metadata(), Path::new(path), output.path())
        .expect("Failed to validate batch request");
    drop(source);

    let mut handle = BatchHandle::spawn(Arc::new(FfmpegOpener), job.clone())
        .expect("Failed to spawn batch worker");
    let summary = handle.wait().expect("Failed to wait for batch worker");

    assert_eq!(summary.outcome, BatchOutcome::Completed);
    assert_eq!(summary.written, 4);
    for index in job.selected_frames() {
        let image = image::open(job.output_path(index))
            .expect("Failed to open extracted frame")
            .to_rgb8();
        assert_eq!(image.dimensions(), (320, 240));
    }
}
