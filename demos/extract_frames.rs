//! Batch extraction example with progress reporting and cancellation.
//!
//! Usage:
//!   cargo run --example extract_frames -- <input_file> [start] [end] [step]

use std::{error::Error, sync::Arc, thread, time::Duration};

use framescrub::{
    BatchHandle, BatchRequest, BatchSummary, FfmpegOpener, FrameSource, ProgressInfo,
    ProgressSink, SourceOpener,
};

struct PrintProgress;

impl ProgressSink for PrintProgress {
    fn on_progress(&mut self, info: &ProgressInfo) {
        print!(
            "\rFrame {:>6}: {}/{} written",
            info.current_frame, info.written, info.total
        );
    }

    fn on_complete(&mut self, summary: &BatchSummary) {
        println!(
            "\nBatch {}: {} frames in {}",
            summary.outcome,
            summary.written,
            summary.output_dir.display()
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let start = args.next().unwrap_or_else(|| "00:00:00.00".to_string());
    let end = args.next().unwrap_or_else(|| "00:00:05.00".to_string());
    let step = args.next().unwrap_or_else(|| "5".to_string());

    let metadata = FfmpegOpener.open(input_path.as_ref())?.metadata().clone();
    println!(
        "{}: {}x{} @ {:.2} fps, {} frames",
        input_path, metadata.width, metadata.height, metadata.frames_per_second, metadata.frame_count
    );

    let job = BatchRequest::new(start, end)
        .with_frame_step(step)
        .validate(&metadata, input_path.as_ref(), "extracted".as_ref())?;
    println!("Writing {} frames to {}", job.total_selected(), job.output_dir.display());

    let mut handle = BatchHandle::spawn(Arc::new(FfmpegOpener), job)?;
    let mut sink = PrintProgress;
    loop {
        // Events are posted before the worker exits, so one more drain gets them all.
        let finished = handle.is_finished();
        handle.dispatch(&mut sink);
        if finished {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }

    Ok(())
}
