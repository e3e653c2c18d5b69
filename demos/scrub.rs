//! Scrubbing example: play, step, drag and save a frame.
//!
//! Usage:
//!   cargo run --example scrub -- <input_file>

use std::{
    error::Error,
    thread,
    time::{Duration, Instant},
};

use framescrub::{
    DisplaySink, FfmpegOpener, Frame, FrameScrubber, ScrubberOptions, StepSize, TickOutcome,
};

/// Prints what would be drawn.
struct Console {
    shown: u64,
}

impl DisplaySink for Console {
    fn show(&mut self, frame: &Frame) {
        self.shown += 1;
        print!("\rShowing frame {:>6} ({}x{})", frame.index, frame.width(), frame.height());
    }

    fn update_position_indicator(&mut self, _frame_index: u64) {}
}

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "input.mp4".to_string());

    let options = ScrubberOptions::new().with_output_dir("scrub_output");
    let mut scrubber = FrameScrubber::new(FfmpegOpener, options);
    let mut console = Console { shown: 0 };

    println!("Opening {input_path}...");
    scrubber.load(&input_path, &mut console)?;
    println!();

    // --- Two seconds of playback ----------------------------------------------
    scrubber.play()?;
    let until = Instant::now() + Duration::from_secs(2);
    while Instant::now() < until {
        match scrubber.poll(Instant::now(), &mut console)? {
            TickOutcome::Finished(_) | TickOutcome::EndOfStream => break,
            _ => thread::sleep(Duration::from_millis(1)),
        }
    }
    scrubber.pause()?;
    println!();

    // --- Stepping -------------------------------------------------------------
    scrubber.set_step_size(StepSize::HalfSecond);
    scrubber.rewind(&mut console)?;
    scrubber.set_step_size(StepSize::OneFrame);
    scrubber.forward(&mut console)?;
    println!();

    // --- Drag preview, then save ----------------------------------------------
    scrubber.seek_press()?;
    scrubber.seek_move(10, &mut console)?;
    let saved = scrubber.save_frame()?;
    println!("\nSaved {}", saved.display());

    println!("Displayed {} frames. Done!", console.shown);
    Ok(())
}
