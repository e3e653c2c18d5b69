use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framescrub::{
    BatchHandle, BatchOutcome, BatchRequest, BatchSummary, DisplaySink, FfmpegLogLevel,
    FfmpegOpener, Frame, FrameScrubber, FrameSource, PlaybackOptions, ProgressInfo, ProgressSink,
    ScrubberOptions, SourceOpener, TickOutcome, Timecode, VideoMetadata,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framescrub info input.mp4 --json\n  framescrub extract input.mp4 --out frames --start 00:00:10 --end 00:00:20 --step 5\n  framescrub extract input.mp4 --out frames --crop 0,0,320,240\n  framescrub save-frame input.mp4 --time 00:01:05.12 --out frames\n  framescrub play input.mp4 --from 00:00:30 --seconds 5\n  framescrub completions zsh > _framescrub";

#[derive(Debug, Parser)]
#[command(
    name = "framescrub",
    version,
    about = "Scrub through videos frame by frame and extract frames as JPEG",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Rust log filter (error, warn, info, debug, trace or an env_logger filter).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    ffmpeg_log_level: Option<String>,

    /// Frames buffered ahead of playback.
    #[arg(long, global = true)]
    queue_capacity: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print video metadata.
    #[command(
        about = "Print video metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  framescrub info input.mp4\n  framescrub info input.mp4 --json"
    )]
    Info {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract every Nth frame of a time range, optionally cropped.
    #[command(
        about = "Batch extract frames",
        after_help = "Frames are written to <out>/<video name>/batch_extract/<video name>_frame_<index>.jpg.\n\nExamples:\n  framescrub extract input.mp4 --out frames --step 10\n  framescrub extract input.mp4 --out frames --start 0:00:10 --end 0:00:20.12 --crop 100,50,740,410"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Output root directory.
        #[arg(long)]
        out: PathBuf,
        /// Start time, HH:MM:SS[.ff]. Defaults to the first frame.
        #[arg(long)]
        start: Option<String>,
        /// End time (inclusive), HH:MM:SS[.ff]. Defaults to the end of the video.
        #[arg(long)]
        end: Option<String>,
        /// Write every Nth frame.
        #[arg(long, default_value = "1")]
        step: String,
        /// Crop region as x1,y1,x2,y2.
        #[arg(long)]
        crop: Option<String>,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = framescrub::DEFAULT_JPEG_QUALITY)]
        quality: u8,
    },

    /// Save a single frame as JPEG.
    #[command(
        about = "Save a single frame",
        after_help = "The frame is written to <out>/<video name>/<video name>_frame_<index>.jpg.\n\nExamples:\n  framescrub save-frame input.mp4 --frame 120 --out frames\n  framescrub save-frame input.mp4 --time 00:00:04.20 --out frames"
    )]
    SaveFrame {
        /// Input video path.
        input: PathBuf,
        /// Frame index.
        #[arg(long, conflicts_with = "time", required_unless_present = "time")]
        frame: Option<u64>,
        /// Time, HH:MM:SS[.ff].
        #[arg(long)]
        time: Option<String>,
        /// Output root directory.
        #[arg(long)]
        out: PathBuf,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = framescrub::DEFAULT_JPEG_QUALITY)]
        quality: u8,
    },

    /// Play a video headlessly at its native frame rate.
    #[command(
        about = "Play without a display, reporting positions",
        after_help = "Examples:\n  framescrub play input.mp4\n  framescrub play input.mp4 --from 00:01:00 --seconds 10 --verbose"
    )]
    Play {
        /// Input video path.
        input: PathBuf,
        /// Start time, HH:MM:SS[.ff].
        #[arg(long)]
        from: Option<String>,
        /// Stop after this many seconds. Plays to the end when omitted.
        #[arg(long)]
        seconds: Option<f64>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = match (&global.log_level, global.verbose) {
        (Some(level), _) => level.clone(),
        (None, true) => "debug".to_string(),
        (None, false) => "warn".to_string(),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let level = match &global.ffmpeg_log_level {
        Some(level) => level
            .parse::<FfmpegLogLevel>()
            .map_err(|error| format!("unsupported --ffmpeg-log-level: {error}"))?,
        None if global.verbose => FfmpegLogLevel::Warning,
        None => FfmpegLogLevel::Error,
    };
    framescrub::set_ffmpeg_log_level(level);
    Ok(())
}

fn playback_options(global: &GlobalOptions) -> PlaybackOptions {
    let options = PlaybackOptions::new();
    match global.queue_capacity {
        Some(capacity) => options.with_queue_capacity(capacity),
        None => options,
    }
}

fn parse_crop(value: &str) -> Result<[String; 4], Box<dyn std::error::Error>> {
    let parts: Vec<String> = value.split(',').map(|part| part.trim().to_string()).collect();
    <[String; 4]>::try_from(parts)
        .map_err(|_| format!("--crop expects x1,y1,x2,y2 (got {value})").into())
}

/// Frame index for a `--frame`/`--time` pair.
fn resolve_frame(
    frame: Option<u64>,
    time: Option<&str>,
    frames_per_second: f64,
) -> Result<u64, Box<dyn std::error::Error>> {
    match (frame, time) {
        (Some(frame), _) => Ok(frame),
        (None, Some(time)) => Ok(time.parse::<Timecode>()?.to_frame_index(frames_per_second)),
        (None, None) => Ok(0),
    }
}

/// Sink for commands that never show frames.
struct Headless {
    verbose: bool,
    frames_per_second: f64,
}

impl DisplaySink for Headless {
    fn show(&mut self, _frame: &Frame) {}

    fn update_position_indicator(&mut self, frame_index: u64) {
        if self.verbose {
            eprintln!(
                "{} frame {frame_index} ({})",
                "position".cyan().bold(),
                Timecode::from_frame_index(frame_index, self.frames_per_second),
            );
        }
    }
}

/// Drives an indicatif bar from batch events.
struct TerminalProgress {
    bar: ProgressBar,
    summary: Option<BatchSummary>,
}

impl TerminalProgress {
    fn new(total: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} frame {msg} ({eta})",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar, summary: None })
    }
}

impl ProgressSink for TerminalProgress {
    fn on_progress(&mut self, info: &ProgressInfo) {
        self.bar.set_position(info.written);
        self.bar.set_message(info.current_frame.to_string());
    }

    fn on_complete(&mut self, summary: &BatchSummary) {
        self.bar.finish_with_message(summary.outcome.to_string());
        self.summary = Some(summary.clone());
    }
}

fn run_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = FfmpegOpener.open(input)?;
    let metadata = source.metadata();
    let frames_per_second = metadata.effective_frame_rate();
    let length = Timecode::from_seconds(metadata.length_seconds(), frames_per_second);

    if json {
        let payload = json!({
            "path": input.display().to_string(),
            "width": metadata.width,
            "height": metadata.height,
            "fps": metadata.frames_per_second,
            "frame_count": metadata.frame_count,
            "duration_seconds": metadata.duration.as_secs_f64(),
            "length": length.to_string(),
            "codec": metadata.codec,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("File: {}", input.display());
        println!(
            "Video: {}x{} @ {:.3} fps [{}]",
            metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
        );
        println!("Frames: {}", metadata.frame_count);
        println!("Length: {length}");
    }
    Ok(())
}

fn run_extract(
    input: &Path,
    out: &Path,
    metadata: &VideoMetadata,
    request: BatchRequest,
    quality: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let job = request
        .validate(metadata, input, out)?
        .with_jpeg_quality(quality);

    let mut progress = TerminalProgress::new(job.total_selected())?;
    let mut handle = BatchHandle::spawn(Arc::new(FfmpegOpener), job)?;

    while progress.summary.is_none() {
        if handle.dispatch(&mut progress) == 0 {
            if handle.is_finished() {
                // Drain anything posted between the last dispatch and exit.
                handle.dispatch(&mut progress);
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
    }

    let summary = match progress.summary {
        Some(summary) => summary,
        None => handle.wait()?,
    };

    match &summary.outcome {
        BatchOutcome::Completed | BatchOutcome::EndOfStream => {
            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Extracted {}/{} frame(s) to {}",
                    summary.written,
                    summary.total,
                    summary.output_dir.display()
                )
                .green()
            );
            if summary.outcome == BatchOutcome::EndOfStream {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "the video ended before the requested end time".yellow()
                );
            }
            Ok(())
        }
        BatchOutcome::Cancelled => Err("extraction was cancelled".into()),
        BatchOutcome::Failed(reason) => Err(format!("extraction failed: {reason}").into()),
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Info { input, json } => run_info(&input, json)?,
        Commands::Extract {
            input,
            out,
            start,
            end,
            step,
            crop,
            quality,
        } => {
            let metadata = FfmpegOpener.open(&input)?.metadata().clone();
            let defaults = BatchRequest::defaults_for(&metadata, 0);
            let mut request = BatchRequest::new(
                start.unwrap_or(defaults.start_time),
                end.unwrap_or(defaults.end_time),
            )
            .with_frame_step(step);
            if let Some(crop) = crop {
                request = request.with_crop_text(parse_crop(&crop)?);
            }
            run_extract(&input, &out, &metadata, request, quality)?;
        }
        Commands::SaveFrame {
            input,
            frame,
            time,
            out,
            quality,
        } => {
            let options = ScrubberOptions::new()
                .with_playback(playback_options(&cli.global))
                .with_output_dir(out)
                .with_jpeg_quality(quality);
            let mut scrubber = FrameScrubber::new(FfmpegOpener, options);
            let mut sink = Headless {
                verbose: cli.global.verbose,
                frames_per_second: 0.0,
            };
            scrubber.load(&input, &mut sink)?;

            let session = scrubber.session_mut().ok_or("no video loaded")?;
            let frames_per_second = session.metadata().effective_frame_rate();
            sink.frames_per_second = frames_per_second;
            let target = resolve_frame(frame, time.as_deref(), frames_per_second)?;
            let target = session.metadata().clamp_frame(target);
            session.show_frame(target, &mut sink)?;

            let path = scrubber.save_frame()?;
            println!("{} {}", "saved".green().bold(), path.display());
        }
        Commands::Play {
            input,
            from,
            seconds,
        } => {
            let options = ScrubberOptions::new().with_playback(playback_options(&cli.global));
            let mut scrubber = FrameScrubber::new(FfmpegOpener, options);
            let mut sink = Headless {
                verbose: cli.global.verbose,
                frames_per_second: 0.0,
            };
            scrubber.load(&input, &mut sink)?;

            let session = scrubber.session_mut().ok_or("no video loaded")?;
            let frames_per_second = session.metadata().effective_frame_rate();
            sink.frames_per_second = frames_per_second;
            let start = resolve_frame(None, from.as_deref(), frames_per_second)?;
            session.show_frame(start, &mut sink)?;
            session.play()?;

            let started = Instant::now();
            let limit = seconds
                .map(Duration::try_from_secs_f64)
                .transpose()
                .map_err(|_| "--seconds must be a non-negative number")?;
            let mut displayed = 0_u64;
            let mut last_report = Instant::now();

            let end = loop {
                let now = Instant::now();
                if limit.is_some_and(|limit| now.duration_since(started) >= limit) {
                    session.pause()?;
                    break "stopped";
                }
                match session.poll(now, &mut sink)? {
                    TickOutcome::Displayed(_) => displayed += 1,
                    TickOutcome::Finished(_) => {
                        displayed += 1;
                        break "finished";
                    }
                    TickOutcome::EndOfStream => break "end of stream",
                    TickOutcome::Idle => break "stopped",
                    TickOutcome::NotDue | TickOutcome::Empty => {
                        let wait = session
                            .clock()
                            .time_until_next(now)
                            .unwrap_or(Duration::from_millis(1));
                        thread::sleep(wait.max(Duration::from_millis(1)));
                    }
                }
                if !cli.global.verbose && last_report.elapsed() >= Duration::from_secs(1) {
                    eprintln!(
                        "{} {}",
                        "position".cyan().bold(),
                        session.current_timecode()
                    );
                    last_report = Instant::now();
                }
            };

            println!(
                "{} {end} at frame {} ({}), {displayed} frame(s) in {:.2}s",
                "playback".green().bold(),
                session.current_frame(),
                session.current_timecode(),
                started.elapsed().as_secs_f64(),
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framescrub", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, parse_crop, resolve_frame};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_crop_needs_four_values() {
        assert_eq!(
            parse_crop("0, 0,320,240").unwrap(),
            ["0", "0", "320", "240"].map(String::from)
        );
        assert!(parse_crop("0,0,320").is_err());
        assert!(parse_crop("0,0,320,240,1").is_err());
    }

    #[test]
    fn resolve_frame_prefers_index_then_time() {
        assert_eq!(resolve_frame(Some(7), None, 25.0).unwrap(), 7);
        assert_eq!(resolve_frame(None, Some("00:00:02.05"), 25.0).unwrap(), 55);
        assert_eq!(resolve_frame(None, None, 25.0).unwrap(), 0);
        assert!(resolve_frame(None, Some("two seconds"), 25.0).is_err());
    }
}
