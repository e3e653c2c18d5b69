//! Rewind/forward step sizes.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Which way a relative step moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// Towards frame zero.
    Backward,
    /// Towards the last frame.
    Forward,
}

/// How far a single rewind or forward moves the playhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepSize {
    /// Exactly one frame, whatever the frame rate.
    #[default]
    OneFrame,
    /// 0.1 seconds.
    TenthSecond,
    /// 0.25 seconds.
    QuarterSecond,
    /// 0.5 seconds.
    HalfSecond,
    /// 1 second.
    OneSecond,
    /// 2 seconds.
    TwoSeconds,
    /// 5 seconds.
    FiveSeconds,
    /// 10 seconds.
    TenSeconds,
}

impl StepSize {
    /// Every step size, smallest first.
    pub const ALL: [StepSize; 8] = [
        StepSize::OneFrame,
        StepSize::TenthSecond,
        StepSize::QuarterSecond,
        StepSize::HalfSecond,
        StepSize::OneSecond,
        StepSize::TwoSeconds,
        StepSize::FiveSeconds,
        StepSize::TenSeconds,
    ];

    /// Step length in seconds. One frame is `1 / frames_per_second`.
    pub fn seconds(self, frames_per_second: f64) -> f64 {
        match self {
            StepSize::OneFrame if frames_per_second > 0.0 => 1.0 / frames_per_second,
            StepSize::OneFrame => 0.0,
            StepSize::TenthSecond => 0.1,
            StepSize::QuarterSecond => 0.25,
            StepSize::HalfSecond => 0.5,
            StepSize::OneSecond => 1.0,
            StepSize::TwoSeconds => 2.0,
            StepSize::FiveSeconds => 5.0,
            StepSize::TenSeconds => 10.0,
        }
    }

    /// Step length in frames: `round(seconds × fps)`.
    pub fn frames(self, frames_per_second: f64) -> u64 {
        if self == StepSize::OneFrame {
            return 1;
        }
        (self.seconds(frames_per_second) * frames_per_second)
            .round()
            .max(0.0) as u64
    }

    /// Label used in menus and on the command line.
    pub fn label(self) -> &'static str {
        match self {
            StepSize::OneFrame => "1 frame",
            StepSize::TenthSecond => "0.1 second",
            StepSize::QuarterSecond => "0.25 second",
            StepSize::HalfSecond => "0.5 second",
            StepSize::OneSecond => "1 second",
            StepSize::TwoSeconds => "2 seconds",
            StepSize::FiveSeconds => "5 seconds",
            StepSize::TenSeconds => "10 seconds",
        }
    }
}

impl Display for StepSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

impl FromStr for StepSize {
    type Err = String;

    /// Accepts the menu labels as well as short forms like `0.5s` or
    /// `frame`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        if matches!(normalized.as_str(), "frame" | "1 frame" | "1f" | "1frame") {
            return Ok(StepSize::OneFrame);
        }

        let number = normalized
            .trim_end_matches("seconds")
            .trim_end_matches("second")
            .trim_end_matches("secs")
            .trim_end_matches("sec")
            .trim_end_matches('s')
            .trim();

        let seconds: f64 = number
            .parse()
            .map_err(|_| format!("unknown step size: {value}"))?;

        StepSize::ALL
            .into_iter()
            .filter(|step| *step != StepSize::OneFrame)
            .find(|step| (step.seconds(1.0) - seconds).abs() < 1e-9)
            .ok_or_else(|| format!("unsupported step size: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_frame_is_one_frame_at_any_rate() {
        for frames_per_second in [23.976, 25.0, 29.97, 60.0, 120.0] {
            assert_eq!(StepSize::OneFrame.frames(frames_per_second), 1);
        }
    }

    #[test]
    fn time_steps_round_to_whole_frames() {
        assert_eq!(StepSize::TenthSecond.frames(25.0), 3);
        assert_eq!(StepSize::QuarterSecond.frames(30.0), 8);
        assert_eq!(StepSize::TenSeconds.frames(29.97), 300);
    }

    #[test]
    fn labels_parse_back() {
        for step in StepSize::ALL {
            assert_eq!(step.label().parse::<StepSize>(), Ok(step));
        }
    }

    #[test]
    fn short_forms_parse() {
        assert_eq!("0.5s".parse::<StepSize>(), Ok(StepSize::HalfSecond));
        assert_eq!("2".parse::<StepSize>(), Ok(StepSize::TwoSeconds));
        assert_eq!("frame".parse::<StepSize>(), Ok(StepSize::OneFrame));
        assert!("3 seconds".parse::<StepSize>().is_err());
        assert!("soon".parse::<StepSize>().is_err());
    }
}
