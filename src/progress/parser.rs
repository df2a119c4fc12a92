//! Marker extraction from the media tool's diagnostic output.
//!
//! The diagnostic text is not a stable interface of the tool, so every pattern
//! lives here. A line that matches nothing is the normal case, not an error.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration: (\d+):(\d+):(\d+\.\d+)").expect("valid duration pattern"));

static ELAPSED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=(\d+):(\d+):(\d+\.\d+)").expect("valid elapsed pattern"));

static SPEED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"speed=\s*([\d.]+)x").expect("valid speed pattern"));

/// Speed assumed when a progress line carries no usable speed marker
pub const DEFAULT_SPEED: f64 = 1.0;

/// One progress estimate derived from a single diagnostic line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    /// Not clamped; may leave 0..=100 on out-of-order timestamps
    pub percentage: f64,
    pub speed: f64,
    /// Remaining seconds at the current speed; may be negative
    pub eta_seconds: f64,
}

impl ProgressSample {
    pub fn rounded_percentage(&self) -> f64 {
        round2(self.percentage)
    }

    pub fn rounded_speed(&self) -> f64 {
        round2(self.speed)
    }

    /// ETA as "<minutes>m <seconds>s"
    pub fn eta_label(&self) -> String {
        format_eta(self.eta_seconds)
    }
}

/// Total duration announced by the input probe, in seconds
pub fn parse_duration(line: &str) -> Option<f64> {
    if !line.contains("Duration") {
        return None;
    }
    DURATION_RE.captures(line).and_then(|caps| timestamp_seconds(&caps))
}

/// Elapsed output time reported by a progress line, in seconds
pub fn parse_elapsed(line: &str) -> Option<f64> {
    if !line.contains("time=") {
        return None;
    }
    ELAPSED_RE.captures(line).and_then(|caps| timestamp_seconds(&caps))
}

/// Processing speed multiplier, e.g. `speed=2.5x`
pub fn parse_speed(line: &str) -> Option<f64> {
    SPEED_RE
        .captures(line)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Derive a sample from a line once the total duration is known.
///
/// A zero duration never yields a sample.
pub fn sample_from_line(line: &str, total_duration: f64) -> Option<ProgressSample> {
    if total_duration == 0.0 {
        return None;
    }
    let elapsed = parse_elapsed(line)?;
    let speed = parse_speed(line).unwrap_or(DEFAULT_SPEED);

    let percentage = elapsed / total_duration * 100.0;
    let eta_seconds = if speed > 0.0 {
        (total_duration - elapsed) / speed
    } else {
        0.0
    };

    Some(ProgressSample {
        percentage,
        speed,
        eta_seconds,
    })
}

fn timestamp_seconds(caps: &Captures<'_>) -> Option<f64> {
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Round to 2 decimals on the exact binary value, so 2.675 (stored as
/// 2.67499...) becomes 2.67 rather than 2.68
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Floor division with a non-negative remainder: -30s renders as "-1m 30s"
pub fn format_eta(eta_seconds: f64) -> String {
    let minutes = (eta_seconds / 60.0).floor() as i64;
    let seconds = eta_seconds.rem_euclid(60.0).floor() as i64;
    format!("{}m {}s", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_LINE: &str = "  Duration: 00:10:00.00, start: 0.000000, bitrate: 1205 kb/s";
    const STATS_LINE: &str =
        "frame= 7200 fps=240 q=-1.0 size=   10240kB time=00:05:00.00 bitrate= 279.6kbits/s speed=2.0x";

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(PROBE_LINE), Some(600.0));
        assert_eq!(parse_duration("  Duration: 01:02:03.50, start: 0"), Some(3723.5));
        assert_eq!(parse_duration("  Duration: N/A, bitrate: N/A"), None);
        assert_eq!(parse_duration(STATS_LINE), None);
    }

    #[test]
    fn test_parse_elapsed() {
        assert_eq!(parse_elapsed(STATS_LINE), Some(300.0));
        assert_eq!(parse_elapsed("size=N/A time=N/A bitrate=N/A speed=N/A"), None);
        assert_eq!(parse_elapsed(PROBE_LINE), None);
    }

    #[test]
    fn test_parse_speed() {
        assert_eq!(parse_speed(STATS_LINE), Some(2.0));
        assert_eq!(parse_speed("time=00:00:01.00 speed=0.512x"), Some(0.512));
        assert_eq!(parse_speed("time=00:00:01.00 speed= 12.3x"), Some(12.3));
        assert_eq!(parse_speed("time=00:00:01.00 speed=N/A"), None);
        assert_eq!(parse_speed("time=00:00:01.00 speed=1.2.3x"), None);
    }

    #[test]
    fn test_sample_half_way_at_double_speed() {
        let sample = sample_from_line(STATS_LINE, 600.0).unwrap();
        assert_eq!(sample.rounded_percentage(), 50.0);
        assert_eq!(sample.rounded_speed(), 2.0);
        assert_eq!(sample.eta_seconds, 150.0);
        assert_eq!(sample.eta_label(), "2m 30s");
    }

    #[test]
    fn test_sample_defaults_speed_when_absent() {
        let sample = sample_from_line("time=00:00:30.00 bitrate=N/A", 90.0).unwrap();
        assert_eq!(sample.speed, DEFAULT_SPEED);
        assert_eq!(sample.eta_seconds, 60.0);
        assert_eq!(sample.eta_label(), "1m 0s");
    }

    #[test]
    fn test_zero_speed_gives_zero_eta() {
        let sample = sample_from_line("time=00:00:10.00 speed=0.0x", 100.0).unwrap();
        assert_eq!(sample.speed, 0.0);
        assert_eq!(sample.eta_seconds, 0.0);
        assert_eq!(sample.eta_label(), "0m 0s");
    }

    #[test]
    fn test_overrun_is_not_clamped() {
        let sample = sample_from_line("time=00:02:00.00 speed=1.0x", 100.0).unwrap();
        assert_eq!(sample.rounded_percentage(), 120.0);
        assert_eq!(sample.eta_seconds, -20.0);
        assert_eq!(sample.eta_label(), "-1m 40s");
    }

    #[test]
    fn test_zero_duration_yields_nothing() {
        assert_eq!(sample_from_line(STATS_LINE, 0.0), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(-1.005_1), -1.01);
    }

    #[test]
    fn test_round2_uses_stored_value() {
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0.0), "0m 0s");
        assert_eq!(format_eta(59.9), "0m 59s");
        assert_eq!(format_eta(3725.4), "62m 5s");
        assert_eq!(format_eta(-30.0), "-1m 30s");
    }
}
