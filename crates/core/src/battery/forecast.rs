use std::time::Duration;

/// Temperature above which the readout is highlighted.
pub const OVERHEAT_CELSIUS: f64 = 40.0;

/// Colour band of the level gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelBand {
    /// Above 60%.
    Good,
    /// Above 20%.
    Fair,
    Critical,
}

impl LevelBand {
    pub fn from_level(level: f64) -> Self {
        if level > 60.0 {
            Self::Good
        } else if level > 20.0 {
            Self::Fair
        } else {
            Self::Critical
        }
    }
}

/// Remaining run time at a constant drain rate. Saturates at `Duration::MAX`.
pub fn time_to_empty(level: f64, drain_per_tick: f64, period: Duration) -> Duration {
    // negated so NaN also lands here
    if !(drain_per_tick > 0.0 && level > 0.0) {
        return Duration::ZERO;
    }
    let secs = period.as_secs_f64() * (level / drain_per_tick);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// `"3 min 20 s"`. Sub-second remainders are truncated.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{} min {} s", secs / 60, secs % 60)
}

pub fn is_overheated(temperature: f64) -> bool {
    temperature > OVERHEAT_CELSIUS
}
