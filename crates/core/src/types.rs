use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ── Battery types ──────────────────────────────────────────────

/// Status label shown next to the readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryStatus {
    Active,
    LowBattery,
    /// Set out-of-band by a recharge; the next tick overwrites it.
    Charging,
}

impl BatteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::LowBattery => "LOW BATTERY",
            Self::Charging => "Charging...",
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current simulated battery readout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryState {
    /// Charge percentage, always within [0, 100].
    pub level: f64,
    /// Derived from `level`, rounded to 2 decimals.
    pub voltage: f64,
    /// Random walk, rounded to 1 decimal. No bounds.
    pub temperature: f64,
    pub status: BatteryStatus,
}

impl BatteryState {
    /// Fresh state at the given level and temperature.
    pub fn new(level: f64, temperature: f64) -> Self {
        let level = level.clamp(0.0, 100.0);
        Self {
            level,
            voltage: crate::battery::machine::voltage_for(level),
            temperature,
            status: BatteryStatus::Active,
        }
    }
}

impl Default for BatteryState {
    fn default() -> Self {
        Self::new(100.0, 35.0)
    }
}

/// One point of the level chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    /// Local wall clock, `HH:MM:SS`.
    pub timestamp_label: String,
    /// Level rounded to 1 decimal.
    pub level: f64,
}

impl HistorySample {
    pub fn new(timestamp_label: impl Into<String>, level: f64) -> Self {
        Self {
            timestamp_label: timestamp_label.into(),
            level: crate::battery::machine::round_to(level, 1),
        }
    }

    /// Sample stamped with the current local time.
    pub fn now(level: f64) -> Self {
        Self::new(chrono::Local::now().format("%H:%M:%S").to_string(), level)
    }
}

// ── Notification types ─────────────────────────────────────────

/// Transition emitted by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NotificationEvent {
    /// Level reached the configured threshold.
    LowBatteryCrossed { threshold: f64 },
    /// Level reached zero from a positive value.
    Depleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { severity: Severity::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }

    /// Warnings can be dismissed before they expire.
    pub fn is_dismissible(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl From<NotificationEvent> for Notification {
    fn from(event: NotificationEvent) -> Self {
        match event {
            NotificationEvent::LowBatteryCrossed { threshold } => {
                Self::warning(format!("Warning! Charge below {threshold}%!"))
            }
            NotificationEvent::Depleted => Self::error("Critical shutdown! Battery depleted."),
        }
    }
}

// ── Runtime status (for TUI) ───────────────────────────────────

/// Snapshot of the simulation, broadcast via watch channel after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStatus {
    pub tick_count: u64,
    pub battery: BatteryState,
    pub threshold: f64,
    /// Chart samples, oldest first.
    pub history: Vec<HistorySample>,
    pub time_to_empty: Duration,
}

impl Default for DashboardStatus {
    fn default() -> Self {
        Self {
            tick_count: 0,
            battery: BatteryState::default(),
            threshold: 20.0,
            history: Vec::new(),
            time_to_empty: Duration::from_secs(200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_battery_matches_startup_readout() {
        let b = BatteryState::default();
        assert_eq!(b.level, 100.0);
        assert_eq!(b.voltage, 12.6);
        assert_eq!(b.temperature, 35.0);
        assert_eq!(b.status, BatteryStatus::Active);
    }

    #[test]
    fn new_state_clamps_level() {
        assert_eq!(BatteryState::new(150.0, 20.0).level, 100.0);
        assert_eq!(BatteryState::new(-3.0, 20.0).level, 0.0);
    }

    #[test]
    fn sample_rounds_level() {
        let s = HistorySample::new("12:00:00", 42.46);
        assert_eq!(s.level, 42.5);
        assert_eq!(s.timestamp_label, "12:00:00");
    }

    #[test]
    fn sample_now_label_is_clock_shaped() {
        let s = HistorySample::now(50.0);
        assert_eq!(s.timestamp_label.len(), 8);
        assert_eq!(s.timestamp_label.matches(':').count(), 2);
    }

    #[test]
    fn event_to_notification_severity() {
        let low = Notification::from(NotificationEvent::LowBatteryCrossed { threshold: 20.0 });
        assert_eq!(low.severity, Severity::Warning);
        assert_eq!(low.message, "Warning! Charge below 20%!");
        assert!(low.is_dismissible());

        let dead = Notification::from(NotificationEvent::Depleted);
        assert_eq!(dead.severity, Severity::Error);
        assert!(!dead.is_dismissible());
    }

    #[test]
    fn status_labels() {
        assert_eq!(BatteryStatus::Active.to_string(), "Active");
        assert_eq!(BatteryStatus::LowBattery.as_str(), "LOW BATTERY");
        assert_eq!(BatteryStatus::Charging.as_str(), "Charging...");
    }
}
