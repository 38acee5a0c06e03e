use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable prefix for overrides, e.g. `ROBOBAT_TICK_MS=250`.
pub const ENV_PREFIX: &str = "ROBOBAT_";
/// Longest accepted tick period (one hour).
pub const MAX_TICK_MS: u64 = 3_600_000;

/// How threshold notifications are gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateMode {
    /// Fire when the new level equals the threshold exactly.
    Exact,
    /// Fire when the level moves from at-or-above to below the threshold.
    Crossing,
}

impl FromStr for GateMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "crossing" => Ok(Self::Crossing),
            _ => Err(()),
        }
    }
}

/// All simulation parameters. Defaults reproduce the reference dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimCfg {
    // clock
    pub tick_ms: u64,

    // battery model
    pub drain_per_tick: f64,
    pub initial_level: f64,
    pub initial_temperature: f64,
    pub temperature_jitter: f64,

    // alerts
    pub threshold: f64,
    pub gate_mode: GateMode,

    // history
    pub history_capacity: usize,
    pub clear_history_on_recharge: bool,

    // channels
    pub notification_buffer: usize,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            drain_per_tick: 0.5,
            initial_level: 100.0,
            initial_temperature: 35.0,
            temperature_jitter: 0.5,
            threshold: 20.0,
            gate_mode: GateMode::Exact,
            history_capacity: 20,
            clear_history_on_recharge: false,
            notification_buffer: 64,
        }
    }
}

impl SimCfg {
    /// Defaults overridden by `ROBOBAT_*` environment variables.
    pub fn from_env() -> Self {
        let map: HashMap<String, String> = std::env::vars()
            .filter_map(|(k, v)| {
                k.strip_prefix(ENV_PREFIX)
                    .map(|key| (key.to_ascii_lowercase(), v))
            })
            .collect();
        let cfg = Self::from_map(&map);
        tracing::debug!(overrides = map.len(), ?cfg, "simulation config loaded");
        cfg
    }

    /// Build from a key/value map. Missing or unparsable values keep their default.
    /// Floats must be finite; `drain_per_tick` must also be positive.
    pub fn from_map(m: &HashMap<String, String>) -> Self {
        let d = Self::default();
        let drain = get_f64(m, "drain_per_tick", d.drain_per_tick);
        Self {
            tick_ms: get_or(m, "tick_ms", d.tick_ms).clamp(1, MAX_TICK_MS),
            drain_per_tick: if drain > 0.0 { drain } else { d.drain_per_tick },
            initial_level: get_f64(m, "initial_level", d.initial_level).clamp(0.0, 100.0),
            initial_temperature: get_f64(m, "initial_temperature", d.initial_temperature),
            temperature_jitter: get_f64(m, "temperature_jitter", d.temperature_jitter).abs(),
            threshold: get_f64(m, "threshold", d.threshold),
            gate_mode: get_or(m, "gate_mode", d.gate_mode),
            history_capacity: get_or(m, "history_capacity", d.history_capacity).max(1),
            clear_history_on_recharge: get_or(m, "clear_history_on_recharge", d.clear_history_on_recharge),
            notification_buffer: get_or(m, "notification_buffer", d.notification_buffer).max(1),
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Key, current value, description. Used for the settings page listing.
    pub fn to_entries(&self) -> Vec<(&'static str, String, &'static str)> {
        vec![
            ("tick_ms", self.tick_ms.to_string(), "Simulation tick period ms"),
            ("drain_per_tick", self.drain_per_tick.to_string(), "Level drained per tick"),
            ("initial_level", self.initial_level.to_string(), "Level at startup"),
            ("initial_temperature", self.initial_temperature.to_string(), "Temperature at startup"),
            ("temperature_jitter", self.temperature_jitter.to_string(), "Max temperature change per tick"),
            ("threshold", self.threshold.to_string(), "Initial low-battery threshold"),
            ("gate_mode", format!("{:?}", self.gate_mode).to_lowercase(), "Threshold alert gating"),
            ("history_capacity", self.history_capacity.to_string(), "Chart samples kept"),
            ("clear_history_on_recharge", self.clear_history_on_recharge.to_string(), "Reset chart on recharge"),
            ("notification_buffer", self.notification_buffer.to_string(), "Notification channel capacity"),
        ]
    }
}

fn get_or<T: FromStr>(map: &HashMap<String, String>, key: &str, default: T) -> T {
    map.get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Like [`get_or`], but `inf` and `NaN` also fall back.
fn get_f64(map: &HashMap<String, String>, key: &str, default: f64) -> f64 {
    let v = get_or(map, key, default);
    if v.is_finite() { v } else { default }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_match_reference_dashboard() {
        let cfg = SimCfg::default();
        assert_eq!(cfg.tick_period(), Duration::from_secs(1));
        assert_eq!(cfg.drain_per_tick, 0.5);
        assert_eq!(cfg.threshold, 20.0);
        assert_eq!(cfg.history_capacity, 20);
        assert_eq!(cfg.gate_mode, GateMode::Exact);
        assert!(!cfg.clear_history_on_recharge);
    }

    #[test]
    fn overrides_apply() {
        let cfg = SimCfg::from_map(&map(&[
            ("tick_ms", "250"),
            ("threshold", "35.5"),
            ("gate_mode", "Crossing"),
            ("clear_history_on_recharge", "true"),
        ]));
        assert_eq!(cfg.tick_ms, 250);
        assert_eq!(cfg.threshold, 35.5);
        assert_eq!(cfg.gate_mode, GateMode::Crossing);
        assert!(cfg.clear_history_on_recharge);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = SimCfg::from_map(&map(&[
            ("tick_ms", "fast"),
            ("gate_mode", "fuzzy"),
            ("history_capacity", "0"),
        ]));
        assert_eq!(cfg.tick_ms, 1000);
        assert_eq!(cfg.gate_mode, GateMode::Exact);
        assert_eq!(cfg.history_capacity, 1);
    }

    #[test]
    fn non_finite_floats_fall_back() {
        let cfg = SimCfg::from_map(&map(&[
            ("temperature_jitter", "inf"),
            ("drain_per_tick", "NaN"),
            ("threshold", "-inf"),
            ("initial_temperature", "nan"),
        ]));
        assert_eq!(cfg.temperature_jitter, 0.5);
        assert_eq!(cfg.drain_per_tick, 0.5);
        assert_eq!(cfg.threshold, 20.0);
        assert_eq!(cfg.initial_temperature, 35.0);
    }

    #[test]
    fn drain_must_be_positive() {
        assert_eq!(SimCfg::from_map(&map(&[("drain_per_tick", "0")])).drain_per_tick, 0.5);
        assert_eq!(SimCfg::from_map(&map(&[("drain_per_tick", "-2")])).drain_per_tick, 0.5);
        assert_eq!(SimCfg::from_map(&map(&[("drain_per_tick", "1e-20")])).drain_per_tick, 1e-20);
    }

    #[test]
    fn tick_period_is_bounded() {
        let cfg = SimCfg::from_map(&map(&[("tick_ms", "18446744073709551615")]));
        assert_eq!(cfg.tick_ms, MAX_TICK_MS);
    }

    #[test]
    fn entries_cover_every_key() {
        let entries = SimCfg::default().to_entries();
        assert_eq!(entries.len(), 10);
        assert!(entries.iter().any(|(k, v, _)| *k == "gate_mode" && v == "exact"));
    }

    #[test]
    fn serde_roundtrip_keeps_gate_mode() {
        let cfg = SimCfg { gate_mode: GateMode::Crossing, ..SimCfg::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SimCfg = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gate_mode, GateMode::Crossing);
    }
}
