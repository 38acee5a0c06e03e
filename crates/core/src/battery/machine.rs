use rand::Rng;

use crate::config::{GateMode, SimCfg};
use crate::types::{BatteryState, BatteryStatus, NotificationEvent};

/// Voltage at 0% charge.
pub const VOLTAGE_EMPTY: f64 = 10.0;
/// Voltage span between empty and full (full = 12.6 V).
pub const VOLTAGE_SPAN: f64 = 2.6;

/// Per-step parameters derived from config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub drain_per_tick: f64,
    pub temperature_jitter: f64,
    pub gate_mode: GateMode,
}

impl Default for StepParams {
    fn default() -> Self {
        Self::from(&SimCfg::default())
    }
}

impl From<&SimCfg> for StepParams {
    fn from(cfg: &SimCfg) -> Self {
        Self {
            drain_per_tick: cfg.drain_per_tick,
            temperature_jitter: cfg.temperature_jitter,
            gate_mode: cfg.gate_mode,
        }
    }
}

/// Result of a single step: the next state plus events to surface.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: BatteryState,
    pub events: Vec<NotificationEvent>,
}

/// Round half away from zero to `digits` decimals.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// `10 + level/100 * 2.6`, rounded to 2 decimals.
pub fn voltage_for(level: f64) -> f64 {
    round_to(VOLTAGE_EMPTY + (level / 100.0) * VOLTAGE_SPAN, 2)
}

/// Advance the battery by one tick.
///
/// Pure apart from the injected random source. Status is always derived from
/// the new level, so a `Charging` status set by a recharge lasts until here.
pub fn step<R: Rng + ?Sized>(
    prev: &BatteryState,
    threshold: f64,
    params: &StepParams,
    rng: &mut R,
) -> StepOutcome {
    let drain = if params.drain_per_tick.is_finite() { params.drain_per_tick } else { 0.0 };
    let level = (prev.level - drain).clamp(0.0, 100.0);

    let jitter = params.temperature_jitter;
    let delta = if jitter.is_finite() && jitter > 0.0 {
        rng.gen_range(-1.0f64..1.0) * jitter
    } else {
        0.0
    };
    let temperature = round_to(prev.temperature + delta, 1);

    let status = if level < threshold {
        BatteryStatus::LowBattery
    } else {
        BatteryStatus::Active
    };

    let mut events = Vec::new();
    let low_crossed = match params.gate_mode {
        GateMode::Exact => level == threshold,
        GateMode::Crossing => prev.level >= threshold && level < threshold,
    };
    if low_crossed {
        events.push(NotificationEvent::LowBatteryCrossed { threshold });
    }
    if level == 0.0 && prev.level > 0.0 {
        events.push(NotificationEvent::Depleted);
    }

    StepOutcome {
        state: BatteryState {
            level,
            voltage: voltage_for(level),
            temperature,
            status,
        },
        events,
    }
}
