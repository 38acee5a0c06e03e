use crate::types::{BatteryState, BatteryStatus};

/// Level restored by a full recharge.
pub const FULL_LEVEL: f64 = 100.0;

/// Restore the battery to full.
///
/// Voltage and temperature keep their previous values until the next tick
/// recomputes them; status stays `Charging` until then.
pub fn recharge(state: &BatteryState) -> BatteryState {
    BatteryState {
        level: FULL_LEVEL,
        status: BatteryStatus::Charging,
        ..*state
    }
}
