//! End-to-end tests for the simulation pipeline without a clock:
//! step → history → notification sink.

use rand::SeedableRng;
use rand::rngs::StdRng;
use robobat_core::battery::machine::{round_to, voltage_for};
use robobat_core::battery::{StepParams, recharge, step};
use robobat_core::config::{GateMode, SimCfg};
use robobat_core::history::HistoryBuffer;
use robobat_core::notify::{MemorySink, NotificationSink};
use robobat_core::types::{BatteryState, BatteryStatus, HistorySample, NotificationEvent, Severity};

/// Drive `ticks` steps at a fixed threshold, returning the tick numbers of each event.
fn drive(ticks: u64, threshold: f64, params: &StepParams) -> (BatteryState, Vec<(u64, NotificationEvent)>) {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut state = BatteryState::default();
    let mut events = Vec::new();
    for tick in 1..=ticks {
        let out = step(&state, threshold, params, &mut rng);
        assert!((0.0..=100.0).contains(&out.state.level), "level out of range at tick {tick}");
        assert_eq!(out.state.voltage, voltage_for(out.state.level));
        events.extend(out.events.into_iter().map(|e| (tick, e)));
        state = out.state;
    }
    (state, events)
}

/// Default parameters: warning at tick 160, depletion at tick 200, each once.
#[test]
fn default_drain_fires_each_alert_once() {
    let (state, events) = drive(300, 20.0, &StepParams::default());
    assert_eq!(
        events,
        vec![
            (160, NotificationEvent::LowBatteryCrossed { threshold: 20.0 }),
            (200, NotificationEvent::Depleted),
        ]
    );
    assert_eq!(state.level, 0.0);
    assert_eq!(state.status, BatteryStatus::LowBattery);
    assert_eq!(state.voltage, 10.0);
}

/// Voltage tracks the formula at every level the drain visits.
#[test]
fn voltage_follows_level_formula() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = BatteryState::default();
    for _ in 0..200 {
        state = step(&state, 20.0, &StepParams::default(), &mut rng).state;
        let expected = round_to(10.0 + state.level / 100.0 * 2.6, 2);
        assert_eq!(state.voltage, expected);
    }
}

/// History keeps the 20 most recent samples in chronological order.
#[test]
fn history_holds_latest_twenty() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut state = BatteryState::default();
    let mut history = HistoryBuffer::default();
    for tick in 1..=35u64 {
        state = step(&state, 20.0, &StepParams::default(), &mut rng).state;
        history.append(HistorySample::new(format!("t{tick}"), state.level));
        assert_eq!(history.len() as u64, tick.min(20));
    }
    let labels: Vec<&str> = history.iter().map(|s| s.timestamp_label.as_str()).collect();
    assert_eq!(labels.first(), Some(&"t16"));
    assert_eq!(labels.last(), Some(&"t35"));
    assert_eq!(history.latest().map(|s| s.level), Some(82.5));
}

/// A recharge mid-run re-arms both alerts for the next drain.
#[test]
fn recharge_rearms_alerts() {
    let mut rng = StdRng::seed_from_u64(11);
    let params = StepParams::default();
    let sink = MemorySink::new();
    let mut state = BatteryState::default();

    for _ in 0..200 {
        let out = step(&state, 20.0, &params, &mut rng);
        out.events.into_iter().for_each(|e| sink.notify(e));
        state = out.state;
    }
    state = recharge(&state);
    assert_eq!(state.status, BatteryStatus::Charging);

    let out = step(&state, 20.0, &params, &mut rng);
    assert_eq!(out.state.status, BatteryStatus::Active);
    state = out.state;
    for _ in 1..200 {
        let out = step(&state, 20.0, &params, &mut rng);
        out.events.into_iter().for_each(|e| sink.notify(e));
        state = out.state;
    }

    let severities: Vec<Severity> = sink.received().iter().map(|n| n.severity).collect();
    assert_eq!(
        severities,
        vec![Severity::Warning, Severity::Error, Severity::Warning, Severity::Error]
    );
}

/// Crossing gate fires one tick later than exact gate for aligned thresholds.
#[test]
fn crossing_gate_fires_on_first_level_below() {
    let cfg = SimCfg { gate_mode: GateMode::Crossing, ..SimCfg::default() };
    let (_, events) = drive(300, 20.0, &StepParams::from(&cfg));
    assert_eq!(
        events,
        vec![
            (161, NotificationEvent::LowBatteryCrossed { threshold: 20.0 }),
            (200, NotificationEvent::Depleted),
        ]
    );
}
