use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Fixed-period ticker driving the simulation.
///
/// The first tick completes one full period after creation. Late ticks are
/// delayed rather than bursted, so two ticks never run back to back.
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct SimulationClock {
    period: Duration,
    interval: Interval,
    ticks: u64,
}

impl SimulationClock {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            period,
            interval,
            ticks: 0,
        }
    }

    /// Wait for the next tick. Returns the 1-based tick number. Cancel safe.
    pub async fn tick(&mut self) -> u64 {
        self.interval.tick().await;
        self.ticks += 1;
        self.ticks
    }

    /// Re-arm so the next tick fires one full period from now.
    pub fn restart(&mut self) {
        self.interval.reset();
        tracing::debug!(period_ms = self.period.as_millis() as u64, "clock restarted");
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks fired so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_one_period() {
        let start = Instant::now();
        let mut clock = SimulationClock::new(Duration::from_secs(1));
        assert_eq!(clock.tick().await, 1);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(clock.tick().await, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_pushes_next_tick_back() {
        let start = Instant::now();
        let mut clock = SimulationClock::new(Duration::from_secs(1));
        time::sleep(Duration::from_millis(600)).await;
        clock.restart();
        clock.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(1600));
        assert_eq!(clock.ticks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_ticks_are_delayed_not_bursted() {
        let mut clock = SimulationClock::new(Duration::from_secs(1));
        time::sleep(Duration::from_millis(3500)).await;
        let start = Instant::now();
        clock.tick().await; // overdue, fires at once
        clock.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }
}
