use std::time::Duration;

use rolling_stats::Stats;
use serde::Serialize;

use crate::dispatcher::TickOutcome;

/// Host-side bookkeeping for a run of the loop
///
/// Handler time is wall-clock time measured around `on_tick`. A tick whose
/// handler took longer than one tick period is counted as late; on hardware
/// that would be an overrun, which the loop itself neither detects nor
/// recovers from.
pub struct TickStats {
    tick_rate_hz: u32,
    tick_period_us: f32,
    processed: u64,
    skipped: u64,
    toggles: u64,
    late: u64,
    handler_us: Stats<f32>,
    output: Stats<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tick_rate_hz: u32,
    pub ticks: u64,
    pub skipped: u64,
    pub toggles: u64,
    /// Square-wave frequency implied by the observed toggles
    pub measured_square_wave_hz: Option<f32>,
    pub late_ticks: u64,
    pub tick_period_us: f32,
    pub handler_us: Option<StatsSummary>,
    pub output_code: Option<StatsSummary>,
}

impl TickStats {
    pub fn new(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            tick_period_us: 1_000_000.0 / tick_rate_hz as f32,
            processed: 0,
            skipped: 0,
            toggles: 0,
            late: 0,
            handler_us: Stats::new(),
            output: Stats::new(),
        }
    }

    pub fn record(&mut self, outcome: &TickOutcome, elapsed: Duration) {
        match *outcome {
            TickOutcome::Skipped => self.skipped += 1,
            TickOutcome::Processed {
                output, toggled, ..
            } => {
                self.processed += 1;
                if toggled.is_some() {
                    self.toggles += 1;
                }
                let us = elapsed.as_secs_f32() * 1_000_000.0;
                if us > self.tick_period_us {
                    self.late += 1;
                }
                self.handler_us.update(us);
                self.output.update(output as f32);
            }
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    pub fn late_ticks(&self) -> u64 {
        self.late
    }

    pub fn mean_handler_us(&self) -> Option<f32> {
        (self.handler_us.count > 0).then_some(self.handler_us.mean)
    }

    pub fn summary(&self) -> RunSummary {
        let measured_square_wave_hz = (self.processed > 0 && self.toggles > 0).then(|| {
            let secs = self.processed as f32 / self.tick_rate_hz as f32;
            self.toggles as f32 / 2.0 / secs
        });
        RunSummary {
            tick_rate_hz: self.tick_rate_hz,
            ticks: self.processed,
            skipped: self.skipped,
            toggles: self.toggles,
            measured_square_wave_hz,
            late_ticks: self.late,
            tick_period_us: self.tick_period_us,
            handler_us: StatsSummary::from_stats(&self.handler_us),
            output_code: StatsSummary::from_stats(&self.output),
        }
    }
}
