use crate::error::{LoopError, Result};

/// Output level of the square-wave pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    High,
    #[default]
    Low,
}

impl Level {
    pub fn toggled(self) -> Self {
        match self {
            Level::High => Level::Low,
            Level::Low => Level::High,
        }
    }

    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

/// Tick-driven square-wave phase counter
///
/// Counts ticks and flips the output level every `half_period_ticks` ticks.
/// The half period is `tick_rate / target_freq / 2` in integer arithmetic, so
/// the produced frequency is `tick_rate / (2 * half_period_ticks)`. Whenever
/// the division is inexact the output runs slightly fast; at 44 kHz and 880 Hz
/// it is exact. Use [`PhaseGenerator::actual_frequency_hz`] to read the real
/// rate.
#[derive(Debug, Clone)]
pub struct PhaseGenerator {
    half_period_ticks: u32,
    counter: u32,
    level: Level,
    toggles: u64,
    tick_rate_hz: u32,
}

impl PhaseGenerator {
    /// # Errors
    /// Returns `LoopError::Config` if either rate is zero or the target is
    /// above half the tick rate (the half period would truncate to zero).
    pub fn new(tick_rate_hz: u32, target_freq_hz: u32) -> Result<Self> {
        if tick_rate_hz == 0 || target_freq_hz == 0 {
            return Err(LoopError::Config(format!(
                "Square wave rates must be non-zero: tick_rate={}, target={}",
                tick_rate_hz, target_freq_hz
            )));
        }

        let half_period_ticks = tick_rate_hz / target_freq_hz / 2;
        if half_period_ticks == 0 {
            return Err(LoopError::Config(format!(
                "Square wave target {} Hz is above half the tick rate {} Hz",
                target_freq_hz, tick_rate_hz
            )));
        }

        Ok(Self {
            half_period_ticks,
            counter: 0,
            level: Level::Low,
            toggles: 0,
            tick_rate_hz,
        })
    }

    /// Advance one tick. Returns the new level when this tick flips the
    /// output.
    pub fn tick(&mut self) -> Option<Level> {
        self.counter += 1;
        if self.counter >= self.half_period_ticks {
            self.counter = 0;
            self.level = self.level.toggled();
            self.toggles += 1;
            Some(self.level)
        } else {
            None
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    pub fn half_period_ticks(&self) -> u32 {
        self.half_period_ticks
    }

    /// Number of level flips since construction
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    /// Frequency actually produced after truncation of the half period
    pub fn actual_frequency_hz(&self) -> f32 {
        self.tick_rate_hz as f32 / (2 * self.half_period_ticks) as f32
    }
}
