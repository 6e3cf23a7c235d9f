//! Configuration for the sample loop and its host harness.
//!
//! The loop itself is configured at build time through [`crate::constants`];
//! [`LoopConfig::default()`] mirrors those constants. Host runs (simulation,
//! file processing, live capture) additionally read a [`HostConfig`] from
//! TOML, with every table optional:
//!
//! ```toml
//! [simulation]
//! duration_secs = 0.5
//! noise_std = 12.0
//! seed = 7
//!
//! [audio]
//! buffer_size = 512
//!
//! [output]
//! path = "loopback.wav"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{MAX_RUN_SECS, OUTPUT_MAX, OUTPUT_OFFSET, SQUARE_WAVE_HZ, TICK_RATE_HZ};
use crate::error::{LoopError, Result};

/// Timing and numeric parameters of the sample loop
///
/// # Example
/// ```
/// use firloop::config::LoopConfig;
///
/// let config = LoopConfig::default();
/// assert_eq!(config.tick_rate_hz, 44_000);
/// assert_eq!(config.tick_period_secs(), 1.0 / 44_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    /// Sample tick rate in Hz
    pub tick_rate_hz: u32,
    /// Square-wave target frequency in Hz
    pub square_wave_hz: u32,
    /// Converter midpoint removed before filtering and restored after
    pub output_offset: u16,
    /// Largest code the sink accepts
    pub output_max: u16,
}

impl LoopConfig {
    pub fn tick_period_secs(&self) -> f32 {
        1.0 / self.tick_rate_hz as f32
    }

    /// # Errors
    /// Returns `LoopError::Config` for a zero tick rate or an offset outside
    /// the output range.
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_hz == 0 {
            return Err(LoopError::Config("tick rate must be non-zero".into()));
        }
        if self.output_offset > self.output_max {
            return Err(LoopError::Config(format!(
                "output offset {} exceeds output maximum {}",
                self.output_offset, self.output_max
            )));
        }
        Ok(())
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: TICK_RATE_HZ,
            square_wave_hz: SQUARE_WAVE_HZ,
            output_offset: OUTPUT_OFFSET,
            output_max: OUTPUT_MAX,
        }
    }
}

/// Harness configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub simulation: SimulationConfig,
    pub audio: AudioConfig,
    pub output: OutputConfig,
}

/// Loopback self-test parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated run length in seconds
    pub duration_secs: f32,
    /// Gaussian noise added to each ADC conversion, in codes (0 disables)
    pub noise_std: f32,
    /// RNG seed for reproducible noise
    pub seed: Option<u64>,
    /// ADC code seen while the pin is high
    pub high_level: u16,
    /// ADC code seen while the pin is low
    pub low_level: u16,
}

/// Live capture parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Device buffer size in frames
    pub buffer_size: usize,
    /// Number of interleaved input channels requested from the device
    pub channels: u16,
    /// Which input channel feeds the loop (0-based)
    pub input_channel: u16,
}

/// Recording output
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the stereo recording (left = DAC, right = pin)
    pub path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 1.0,
            noise_std: 0.0,
            seed: None,
            high_level: OUTPUT_MAX,
            low_level: 0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            channels: 1,
            input_channel: 0,
        }
    }
}

impl HostConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if !(sim.duration_secs.is_finite() && sim.duration_secs > 0.0) {
            return Err(LoopError::Config(format!(
                "simulation duration must be positive, got {}",
                sim.duration_secs
            )));
        }
        if sim.duration_secs as f64 > MAX_RUN_SECS {
            return Err(LoopError::Config(format!(
                "simulation duration {} s exceeds the {} s limit",
                sim.duration_secs, MAX_RUN_SECS
            )));
        }
        if sim.noise_std < 0.0 {
            return Err(LoopError::Config("noise_std must not be negative".into()));
        }
        if self.audio.channels == 0 || self.audio.input_channel >= self.audio.channels {
            return Err(LoopError::Config(format!(
                "input channel {} not available with {} channels",
                self.audio.input_channel, self.audio.channels
            )));
        }
        if self.audio.buffer_size == 0 {
            return Err(LoopError::Config("audio buffer size must be non-zero".into()));
        }
        Ok(())
    }
}
