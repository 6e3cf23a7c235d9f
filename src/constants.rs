//! Build-time configuration of the sample loop.
//!
//! None of these are runtime-configurable. Changing the filter means editing
//! [`crate::signal_processing::COEFFICIENTS`] and rebuilding.

/// Sample tick rate in Hz. Audio-rate, driven by the hardware timer.
pub const TICK_RATE_HZ: u32 = 44_000;

/// Target frequency of the square wave on the toggle pin.
pub const SQUARE_WAVE_HZ: u32 = 880;

/// Filter length (number of coefficients and history slots).
pub const NUM_COEFFICIENTS: usize = 47;

/// Converter resolution in bits (ADC input and DAC output).
pub const CONVERTER_BITS: u32 = 12;

/// Largest code the output converter accepts.
pub const OUTPUT_MAX: u16 = (1 << CONVERTER_BITS) - 1;

/// Midpoint of the converter range. Subtracted from raw input to remove DC
/// bias before filtering, and added back to the filtered (zero-mean) result.
pub const OUTPUT_OFFSET: u16 = 1 << (CONVERTER_BITS - 1);

/// Longest host run, in seconds of loop time. Host drivers keep every output
/// code and pin level in memory.
pub const MAX_RUN_SECS: f64 = 600.0;

/// Tolerance used when checking that the coefficient set is palindromic.
pub const SYMMETRY_EPSILON: f32 = 1e-9;
