//! Conversions between converter codes and host sample formats.

use crate::constants::{OUTPUT_MAX, OUTPUT_OFFSET};

/// Map a normalized sample in [-1, 1] to a converter code. Out-of-range input
/// is clipped.
pub fn code_from_unit(sample: f32) -> u16 {
    let unit = (sample.clamp(-1.0, 1.0) + 1.0) * 0.5;
    (unit * OUTPUT_MAX as f32).round() as u16
}

/// Widen a 12-bit code to signed 16-bit PCM
pub fn code_to_pcm16(code: u16) -> i16 {
    let centered = code.min(OUTPUT_MAX) as i32 - OUTPUT_OFFSET as i32;
    (centered * 16) as i16
}

/// Reduce signed PCM of any width to a converter code
pub fn code_from_pcm(sample: i32, bits_per_sample: u16) -> u16 {
    let full_scale = (1i64 << (bits_per_sample.clamp(2, 32) - 1)) as f32;
    code_from_unit(sample as f32 / full_scale)
}
