//! The fixed coefficient set and helpers for inspecting it.

use num_complex::Complex;
use std::f64::consts::PI;

use crate::constants::NUM_COEFFICIENTS;

/// 47-tap linear-phase FIR designed for the 44 kHz loop.
///
/// Palindromic: `COEFFICIENTS[i] == COEFFICIENTS[NUM_COEFFICIENTS - 1 - i]`.
/// The first and last few taps are small enough that the convolution is
/// dominated by the center tap (index 23).
#[rustfmt::skip]
pub const COEFFICIENTS: [f32; NUM_COEFFICIENTS] = [
    -0.004784039470875, -0.0008445600274623, -0.005995017410417,   0.01532470901036,
     0.002540625979976,  -0.001495247396832,  0.004631244912294, -0.008415522781061,
     -0.01444585634034,    0.01542483390079,     0.029487031321, -0.008023471201025,
     -0.02775560048802, -0.0006758846045277,  0.001108071937969, -0.007160256929624,
      0.04523891525131,    0.05089671015453,  -0.08153030852143,   -0.1232645152865,
      0.07987269111248,     0.1935774570845,  -0.03306034804442,    0.7774981428465,
     -0.03306034804442,     0.1935774570845,   0.07987269111248,   -0.1232645152865,
     -0.08153030852143,    0.05089671015453,   0.04523891525131, -0.007160256929624,
     0.001108071937969, -0.0006758846045277,  -0.02775560048802, -0.008023471201025,
        0.029487031321,    0.01542483390079,  -0.01444585634034, -0.008415522781061,
     0.004631244912294,  -0.001495247396832,  0.002540625979976,   0.01532470901036,
     -0.005995017410417, -0.0008445600274623, -0.004784039470875,
];

/// Returns true when `taps[i]` and `taps[len - 1 - i]` agree within `tolerance`
/// for every `i`.
pub fn is_symmetric(taps: &[f32], tolerance: f32) -> bool {
    taps.iter()
        .zip(taps.iter().rev())
        .all(|(a, b)| (a - b).abs() <= tolerance)
}

/// Gain at 0 Hz (sum of the taps).
pub fn dc_gain(taps: &[f32]) -> f32 {
    taps.iter().sum()
}

/// Magnitude of the frequency response `|H(e^{jω})|` at `freq_hz`.
pub fn magnitude_response(taps: &[f32], freq_hz: f32, sample_rate: f32) -> f32 {
    let omega = 2.0 * PI * freq_hz as f64 / sample_rate as f64;
    let response: Complex<f64> = taps
        .iter()
        .enumerate()
        .map(|(k, &tap)| Complex::from_polar(tap as f64, -omega * k as f64))
        .sum();
    response.norm() as f32
}

/// Magnitude response in dB, floored at -200 dB for exact nulls.
pub fn magnitude_response_db(taps: &[f32], freq_hz: f32, sample_rate: f32) -> f32 {
    let mag = magnitude_response(taps, freq_hz, sample_rate).max(1e-10);
    20.0 * mag.log10()
}
