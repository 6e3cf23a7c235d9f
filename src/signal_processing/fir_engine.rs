use crate::constants::{NUM_COEFFICIENTS, OUTPUT_OFFSET};
use crate::signal_processing::{COEFFICIENTS, FirFilterCore};

/// Offset-correcting FIR stage of the sample loop
///
/// Raw converter codes are centered on the output offset. The engine removes
/// that bias, runs the zero-mean value through the convolution and returns the
/// zero-mean result; re-adding the offset is the caller's job.
pub struct FirFilterEngine<const N: usize = NUM_COEFFICIENTS> {
    core: FirFilterCore<N>,
    offset: f32,
}

impl FirFilterEngine<NUM_COEFFICIENTS> {
    /// Engine with the built-in coefficient set and converter midpoint
    pub const fn reference() -> Self {
        Self::new(COEFFICIENTS, OUTPUT_OFFSET as f32)
    }
}

impl Default for FirFilterEngine<NUM_COEFFICIENTS> {
    fn default() -> Self {
        Self::reference()
    }
}

impl<const N: usize> FirFilterEngine<N> {
    pub const fn new(coefficients: [f32; N], offset: f32) -> Self {
        Self {
            core: FirFilterCore::new(coefficients),
            offset,
        }
    }

    /// Filter one raw sample. Never fails and never saturates.
    pub fn filter(&mut self, raw_sample: f32) -> f32 {
        let centered = raw_sample - self.offset;
        self.core.process(centered)
    }

    /// Offset-corrected inputs, newest first
    pub fn history(&self) -> [f32; N] {
        self.core.history()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn coefficients(&self) -> &[f32; N] {
        self.core.taps()
    }

    pub fn num_taps(&self) -> usize {
        self.core.num_taps()
    }

    pub fn group_delay_samples(&self) -> usize {
        self.core.group_delay_samples()
    }

    pub fn reset(&mut self) {
        self.core.reset();
    }
}
