/// Fixed-length FIR convolution over a circular history buffer
///
/// Holds the N most recent inputs and the N tap coefficients. A new sample is
/// written at the write index and the dot product reads the buffer backwards
/// from there, so the newest sample meets `taps[0]` and the sample from `k`
/// calls ago meets `taps[k]`. Inserting is O(1); nothing is shifted.
pub struct FirFilterCore<const N: usize> {
    taps: [f32; N],
    history: [f32; N],
    pos: usize,
}

impl<const N: usize> FirFilterCore<N> {
    /// Create a new FIR filter core with the given tap coefficients and an
    /// all-zero history
    pub const fn new(taps: [f32; N]) -> Self {
        assert!(N > 0, "FIR filter needs at least one tap");
        Self {
            taps,
            history: [0.0; N],
            pos: 0,
        }
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, sample: f32) -> f32 {
        self.history[self.pos] = sample;

        let mut output = 0.0f32;

        // Walk the ring backwards in two contiguous ranges to keep modulo
        // arithmetic out of the inner loop.
        let mut tap_i = 0usize;
        for delay_idx in (0..=self.pos).rev() {
            output += self.taps[tap_i] * self.history[delay_idx];
            tap_i += 1;
        }
        for delay_idx in ((self.pos + 1)..N).rev() {
            output += self.taps[tap_i] * self.history[delay_idx];
            tap_i += 1;
        }
        debug_assert_eq!(tap_i, N);

        self.pos += 1;
        if self.pos == N {
            self.pos = 0;
        }
        output
    }

    /// History in logical order: index 0 is the newest sample, index N-1 the
    /// oldest still retained.
    pub fn history(&self) -> [f32; N] {
        let newest = if self.pos == 0 { N - 1 } else { self.pos - 1 };
        core::array::from_fn(|k| self.history[(newest + N - k) % N])
    }

    /// Zero the history and rewind the write index
    pub fn reset(&mut self) {
        self.history = [0.0; N];
        self.pos = 0;
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        N
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        (N - 1) / 2
    }

    /// Get access to the tap coefficients
    pub fn taps(&self) -> &[f32; N] {
        &self.taps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shifted-array convolution: the newest sample sits at index 0 and every
    /// call moves the rest one slot toward the tail.
    struct ShiftingFir<const N: usize> {
        taps: [f32; N],
        history: [f32; N],
    }

    impl<const N: usize> ShiftingFir<N> {
        fn process(&mut self, sample: f32) -> f32 {
            let mut sum = sample * self.taps[0];
            for i in (0..N - 1).rev() {
                self.history[i + 1] = self.history[i];
            }
            self.history[0] = sample;
            for i in 1..N {
                sum += self.history[i] * self.taps[i];
            }
            sum
        }
    }

    #[test]
    fn test_matches_shifting_formulation() {
        let taps = [0.1, -0.4, 0.7, 0.25, -0.05];
        let mut ring = FirFilterCore::new(taps);
        let mut shifting = ShiftingFir {
            taps,
            history: [0.0; 5],
        };

        for i in 0..200 {
            let x = ((i * 37) % 23) as f32 - 11.0;
            let a = ring.process(x);
            let b = shifting.process(x);
            assert_eq!(a, b, "Mismatch at sample {}", i);
            assert_eq!(ring.history(), shifting.history);
        }
    }

    #[test]
    fn test_history_newest_first() {
        let mut fir = FirFilterCore::new([0.0; 4]);
        for x in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
            fir.process(x);
        }
        assert_eq!(fir.history(), [6.0, 5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_history_starts_zeroed() {
        let fir = FirFilterCore::new([1.0; 8]);
        assert_eq!(fir.history(), [0.0; 8]);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut fir = FirFilterCore::new([0.5, 0.5]);
        fir.process(10.0);
        fir.process(20.0);
        fir.reset();
        assert_eq!(fir.history(), [0.0, 0.0]);
        assert_eq!(fir.process(2.0), 1.0);
    }

    #[test]
    fn test_single_tap_is_gain() {
        let mut fir = FirFilterCore::new([3.0]);
        let out: Vec<f32> = [1.0, -2.0, 0.5].map(|x| fir.process(x)).to_vec();
        assert_eq!(out, vec![3.0, -6.0, 1.5]);
    }

    #[test]
    fn test_group_delay() {
        let fir = FirFilterCore::new([0.0; 47]);
        assert_eq!(fir.num_taps(), 47);
        assert_eq!(fir.group_delay_samples(), 23);
    }
}
