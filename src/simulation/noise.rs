use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::constants::OUTPUT_MAX;
use crate::error::{LoopError, Result};
use crate::hal::SampleSource;

/// Adds Gaussian noise (in converter codes) to every conversion of the inner
/// source, clipped to the converter range
pub struct NoisySource<S> {
    inner: S,
    normal: Normal<f32>,
    rng: ChaCha8Rng,
}

impl<S: SampleSource> NoisySource<S> {
    pub fn new(inner: S, std_dev_codes: f32, seed: Option<u64>) -> Result<Self> {
        if !(std_dev_codes.is_finite() && std_dev_codes >= 0.0) {
            return Err(LoopError::Config(format!(
                "Noise level must be a non-negative number of codes, got {}",
                std_dev_codes
            )));
        }
        let normal = Normal::new(0.0, std_dev_codes)
            .map_err(|e| LoopError::Config(format!("Invalid noise level: {}", e)))?;
        Ok(Self {
            inner,
            normal,
            rng: create_rng(seed),
        })
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

impl<S: SampleSource> SampleSource for NoisySource<S> {
    fn read(&mut self) -> u16 {
        let noisy = self.inner.read() as f32 + self.normal.sample(&mut self.rng);
        noisy.round().clamp(0.0, OUTPUT_MAX as f32) as u16
    }

    fn start(&mut self) {
        self.inner.start();
    }
}
