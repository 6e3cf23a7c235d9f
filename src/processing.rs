use crate::config::LoopConfig;
use crate::constants::NUM_COEFFICIENTS;
use crate::error::Result;
use crate::signal_processing::{COEFFICIENTS, FirFilterEngine, PhaseGenerator};

/// State touched by the tick handler and nothing else: the filter history,
/// the square-wave phase counter and the output code range. Owned by value by
/// the dispatcher.
pub struct ProcessingContext<const N: usize = NUM_COEFFICIENTS> {
    filter: FirFilterEngine<N>,
    phase: PhaseGenerator,
    output_offset: u16,
    output_max: u16,
}

impl ProcessingContext<NUM_COEFFICIENTS> {
    /// Built-in coefficient set with the given timing
    pub fn new(config: &LoopConfig) -> Result<Self> {
        Self::with_coefficients(config, COEFFICIENTS)
    }
}

impl<const N: usize> ProcessingContext<N> {
    pub fn with_coefficients(config: &LoopConfig, coefficients: [f32; N]) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            filter: FirFilterEngine::new(coefficients, config.output_offset as f32),
            phase: PhaseGenerator::new(config.tick_rate_hz, config.square_wave_hz)?,
            output_offset: config.output_offset,
            output_max: config.output_max,
        })
    }

    /// Code the filtered value is re-centered on. Same offset the filter
    /// subtracts from its input.
    pub fn output_offset(&self) -> u16 {
        self.output_offset
    }

    pub fn output_max(&self) -> u16 {
        self.output_max
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.phase.tick_rate_hz()
    }

    pub fn filter(&self) -> &FirFilterEngine<N> {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FirFilterEngine<N> {
        &mut self.filter
    }

    pub fn phase(&self) -> &PhaseGenerator {
        &self.phase
    }

    pub fn phase_mut(&mut self) -> &mut PhaseGenerator {
        &mut self.phase
    }
}
