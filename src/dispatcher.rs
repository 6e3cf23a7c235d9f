use crate::constants::NUM_COEFFICIENTS;
use crate::error::Result;
use crate::hal::{SampleSink, SampleSource, SquareWavePin, TickTrigger};
use crate::processing::ProcessingContext;
use crate::signal_processing::Level;

/// Handler state. `Processing` only exists inside [`SampleTickDispatcher::on_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The trigger was not pending; nothing was touched.
    Skipped,
    Processed {
        /// Raw code read from the source
        input: u16,
        /// Code written to the sink
        output: u16,
        /// New pin level if the square wave flipped on this tick
        toggled: Option<Level>,
    },
}

impl TickOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, TickOutcome::Processed { .. })
    }
}

/// Re-center a filtered value and fit it to the sink's unsigned range.
///
/// The fractional part is truncated toward zero before the offset is added;
/// anything outside `[0, max]` saturates.
pub fn to_output_code(filtered: f32, offset: u16, max: u16) -> u16 {
    let code = (offset as i32).saturating_add(filtered as i32);
    code.clamp(0, max as i32) as u16
}

/// Fixed-rate tick handler
///
/// Owns the processing context and the board collaborators. Every pending
/// tick runs to completion: square-wave phase, input read, next conversion,
/// filter, re-centering, output write, acknowledge.
pub struct SampleTickDispatcher<S, K, T, P, const N: usize = NUM_COEFFICIENTS> {
    context: ProcessingContext<N>,
    source: S,
    sink: K,
    trigger: T,
    pin: P,
    state: DispatcherState,
    ticks: u64,
}

impl<S, K, T, P, const N: usize> SampleTickDispatcher<S, K, T, P, N>
where
    S: SampleSource,
    K: SampleSink,
    T: TickTrigger,
    P: SquareWavePin,
{
    /// Timing and output range come from `context`.
    pub fn new(
        context: ProcessingContext<N>,
        source: S,
        sink: K,
        trigger: T,
        pin: P,
    ) -> Self {
        Self {
            context,
            source,
            sink,
            trigger,
            pin,
            state: DispatcherState::Idle,
            ticks: 0,
        }
    }

    /// Bring up the tick trigger.
    ///
    /// # Errors
    /// Propagates the trigger's `LoopError::TriggerInit`. The loop cannot
    /// run without its trigger; callers halt on this error.
    pub fn start(&mut self) -> Result<()> {
        self.trigger.start()?;
        log::info!(
            "Tick trigger running at {} Hz, square wave {:.1} Hz ({} ticks per half period)",
            self.context.tick_rate_hz(),
            self.context.phase().actual_frequency_hz(),
            self.context.phase().half_period_ticks()
        );
        Ok(())
    }

    /// Service one tick if the trigger is pending.
    pub fn on_tick(&mut self) -> TickOutcome {
        if !self.trigger.is_pending() {
            return TickOutcome::Skipped;
        }
        debug_assert_eq!(self.state, DispatcherState::Idle);
        self.state = DispatcherState::Processing;

        let toggled = self.context.phase_mut().tick();
        if let Some(level) = toggled {
            self.pin.set_level(level);
        }

        let input = self.source.read();
        self.source.start();

        let filtered = self.context.filter_mut().filter(input as f32);
        let output = to_output_code(
            filtered,
            self.context.output_offset(),
            self.context.output_max(),
        );
        self.sink.write(output);

        self.trigger.clear_pending();
        self.ticks += 1;
        self.state = DispatcherState::Idle;

        TickOutcome::Processed {
            input,
            output,
            toggled,
        }
    }

    /// Service pending ticks until the trigger goes quiet or `max_ticks` have
    /// been processed. Returns the number processed.
    pub fn run_polled(&mut self, max_ticks: Option<u64>) -> u64 {
        let mut processed = 0;
        while max_ticks.is_none_or(|max| processed < max) {
            if !self.on_tick().is_processed() {
                break;
            }
            processed += 1;
        }
        processed
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Ticks processed since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.context.tick_rate_hz()
    }

    /// Loop time covered by the processed ticks
    pub fn elapsed_secs(&self) -> f64 {
        self.ticks as f64 / self.tick_rate_hz() as f64
    }

    pub fn context(&self) -> &ProcessingContext<N> {
        &self.context
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn trigger_mut(&mut self) -> &mut T {
        &mut self.trigger
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn into_parts(self) -> (ProcessingContext<N>, S, K, T, P) {
        (self.context, self.source, self.sink, self.trigger, self.pin)
    }
}
