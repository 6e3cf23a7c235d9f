//! Host drivers: wire a board to the dispatcher, run it, record the result.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::audio::LiveInput;
use crate::config::{HostConfig, LoopConfig};
use crate::constants::MAX_RUN_SECS;
use crate::dispatcher::{SampleTickDispatcher, TickOutcome};
use crate::error::{LoopError, Result};
use crate::hal::{
    BufferedSource, LoopbackWire, RecordingPin, RecordingSink, SampleSink, SampleSource,
    SquareWavePin, TickTrigger, VirtualTimer, WavFileSource,
};
use crate::processing::ProcessingContext;
use crate::signal_processing::Level;
use crate::stats::{RunSummary, TickStats};

/// Everything a host run produced
pub struct RunReport {
    pub summary: RunSummary,
    /// Codes written to the sink, one per processed tick
    pub output: Vec<u16>,
    /// Square-wave level after each processed tick
    pub pin: Vec<Level>,
}

impl RunReport {
    pub fn save_wav<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::wav::save_recording(
            path,
            &self.output,
            &self.pin,
            self.summary.tick_rate_hz,
        )
    }
}

/// Service up to `max_ticks` pending ticks, timing each handler call.
/// Stops early at the first poll that finds the trigger idle; that poll is
/// recorded as a skipped tick. Returns the number of ticks processed.
pub fn drive<S, K, T, P>(
    dispatcher: &mut SampleTickDispatcher<S, K, T, P>,
    max_ticks: u64,
    stats: &mut TickStats,
    pin_levels: &mut Vec<Level>,
) -> u64
where
    S: SampleSource,
    K: SampleSink,
    T: TickTrigger,
    P: SquareWavePin,
{
    let mut processed = 0;
    while processed < max_ticks {
        let started = Instant::now();
        let outcome = dispatcher.on_tick();
        let elapsed = started.elapsed();

        stats.record(&outcome, elapsed);
        match outcome {
            TickOutcome::Skipped => break,
            TickOutcome::Processed { toggled, .. } => {
                if let Some(level) = toggled {
                    log::debug!("tick {}: pin {:?}", dispatcher.ticks(), level);
                }
                pin_levels.push(dispatcher.context().phase().level());
                processed += 1;
            }
        }
    }
    processed
}

/// Number of ticks covering `secs` of loop time
///
/// # Errors
/// `LoopError::Config` when `secs` is not positive or exceeds
/// [`MAX_RUN_SECS`].
pub fn tick_budget(secs: f64, tick_rate_hz: u32) -> Result<u64> {
    if !(secs.is_finite() && secs > 0.0 && secs <= MAX_RUN_SECS) {
        return Err(LoopError::Config(format!(
            "run length must be in (0, {}] s, got {}",
            MAX_RUN_SECS, secs
        )));
    }
    Ok((secs * tick_rate_hz as f64).round() as u64)
}

fn run_to_completion<S: SampleSource, P: SquareWavePin>(
    config: &LoopConfig,
    source: S,
    pin: P,
    ticks: u64,
) -> Result<RunReport> {
    let context = ProcessingContext::new(config)?;
    let mut dispatcher = SampleTickDispatcher::new(
        context,
        source,
        RecordingSink::new(),
        VirtualTimer::with_ticks(ticks),
        pin,
    );
    dispatcher.start()?;

    let mut stats = TickStats::new(config.tick_rate_hz);
    let mut pin_levels = Vec::with_capacity(ticks as usize);
    drive(&mut dispatcher, ticks, &mut stats, &mut pin_levels);

    let (_, _, sink, _, _) = dispatcher.into_parts();
    Ok(RunReport {
        summary: stats.summary(),
        output: sink.into_samples(),
        pin: pin_levels,
    })
}

/// Loopback self-test: the square-wave pin drives the analog input.
pub fn run_loopback(config: &LoopConfig, host: &HostConfig) -> Result<RunReport> {
    let sim = &host.simulation;
    let ticks = tick_budget(sim.duration_secs as f64, config.tick_rate_hz)?;
    let wire = LoopbackWire::new(sim.high_level, sim.low_level);

    log::info!(
        "Loopback: {} ticks, pin swings {}..{}",
        ticks,
        sim.low_level,
        sim.high_level
    );

    #[cfg(feature = "simulation")]
    if sim.noise_std > 0.0 {
        let adc = crate::simulation::NoisySource::new(wire.adc(), sim.noise_std, sim.seed)?;
        return run_to_completion(config, adc, wire.pin(), ticks);
    }

    #[cfg(not(feature = "simulation"))]
    if sim.noise_std > 0.0 {
        log::warn!("noise_std ignored: built without the `simulation` feature");
    }

    run_to_completion(config, wire.adc(), wire.pin(), ticks)
}

/// Run one channel of a WAV file through the loop, one tick per sample.
pub fn run_file<P: AsRef<Path>>(config: &LoopConfig, input: P, channel: u16) -> Result<RunReport> {
    let file = WavFileSource::open(input.as_ref(), channel)?;
    if file.is_empty() {
        return Err(LoopError::Config(format!(
            "{} contains no samples",
            input.as_ref().display()
        )));
    }
    if file.sample_rate() != config.tick_rate_hz {
        log::warn!(
            "Input sampled at {} Hz, loop runs at {} Hz; output is not resampled",
            file.sample_rate(),
            config.tick_rate_hz
        );
    }
    log::info!(
        "Processing {} samples from channel {} of {} ({} channels)",
        file.len(),
        channel,
        input.as_ref().display(),
        file.channels()
    );

    let ticks = file.len() as u64;
    run_to_completion(config, file.into_source(), RecordingPin::new(), ticks)
}

/// Feed a live input device through the loop for `duration`.
///
/// Each captured frame is one tick. Timer periods are queued as blocks
/// arrive and serviced on this thread.
pub fn run_live(config: &LoopConfig, host: &HostConfig, duration: Duration) -> Result<RunReport> {
    let target = tick_budget(duration.as_secs_f64(), config.tick_rate_hz)?;
    let input = LiveInput::new(&host.audio, config.tick_rate_hz)?;

    let rt_handle = audio_thread_priority::promote_current_thread_to_real_time(
        host.audio.buffer_size as u32,
        config.tick_rate_hz,
    );
    let _rt_handle = match rt_handle {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Could not set real-time priority: {}", e);
            None
        }
    };

    let context = ProcessingContext::new(config)?;
    let mut dispatcher = SampleTickDispatcher::new(
        context,
        BufferedSource::new(std::iter::empty()),
        RecordingSink::new(),
        VirtualTimer::new(),
        RecordingPin::new(),
    );
    dispatcher.start()?;

    let mut stats = TickStats::new(config.tick_rate_hz);
    let mut pin_levels = Vec::with_capacity(target as usize);
    let mut last_report = Instant::now();
    let block_timeout = Duration::from_secs(2);

    while dispatcher.ticks() < target {
        let block = input.next_block(block_timeout)?;
        dispatcher.source_mut().push(&block);
        dispatcher.trigger_mut().fire(block.len() as u64);

        let remaining = target - dispatcher.ticks();
        drive(&mut dispatcher, remaining, &mut stats, &mut pin_levels);

        if last_report.elapsed() >= Duration::from_secs(1) {
            log::debug!(
                "{} ticks, {} late, mean handler {:.2} us",
                stats.processed(),
                stats.late_ticks(),
                stats.mean_handler_us().unwrap_or(0.0)
            );
            last_report = Instant::now();
        }
    }

    let (_, _, sink, _, _) = dispatcher.into_parts();
    Ok(RunReport {
        summary: stats.summary(),
        output: sink.into_samples(),
        pin: pin_levels,
    })
}
