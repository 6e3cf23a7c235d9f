//! Host stand-ins for the board collaborators.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::constants::{OUTPUT_MAX, OUTPUT_OFFSET};
use crate::error::{LoopError, Result};
use crate::hal::{SampleSink, SampleSource, SquareWavePin, TickTrigger};
use crate::signal_processing::Level;

/// Virtual timer for host runs
///
/// Elapsed periods are queued with [`VirtualTimer::fire`]; each
/// `clear_pending` services one of them. A free-running timer is always
/// pending.
#[derive(Debug, Default)]
pub struct VirtualTimer {
    queued: u64,
    free_running: bool,
    init_error: Option<String>,
    started: bool,
}

impl VirtualTimer {
    /// Timer with nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Timer with `ticks` periods already elapsed
    pub fn with_ticks(ticks: u64) -> Self {
        Self {
            queued: ticks,
            ..Self::default()
        }
    }

    pub fn free_running() -> Self {
        Self {
            free_running: true,
            ..Self::default()
        }
    }

    /// Timer whose `start` reports the given failure
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            init_error: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn fire(&mut self, periods: u64) {
        self.queued += periods;
    }

    pub fn queued(&self) -> u64 {
        self.queued
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl TickTrigger for VirtualTimer {
    fn start(&mut self) -> Result<()> {
        if let Some(reason) = &self.init_error {
            return Err(LoopError::TriggerInit(reason.clone()));
        }
        self.started = true;
        Ok(())
    }

    fn is_pending(&self) -> bool {
        self.free_running || self.queued > 0
    }

    fn clear_pending(&mut self) {
        if !self.free_running {
            self.queued = self.queued.saturating_sub(1);
        }
    }
}

/// Converter fed from a queue of prerecorded codes
///
/// One conversion is in flight from construction on, so the first `read`
/// already has a sample. Once the queue runs dry the last conversion is held,
/// the way a converter data register keeps its value.
#[derive(Debug)]
pub struct BufferedSource {
    queue: VecDeque<u16>,
    latched: u16,
    in_flight: Option<u16>,
}

impl BufferedSource {
    pub fn new<I: IntoIterator<Item = u16>>(samples: I) -> Self {
        let mut queue: VecDeque<u16> = samples.into_iter().collect();
        let in_flight = queue.pop_front();
        Self {
            queue,
            latched: OUTPUT_OFFSET,
            in_flight,
        }
    }

    pub fn push(&mut self, samples: &[u16]) {
        self.queue.extend(samples.iter().copied());
        if self.in_flight.is_none() {
            self.in_flight = self.queue.pop_front();
        }
    }

    /// Samples not yet converted, including the one in flight
    pub fn remaining(&self) -> usize {
        self.queue.len() + usize::from(self.in_flight.is_some())
    }
}

impl SampleSource for BufferedSource {
    fn read(&mut self) -> u16 {
        if let Some(code) = self.in_flight.take() {
            self.latched = code;
        }
        self.latched
    }

    fn start(&mut self) {
        if self.in_flight.is_none() {
            self.in_flight = self.queue.pop_front();
        }
    }
}

/// Sink that keeps every code written to it
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    samples: Vec<u16>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u16> {
        self.samples
    }
}

impl SampleSink for RecordingSink {
    fn write(&mut self, sample: u16) {
        self.samples.push(sample);
    }
}

/// Pin that remembers its level and every transition
#[derive(Debug, Default, Clone)]
pub struct RecordingPin {
    level: Level,
    transitions: Vec<Level>,
}

impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn transitions(&self) -> &[Level] {
        &self.transitions
    }
}

impl SquareWavePin for RecordingPin {
    fn set_level(&mut self, level: Level) {
        self.level = level;
        self.transitions.push(level);
    }
}

/// Jumper from the square-wave pin to the analog input
///
/// The self-test setup of the reference board: the GPIO drives the ADC pin
/// directly, so the filter sees a square wave swinging between `low_code`
/// and `high_code`.
#[derive(Debug, Clone)]
pub struct LoopbackWire {
    level: Rc<Cell<Level>>,
    high_code: u16,
    low_code: u16,
}

impl LoopbackWire {
    pub fn new(high_code: u16, low_code: u16) -> Self {
        Self {
            level: Rc::new(Cell::new(Level::Low)),
            high_code: high_code.min(OUTPUT_MAX),
            low_code: low_code.min(OUTPUT_MAX),
        }
    }

    pub fn pin(&self) -> LoopbackPin {
        LoopbackPin {
            level: Rc::clone(&self.level),
            transitions: 0,
        }
    }

    pub fn adc(&self) -> LoopbackAdc {
        LoopbackAdc {
            wire: self.clone(),
            latched: OUTPUT_OFFSET,
            in_flight: None,
        }
    }

    fn code(&self) -> u16 {
        match self.level.get() {
            Level::High => self.high_code,
            Level::Low => self.low_code,
        }
    }
}

#[derive(Debug)]
pub struct LoopbackPin {
    level: Rc<Cell<Level>>,
    transitions: u64,
}

impl LoopbackPin {
    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

impl SquareWavePin for LoopbackPin {
    fn set_level(&mut self, level: Level) {
        self.level.set(level);
        self.transitions += 1;
    }
}

/// ADC end of the loopback wire. `start` samples the wire; the value becomes
/// readable on the next `read`.
#[derive(Debug)]
pub struct LoopbackAdc {
    wire: LoopbackWire,
    latched: u16,
    in_flight: Option<u16>,
}

impl SampleSource for LoopbackAdc {
    fn read(&mut self) -> u16 {
        if let Some(code) = self.in_flight.take() {
            self.latched = code;
        }
        self.latched
    }

    fn start(&mut self) {
        self.in_flight = Some(self.wire.code());
    }
}
