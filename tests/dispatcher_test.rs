use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use firloop::config::LoopConfig;
use firloop::constants::{NUM_COEFFICIENTS, OUTPUT_MAX, OUTPUT_OFFSET};
use firloop::dispatcher::to_output_code;
use firloop::hal::{
    BufferedSource, NullPin, RecordingPin, RecordingSink, SampleSink, SampleSource, SquareWavePin,
    TickTrigger, VirtualTimer,
};
use firloop::signal_processing::{COEFFICIENTS, Level};
use firloop::{DispatcherState, LoopError, ProcessingContext, SampleTickDispatcher, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    IsPending,
    ClearPending,
    Read,
    Start,
    Write(u16),
    SetLevel(Level),
}

type EventLog = Rc<RefCell<Vec<Event>>>;

struct LoggedSource {
    log: EventLog,
    code: u16,
}

impl SampleSource for LoggedSource {
    fn read(&mut self) -> u16 {
        self.log.borrow_mut().push(Event::Read);
        self.code
    }

    fn start(&mut self) {
        self.log.borrow_mut().push(Event::Start);
    }
}

struct LoggedSink(EventLog);

impl SampleSink for LoggedSink {
    fn write(&mut self, sample: u16) {
        self.0.borrow_mut().push(Event::Write(sample));
    }
}

struct LoggedTrigger {
    log: EventLog,
    pending: bool,
}

impl TickTrigger for LoggedTrigger {
    fn is_pending(&self) -> bool {
        self.log.borrow_mut().push(Event::IsPending);
        self.pending
    }

    fn clear_pending(&mut self) {
        self.log.borrow_mut().push(Event::ClearPending);
        self.pending = false;
    }
}

struct LoggedPin(EventLog);

impl SquareWavePin for LoggedPin {
    fn set_level(&mut self, level: Level) {
        self.0.borrow_mut().push(Event::SetLevel(level));
    }
}

fn logged_dispatcher(
    config: &LoopConfig,
    code: u16,
) -> (
    SampleTickDispatcher<LoggedSource, LoggedSink, LoggedTrigger, LoggedPin>,
    EventLog,
) {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = SampleTickDispatcher::new(
        ProcessingContext::new(config).unwrap(),
        LoggedSource {
            log: Rc::clone(&log),
            code,
        },
        LoggedSink(Rc::clone(&log)),
        LoggedTrigger {
            log: Rc::clone(&log),
            pending: false,
        },
        LoggedPin(Rc::clone(&log)),
    );
    (dispatcher, log)
}

#[test]
fn test_tick_steps_run_in_order() {
    // 2 Hz ticks and a 1 Hz target give a half period of one tick, so every
    // tick toggles.
    let config = LoopConfig {
        tick_rate_hz: 2,
        square_wave_hz: 1,
        ..LoopConfig::default()
    };
    let (mut dispatcher, log) = logged_dispatcher(&config, OUTPUT_OFFSET);

    dispatcher.trigger_mut().pending = true;
    let outcome = dispatcher.on_tick();

    assert_eq!(
        outcome,
        TickOutcome::Processed {
            input: OUTPUT_OFFSET,
            output: OUTPUT_OFFSET,
            toggled: Some(Level::High),
        }
    );
    assert_eq!(
        *log.borrow(),
        vec![
            Event::IsPending,
            Event::SetLevel(Level::High),
            Event::Read,
            Event::Start,
            Event::Write(OUTPUT_OFFSET),
            Event::ClearPending,
        ]
    );
}

#[test]
fn test_one_call_per_collaborator_per_tick() {
    let config = LoopConfig::default();
    let (mut dispatcher, log) = logged_dispatcher(&config, 3000);

    for _ in 0..100 {
        log.borrow_mut().clear();
        dispatcher.trigger_mut().pending = true;
        assert!(dispatcher.on_tick().is_processed());

        let events = log.borrow();
        let count = |e: fn(&Event) -> bool| events.iter().filter(|x| e(x)).count();
        assert_eq!(count(|e| *e == Event::IsPending), 1);
        assert_eq!(count(|e| *e == Event::Read), 1);
        assert_eq!(count(|e| *e == Event::Start), 1);
        assert_eq!(count(|e| matches!(e, Event::Write(_))), 1);
        assert_eq!(count(|e| *e == Event::ClearPending), 1);
        assert!(count(|e| matches!(e, Event::SetLevel(_))) <= 1);
    }
    assert_eq!(dispatcher.ticks(), 100);
}

#[test]
fn test_not_pending_is_a_no_op() {
    let config = LoopConfig::default();
    let (mut dispatcher, log) = logged_dispatcher(&config, 3000);

    assert_eq!(dispatcher.on_tick(), TickOutcome::Skipped);
    assert_eq!(*log.borrow(), vec![Event::IsPending]);
    assert_eq!(dispatcher.ticks(), 0);
    assert_eq!(dispatcher.state(), DispatcherState::Idle);
    assert_eq!(dispatcher.context().phase().counter(), 0);
    assert_eq!(
        dispatcher.context().filter().history(),
        [0.0; NUM_COEFFICIENTS]
    );
}

#[test]
fn test_trigger_init_failure_is_reported() {
    let config = LoopConfig::default();
    let mut dispatcher = SampleTickDispatcher::new(
        ProcessingContext::new(&config).unwrap(),
        BufferedSource::new([OUTPUT_OFFSET]),
        RecordingSink::new(),
        VirtualTimer::failing("timer clock disabled"),
        NullPin,
    );

    let err = dispatcher.start().unwrap_err();
    assert!(matches!(err, LoopError::TriggerInit(_)));
    assert!(err.to_string().contains("timer clock disabled"));
    assert!(!dispatcher.trigger().is_started());
}

#[test]
fn test_pin_toggles_every_25_ticks() {
    let config = LoopConfig::default();
    let mut dispatcher = SampleTickDispatcher::new(
        ProcessingContext::new(&config).unwrap(),
        BufferedSource::new(vec![OUTPUT_OFFSET; 100]),
        RecordingSink::new(),
        VirtualTimer::with_ticks(100),
        RecordingPin::new(),
    );
    dispatcher.start().unwrap();

    let mut toggle_ticks = Vec::new();
    for tick in 1..=100u64 {
        if let TickOutcome::Processed {
            toggled: Some(_), ..
        } = dispatcher.on_tick()
        {
            toggle_ticks.push(tick);
        }
    }

    assert_eq!(toggle_ticks, vec![25, 50, 75, 100]);
    assert_eq!(
        dispatcher.pin().transitions(),
        &[Level::High, Level::Low, Level::High, Level::Low]
    );
}

#[test]
fn test_constant_offset_input_gives_offset_output() {
    let config = LoopConfig::default();
    let mut dispatcher = SampleTickDispatcher::new(
        ProcessingContext::new(&config).unwrap(),
        BufferedSource::new(vec![OUTPUT_OFFSET; 1000]),
        RecordingSink::new(),
        VirtualTimer::with_ticks(1000),
        NullPin,
    );

    assert_eq!(dispatcher.run_polled(None), 1000);
    assert_eq!(dispatcher.sink().samples(), vec![OUTPUT_OFFSET; 1000].as_slice());
    assert_eq!(dispatcher.on_tick(), TickOutcome::Skipped);
}

#[test]
fn test_scaled_impulse_reaches_sink() {
    let amplitude = 1000.0;
    let config = LoopConfig::default();
    let mut input = vec![OUTPUT_OFFSET; NUM_COEFFICIENTS];
    input[0] = OUTPUT_OFFSET + amplitude as u16;

    let mut dispatcher = SampleTickDispatcher::new(
        ProcessingContext::new(&config).unwrap(),
        BufferedSource::new(input),
        RecordingSink::new(),
        VirtualTimer::with_ticks(NUM_COEFFICIENTS as u64),
        NullPin,
    );
    dispatcher.run_polled(None);

    let expected: Vec<u16> = COEFFICIENTS
        .iter()
        .map(|c| to_output_code(amplitude * c, OUTPUT_OFFSET, OUTPUT_MAX))
        .collect();
    assert_eq!(dispatcher.sink().samples(), expected.as_slice());
    // Center tap survives truncation, the outer taps vanish.
    assert_eq!(expected[23], OUTPUT_OFFSET + 777);
    assert_eq!(expected[0], OUTPUT_OFFSET - 4);
}

#[test]
fn test_output_saturates_at_converter_limits() {
    // A single tap of 4 turns a full-scale swing into one far beyond the
    // converter range.
    let config = LoopConfig::default();
    let context = ProcessingContext::with_coefficients(&config, [4.0]).unwrap();
    let mut dispatcher = SampleTickDispatcher::new(
        context,
        BufferedSource::new([OUTPUT_MAX, 0, OUTPUT_OFFSET + 1]),
        RecordingSink::new(),
        VirtualTimer::with_ticks(3),
        NullPin,
    );
    dispatcher.run_polled(None);
    assert_eq!(
        dispatcher.sink().samples(),
        &[OUTPUT_MAX, 0, OUTPUT_OFFSET + 4]
    );
}

#[test]
fn test_run_polled_respects_limit() {
    let config = LoopConfig::default();
    let mut dispatcher = SampleTickDispatcher::new(
        ProcessingContext::new(&config).unwrap(),
        BufferedSource::new(vec![OUTPUT_OFFSET; 10]),
        RecordingSink::new(),
        VirtualTimer::free_running(),
        NullPin,
    );
    assert_eq!(dispatcher.run_polled(Some(250)), 250);
    assert_eq!(dispatcher.ticks(), 250);
    assert!((dispatcher.elapsed_secs() - 250.0 / 44_000.0).abs() < 1e-12);
}

#[test]
fn test_handler_fits_in_tick_period() {
    let config = LoopConfig::default();
    let ticks = 44_000u64;
    let input: Vec<u16> = (0..ticks).map(|i| ((i * 97) % 4096) as u16).collect();
    let mut dispatcher = SampleTickDispatcher::new(
        ProcessingContext::new(&config).unwrap(),
        BufferedSource::new(input),
        RecordingSink::new(),
        VirtualTimer::with_ticks(ticks),
        NullPin,
    );

    let started = Instant::now();
    let processed = dispatcher.run_polled(None);
    let elapsed = started.elapsed();

    assert_eq!(processed, ticks);
    let per_tick = elapsed.as_secs_f64() / ticks as f64;
    let period = config.tick_period_secs() as f64;
    assert!(
        per_tick < period,
        "Mean handler time {:.3} us exceeds tick period {:.3} us",
        per_tick * 1e6,
        period * 1e6
    );
}

#[test]
fn test_output_centered_on_context_offset() {
    let config = LoopConfig {
        output_offset: 1000,
        ..LoopConfig::default()
    };
    let mut dispatcher = SampleTickDispatcher::new(
        ProcessingContext::new(&config).unwrap(),
        BufferedSource::new(vec![1000; 60]),
        RecordingSink::new(),
        VirtualTimer::with_ticks(60),
        NullPin,
    );
    dispatcher.run_polled(None);
    assert_eq!(dispatcher.sink().samples(), vec![1000; 60].as_slice());
}
