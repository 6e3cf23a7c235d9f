use crate::error::Result;
use crate::signal_processing::Level;

/// Analog input converter
///
/// `read` returns the most recent completed conversion and `start` arms the
/// next one, so acquisition overlaps with the following tick period. Neither
/// call may block.
pub trait SampleSource {
    fn read(&mut self) -> u16;
    fn start(&mut self);
}

/// Analog output converter. Accepts unsigned codes centered on the output
/// offset; saturation is already applied by the caller.
pub trait SampleSink {
    fn write(&mut self, sample: u16);
}

/// Periodic tick source (hardware timer or a host stand-in)
pub trait TickTrigger {
    /// Bring the trigger up. A failure here is fatal to the loop.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_pending(&self) -> bool;

    /// Acknowledge the current tick so the trigger can fire again
    fn clear_pending(&mut self);
}

/// Digital output carrying the square wave
pub trait SquareWavePin {
    fn set_level(&mut self, level: Level);
}

impl<T: SampleSource + ?Sized> SampleSource for &mut T {
    fn read(&mut self) -> u16 {
        (**self).read()
    }

    fn start(&mut self) {
        (**self).start()
    }
}

impl<T: SampleSink + ?Sized> SampleSink for &mut T {
    fn write(&mut self, sample: u16) {
        (**self).write(sample)
    }
}

impl<T: TickTrigger + ?Sized> TickTrigger for &mut T {
    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn is_pending(&self) -> bool {
        (**self).is_pending()
    }

    fn clear_pending(&mut self) {
        (**self).clear_pending()
    }
}

impl<T: SquareWavePin + ?Sized> SquareWavePin for &mut T {
    fn set_level(&mut self, level: Level) {
        (**self).set_level(level)
    }
}

/// Pin that goes nowhere, for boards without a square-wave output
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPin;

impl SquareWavePin for NullPin {
    fn set_level(&mut self, _level: Level) {}
}
