pub mod convert;
pub mod file;
pub mod sim;
pub mod traits;

pub use file::WavFileSource;
pub use sim::{
    BufferedSource, LoopbackAdc, LoopbackPin, LoopbackWire, RecordingPin, RecordingSink,
    VirtualTimer,
};
pub use traits::{NullPin, SampleSink, SampleSource, SquareWavePin, TickTrigger};
