pub mod audio;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod hal;
pub mod processing;
pub mod runner;
pub mod signal_processing;
pub mod stats;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{HostConfig, LoopConfig};
pub use dispatcher::{DispatcherState, SampleTickDispatcher, TickOutcome};
pub use error::{LoopError, Result};
pub use processing::ProcessingContext;
pub use wav::save_recording;
