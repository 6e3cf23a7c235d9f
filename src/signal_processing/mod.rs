pub mod coefficients;
pub mod fir_core;
pub mod fir_engine;
pub mod square_wave;

pub use coefficients::COEFFICIENTS;
pub use fir_core::FirFilterCore;
pub use fir_engine::FirFilterEngine;
pub use square_wave::{Level, PhaseGenerator};
