pub mod capture;
pub mod source;

pub use capture::AudioCapture;
pub use source::{LiveInput, deinterleave_codes};
