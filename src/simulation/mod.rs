mod noise;

pub use noise::NoisySource;
