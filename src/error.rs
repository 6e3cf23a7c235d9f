use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoopError {
    #[error("Tick trigger initialization failed: {0}")]
    TriggerInit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, LoopError>;
