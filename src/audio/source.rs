use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use super::AudioCapture;
use crate::config::AudioConfig;
use crate::error::{LoopError, Result};
use crate::hal::convert::code_from_unit;

/// Live input device, delivered as blocks of converter codes
pub struct LiveInput {
    rx: Receiver<Vec<f32>>,
    channels: usize,
    input_channel: usize,
    _capture: AudioCapture,
}

impl LiveInput {
    pub fn new(config: &AudioConfig, sample_rate: u32) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(16);
        let capture = AudioCapture::new(sample_rate, config.channels, config.buffer_size, tx)?;
        Ok(Self {
            rx,
            channels: config.channels as usize,
            input_channel: config.input_channel as usize,
            _capture: capture,
        })
    }

    /// Wait up to `timeout` for the next block.
    ///
    /// # Errors
    /// `LoopError::AudioStream` if nothing arrives in time or the stream has
    /// shut down.
    pub fn next_block(&self, timeout: Duration) -> Result<Vec<u16>> {
        match self.rx.recv_timeout(timeout) {
            Ok(data) => Ok(deinterleave_codes(&data, self.channels, self.input_channel)),
            Err(RecvTimeoutError::Timeout) => Err(LoopError::AudioStream(format!(
                "no audio received for {:?}",
                timeout
            ))),
            Err(RecvTimeoutError::Disconnected) => {
                Err(LoopError::AudioStream("audio stream closed".into()))
            }
        }
    }
}

/// Pick one channel out of interleaved frames and convert it to codes
pub fn deinterleave_codes(interleaved: &[f32], channels: usize, channel: usize) -> Vec<u16> {
    interleaved
        .chunks_exact(channels.max(1))
        .filter_map(|frame| frame.get(channel).copied())
        .map(code_from_unit)
        .collect()
}
