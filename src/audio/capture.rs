use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

use crate::error::{LoopError, Result};

/// Input stream delivering interleaved f32 blocks over a channel
pub struct AudioCapture {
    stream: cpal::Stream,
}

impl AudioCapture {
    pub fn new(
        sample_rate: u32,
        channels: u16,
        buffer_size: usize,
        tx: Sender<Vec<f32>>,
    ) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| LoopError::AudioDevice("No input device found".into()))?;

        match device.description() {
            Ok(desc) => log::info!("Input device: {:?}", desc),
            Err(_) => log::info!("Input device: Unknown"),
        }

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Fixed(buffer_size as u32),
        };

        // The callback only forwards data; the loop state lives on the
        // processing thread.
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if tx.try_send(data.to_vec()).is_err() {
                        log::warn!("Processing thread not keeping up, dropped a block");
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| LoopError::AudioStream(format!("{}", e)))?;

        stream
            .play()
            .map_err(|e| LoopError::AudioStream(format!("{}", e)))?;

        Ok(Self { stream })
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        let _ = self.stream.pause();
    }
}
