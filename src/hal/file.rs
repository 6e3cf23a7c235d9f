use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::WavReader;

use crate::error::{LoopError, Result};
use crate::hal::convert::{code_from_pcm, code_from_unit};
use crate::hal::sim::BufferedSource;

/// One channel of a WAV file, converted to converter codes
pub struct WavFileSource {
    codes: Vec<u16>,
    sample_rate: u32,
    channels: u16,
}

impl WavFileSource {
    /// Load `channel` (0-based) from the WAV file at `path`
    pub fn open<P: AsRef<Path>>(path: P, channel: u16) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if channel >= spec.channels {
            return Err(LoopError::Config(format!(
                "Channel {} requested from a {}-channel WAV file",
                channel, spec.channels
            )));
        }

        let samples = Self::read_samples(reader, &spec)?;
        let codes = samples
            .iter()
            .skip(channel as usize)
            .step_by(spec.channels as usize)
            .copied()
            .collect();

        Ok(Self {
            codes,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> Result<Vec<u16>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(code_from_unit))
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let bits = spec.bits_per_sample;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| code_from_pcm(v, bits)))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Queue the whole file behind a converter
    pub fn into_source(self) -> BufferedSource {
        BufferedSource::new(self.codes)
    }
}
