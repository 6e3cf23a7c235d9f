use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::constants::OUTPUT_OFFSET;
use crate::error::Result;
use crate::hal::convert::code_to_pcm16;
use crate::signal_processing::Level;

const PIN_PCM_LEVEL: i16 = i16::MAX / 2;

/// Write a stereo 16-bit recording: left = output codes, right = pin level.
/// The shorter channel is padded with its last value.
pub fn save_recording<P: AsRef<Path>>(
    path: P,
    output: &[u16],
    pin: &[Level],
    sample_rate: u32,
) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)?;

    let frames = output.len().max(pin.len());
    for i in 0..frames {
        let code = output.get(i).or(output.last()).copied().unwrap_or(OUTPUT_OFFSET);
        let level = pin.get(i).or(pin.last()).copied().unwrap_or_default();
        writer.write_sample(code_to_pcm16(code))?;
        writer.write_sample(if level.is_high() {
            PIN_PCM_LEVEL
        } else {
            -PIN_PCM_LEVEL
        })?;
    }

    writer.finalize()?;
    Ok(())
}
