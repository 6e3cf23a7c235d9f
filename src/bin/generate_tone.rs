use anyhow::{Context, Result};
use clap::Parser;
use hound::{WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::PathBuf;

use firloop::constants::TICK_RATE_HZ;

#[derive(Parser, Debug)]
#[command(name = "generate_tone")]
#[command(about = "Generate mono test tones for `firloop process`")]
struct Args {
    /// Output WAV file
    output: PathBuf,

    /// Tone frequencies in Hz, summed with equal weight
    #[arg(short, long, value_delimiter = ',', default_value = "440,6000")]
    frequencies: Vec<f32>,

    /// Duration in seconds
    #[arg(short, long, default_value_t = 1.0)]
    duration: f32,

    /// Peak amplitude of the sum (0-1)
    #[arg(short, long, default_value_t = 0.8)]
    amplitude: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = TICK_RATE_HZ)]
    sample_rate: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.frequencies.is_empty() {
        anyhow::bail!("at least one frequency is required");
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&args.output, spec)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let num_samples = (args.duration * args.sample_rate as f32) as usize;
    let gain = args.amplitude.clamp(0.0, 1.0) / args.frequencies.len() as f32;

    for i in 0..num_samples {
        let t = i as f32 / args.sample_rate as f32;
        let sample: f32 = args
            .frequencies
            .iter()
            .map(|f| (2.0 * PI * f * t).sin())
            .sum::<f32>()
            * gain;
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    println!(
        "Wrote {} samples ({:?} Hz) to {}",
        num_samples,
        args.frequencies,
        args.output.display()
    );
    Ok(())
}
