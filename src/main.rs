use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use firloop::config::{HostConfig, LoopConfig};
use firloop::constants::NUM_COEFFICIENTS;
use firloop::runner::{self, RunReport};
use firloop::signal_processing::{COEFFICIENTS, coefficients};

#[derive(Parser, Debug)]
#[command(name = "firloop")]
#[command(about = "Fixed-rate FIR sample loop with square-wave output", long_about = None)]
struct Cli {
    /// TOML host configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Loopback self-test: square-wave pin wired to the analog input
    Simulate {
        /// Run length in seconds (overrides the config file)
        #[arg(short, long)]
        duration: Option<f32>,

        /// Gaussian ADC noise in codes (needs the `simulation` feature)
        #[arg(long)]
        noise_std: Option<f32>,

        /// Noise seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the recording (left = DAC, right = pin) to this WAV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a WAV file through the loop, one sample per tick
    Process {
        input: PathBuf,
        output: PathBuf,

        /// Input channel to use (0-based)
        #[arg(long, default_value_t = 0)]
        channel: u16,
    },
    /// Capture from the default input device and record the loop output
    Live {
        /// Capture length in seconds
        #[arg(short, long, default_value_t = 5.0)]
        duration: f32,

        /// Write the recording to this WAV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the magnitude response of the built-in coefficient set
    Response {
        /// Frequencies in Hz (default: a spread across the audio band)
        #[arg(value_delimiter = ',')]
        frequencies: Vec<f32>,

        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: ResponseFormat,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ResponseFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct ResponsePoint {
    frequency_hz: f32,
    magnitude: f32,
    magnitude_db: f32,
}

#[derive(Debug, Serialize)]
struct ResponseReport {
    taps: usize,
    sample_rate_hz: u32,
    symmetric: bool,
    dc_gain: f32,
    points: Vec<ResponsePoint>,
}

const DEFAULT_RESPONSE_FREQS: [f32; 12] = [
    0.0, 100.0, 440.0, 880.0, 1760.0, 2640.0, 4400.0, 6000.0, 8000.0, 11_000.0, 16_000.0,
    22_000.0,
];

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let loop_config = LoopConfig::default();
    let mut host = match cli.config {
        Some(ref path) => HostConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => HostConfig::default(),
    };

    match cli.command {
        Command::Simulate {
            duration,
            noise_std,
            seed,
            output,
        } => {
            if let Some(d) = duration {
                host.simulation.duration_secs = d;
            }
            if let Some(n) = noise_std {
                host.simulation.noise_std = n;
            }
            if seed.is_some() {
                host.simulation.seed = seed;
            }
            if output.is_some() {
                host.output.path = output;
            }
            host.validate().context("Invalid simulation parameters")?;

            let report = runner::run_loopback(&loop_config, &host)?;
            finish(&report, host.output.path.as_ref(), cli.json)
        }
        Command::Process {
            input,
            output,
            channel,
        } => {
            let report = runner::run_file(&loop_config, &input, channel)
                .with_context(|| format!("Failed to process {}", input.display()))?;
            finish(&report, Some(&output), cli.json)
        }
        Command::Live { duration, output } => {
            runner::tick_budget(duration as f64, loop_config.tick_rate_hz)
                .context("Invalid capture duration")?;
            if output.is_some() {
                host.output.path = output;
            }
            println!("Capturing {:.1} s at {} Hz...", duration, loop_config.tick_rate_hz);
            let report =
                runner::run_live(&loop_config, &host, Duration::from_secs_f32(duration))?;
            finish(&report, host.output.path.as_ref(), cli.json)
        }
        Command::Response {
            frequencies,
            format,
        } => {
            print_response(&loop_config, &frequencies, format)?;
            Ok(())
        }
    }
}

fn finish(report: &RunReport, output: Option<&PathBuf>, json: bool) -> Result<()> {
    if let Some(path) = output {
        report
            .save_wav(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Recording written to {}", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
        return Ok(());
    }

    let summary = &report.summary;
    println!("=== firloop run ===");
    println!("Tick rate:      {} Hz", summary.tick_rate_hz);
    println!(
        "Ticks:          {} ({:.3} s)",
        summary.ticks,
        summary.ticks as f64 / summary.tick_rate_hz as f64
    );
    println!("Pin toggles:    {}", summary.toggles);
    if let Some(hz) = summary.measured_square_wave_hz {
        println!("Square wave:    {:.2} Hz", hz);
    }
    if let Some(ref h) = summary.handler_us {
        println!(
            "Handler time:   mean {:.3} us, max {:.3} us (period {:.3} us)",
            h.mean, h.max, summary.tick_period_us
        );
    }
    println!("Late ticks:     {}", summary.late_ticks);
    if let Some(ref o) = summary.output_code {
        println!(
            "Output code:    mean {:.1}, min {:.0}, max {:.0}",
            o.mean, o.min, o.max
        );
    }
    Ok(())
}

fn print_response(config: &LoopConfig, frequencies: &[f32], format: ResponseFormat) -> Result<()> {
    let sample_rate = config.tick_rate_hz as f32;
    let freqs: &[f32] = if frequencies.is_empty() {
        &DEFAULT_RESPONSE_FREQS
    } else {
        frequencies
    };

    let report = ResponseReport {
        taps: NUM_COEFFICIENTS,
        sample_rate_hz: config.tick_rate_hz,
        symmetric: coefficients::is_symmetric(
            &COEFFICIENTS,
            firloop::constants::SYMMETRY_EPSILON,
        ),
        dc_gain: coefficients::dc_gain(&COEFFICIENTS),
        points: freqs
            .iter()
            .map(|&f| ResponsePoint {
                frequency_hz: f,
                magnitude: coefficients::magnitude_response(&COEFFICIENTS, f, sample_rate),
                magnitude_db: coefficients::magnitude_response_db(&COEFFICIENTS, f, sample_rate),
            })
            .collect(),
    };

    match format {
        ResponseFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ResponseFormat::Text => {
            println!(
                "{} taps at {} Hz, symmetric: {}, DC gain {:.4}",
                report.taps, report.sample_rate_hz, report.symmetric, report.dc_gain
            );
            println!("{:<12} {:<12} {:<12}", "Freq (Hz)", "Magnitude", "dB");
            println!("{}", "-".repeat(36));
            for p in &report.points {
                println!(
                    "{:<12.1} {:<12.5} {:<12.2}",
                    p.frequency_hz, p.magnitude, p.magnitude_db
                );
            }
        }
    }
    Ok(())
}
