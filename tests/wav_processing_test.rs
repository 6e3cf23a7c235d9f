use std::f32::consts::PI;
use std::path::PathBuf;

use hound::{WavReader, WavSpec, WavWriter};

use firloop::LoopError;
use firloop::config::LoopConfig;
use firloop::runner::run_file;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("firloop-{}-{}.wav", std::process::id(), name))
}

fn write_tone(path: &PathBuf, samples: usize, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate: 44_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..samples {
        let s = (2.0 * PI * 440.0 * i as f32 / 44_000.0).sin() * 0.5;
        for _ in 0..channels {
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_file_round_trip_keeps_length() {
    let input = temp_path("in");
    let output = temp_path("out");
    write_tone(&input, 2000, 1);

    let report = run_file(&LoopConfig::default(), &input, 0).unwrap();
    assert_eq!(report.output.len(), 2000);
    assert_eq!(report.summary.ticks, 2000);
    report.save_wav(&output).unwrap();

    let reader = WavReader::open(&output).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 4000);

    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn test_file_tone_passes_through() {
    let input = temp_path("tone");
    write_tone(&input, 4400, 1);

    let report = run_file(&LoopConfig::default(), &input, 0).unwrap();
    let settled = &report.output[100..];
    let min = *settled.iter().min().unwrap();
    let max = *settled.iter().max().unwrap();
    assert!(max - min > 200, "Tone vanished: swing {}..{}", min, max);

    let _ = std::fs::remove_file(&input);
}

#[test]
fn test_missing_channel_rejected() {
    let input = temp_path("mono");
    write_tone(&input, 10, 1);

    let result = run_file(&LoopConfig::default(), &input, 1);
    assert!(matches!(result, Err(LoopError::Config(_))));

    let _ = std::fs::remove_file(&input);
}

#[test]
fn test_missing_file_rejected() {
    let result = run_file(&LoopConfig::default(), temp_path("does-not-exist"), 0);
    assert!(matches!(result, Err(LoopError::Wav(_))));
}

#[test]
fn test_empty_file_rejected() {
    let input = temp_path("empty");
    write_tone(&input, 0, 1);

    let result = run_file(&LoopConfig::default(), &input, 0);
    assert!(matches!(result, Err(LoopError::Config(_))));

    let _ = std::fs::remove_file(&input);
}
