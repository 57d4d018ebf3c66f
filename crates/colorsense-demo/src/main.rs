//! Colorsense Demo: simulated calibration session on a five-channel sensor.
//!
//! Captures black, white, blue and yellow references from canned readings,
//! converts a handful of samples with every available method and prints the
//! operator diagnostics.

mod config;

use std::path::PathBuf;

use colorsense_compat::LegacyCalibrationView;
use colorsense_core::{
    CalibrationData, CalibrationError, ColorSciencePipeline, ConversionOrchestrator, RawReading,
};
use tracing_subscriber::EnvFilter;

use config::{DEFAULT_LOG_FILTER, DemoConfig};

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

const BLACK: RawReading = RawReading::new(150, 180, 120, 50, 60);
const WHITE: RawReading = RawReading::new(45000, 50000, 35000, 1200, 1300);
const BLUE: RawReading = RawReading::new(8000, 12000, 35000, 400, 420);
const YELLOW: RawReading = RawReading::new(40000, 45000, 5000, 900, 950);

const SAMPLES: [(&str, RawReading); 4] = [
    ("mid gray", RawReading::new(22500, 25000, 17500, 55, 55)),
    ("warm", RawReading::new(30000, 28000, 12000, 700, 650)),
    ("cool", RawReading::new(12000, 16000, 30000, 300, 320)),
    ("dark", RawReading::new(900, 1000, 800, 40, 45)),
];

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn convert_samples(orch: &mut ConversionOrchestrator, calib: &CalibrationData, stage: &str) {
    println!("-- {stage} --");
    for (name, reading) in &SAMPLES {
        let out = orch.convert(reading, calib);
        let [r, g, b] = out.rgb.rgb8;
        println!("  {name:<9} -> ({r:>3}, {g:>3}, {b:>3}) via {:?}", out.method);
    }
}

fn run() -> Result<(), DemoError> {
    let config = DemoConfig::from_env();
    let mut calib = CalibrationData::with_settings(config.load_settings()?);
    if config.dump_settings {
        println!("{}", calib.settings.to_json_pretty()?);
    }

    let mut orch = ConversionOrchestrator::new();
    orch.initialize(&calib);
    convert_samples(&mut orch, &calib, "uncalibrated");

    calib.capture_black(&BLACK, 1_000)?;
    calib.capture_white(&WHITE, 2_000)?;
    orch.reinitialize(&calib);
    convert_samples(&mut orch, &calib, "2-point");

    // A washed-out blue is refused and leaves the reference unchanged.
    if let Err(err) = calib.capture_blue(&RawReading::new(10000, 10000, 20000, 0, 0), 2_500) {
        println!("rejected capture: {err}");
    }
    calib.capture_blue(&BLUE, 3_000)?;
    calib.capture_yellow(&YELLOW, 4_000)?;
    orch.reinitialize(&calib);
    convert_samples(&mut orch, &calib, "4-point");

    println!("-- color-science pipeline --");
    for (name, reading) in &SAMPLES {
        let rgb = ColorSciencePipeline::convert_reading(reading, &calib)?;
        let [r, g, b] = rgb.rgb8;
        println!("  {name:<9} -> ({r:>3}, {g:>3}, {b:>3})");
    }

    let report = orch.accuracy_self_test();
    match report.mean_error {
        Some(err) => println!("accuracy self-test: mean error {err:.1}"),
        None => println!("accuracy self-test: no usable probes"),
    }
    for sample in &report.samples {
        println!(
            "  {:?} -> expected {:?}, error {:.1}",
            sample.probe.xyz, sample.probe.expected, sample.error
        );
    }

    let summary = LegacyCalibrationView::new(&calib).summary();
    println!(
        "calibration: {} ({:.0}%), quality {:.0}, {}",
        summary.calibration_type,
        summary.completion_percentage,
        summary.quality_score,
        summary.recommendation
    );

    println!();
    print!("{}", orch.diagnostics());
    Ok(())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        tracing::error!(%err, "demo failed");
        std::process::exit(1);
    }
}
