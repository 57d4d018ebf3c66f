//! Method selection between four-point, two-point and uncalibrated conversion.

use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::accuracy::{AccuracyProbe, AccuracyReport, AccuracySample, DEFAULT_PROBES};
use crate::calibration::CalibrationData;
use crate::color_science::compensation::apply_ir_compensation;
use crate::interpolation::{InterpolationStats, TetrahedralInterpolator};
use crate::reading::{RawReading, RgbColor, SENSOR_FULL_SCALE};

/// Which conversion produced a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMethod {
    /// Tetrahedral interpolation between four references.
    FourPoint,
    /// Linear black → white mapping per channel.
    TwoPoint,
    /// No usable calibration: counts / 256.
    RawFallback,
}

/// A converted color and the method that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub rgb: RgbColor,
    pub method: ConversionMethod,
}

/// Lifetime counters per method.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub four_point: u32,
    pub two_point: u32,
    pub raw_fallback: u32,
    /// Interpolator counters, when four-point mode is available.
    pub interpolation: Option<InterpolationStats>,
}

impl ConversionStats {
    pub fn total(&self) -> u32 {
        self.four_point
            .saturating_add(self.two_point)
            .saturating_add(self.raw_fallback)
    }

    /// Share of conversions that used four-point mode, percent.
    pub fn four_point_usage(&self) -> f32 {
        match self.total() {
            0 => 0.0,
            total => self.four_point as f32 / total as f32 * 100.0,
        }
    }

    /// 100 minus the interpolator's fallback rate; 0 before any interpolation.
    pub fn four_point_accuracy(&self) -> f32 {
        match self.interpolation {
            Some(stats) if stats.total > 0 => 100.0 - stats.fallback_rate(),
            _ => 0.0,
        }
    }
}

/// An orchestrator shared between threads; the mutex serializes access.
pub type SharedOrchestrator = Arc<Mutex<ConversionOrchestrator>>;

/// Picks the best conversion the calibration allows and counts what it used.
///
/// ```text
/// 4-point ready and calibrated → IR compensation → tetrahedral
/// 2-point calibrated           → IR compensation → linear black..white → 0..255
/// otherwise                    → counts / 256
/// ```
///
/// Calibration data that fails validation goes straight to the raw fallback.
#[derive(Debug, Clone, Default)]
pub struct ConversionOrchestrator {
    interpolator: Option<TetrahedralInterpolator>,
    four_point: u32,
    two_point: u32,
    raw_fallback: u32,
}

impl ConversionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the interpolator when the calibration allows it.
    ///
    /// Always succeeds: the lower tiers need no preparation.
    pub fn initialize(&mut self, calib: &CalibrationData) -> bool {
        self.interpolator = if calib.status.is_4_point_calibrated() {
            match TetrahedralInterpolator::initialize(calib) {
                Ok(interpolator) => {
                    tracing::info!("four-point conversion ready");
                    Some(interpolator)
                }
                Err(err) => {
                    tracing::warn!(%err, "four-point conversion unavailable, using two-point");
                    None
                }
            }
        } else {
            tracing::info!(
                completed = calib.status.completed_steps(),
                "four-point calibration incomplete, using two-point"
            );
            None
        };
        true
    }

    /// Rebuild after the calibration changed.
    pub fn reinitialize(&mut self, calib: &CalibrationData) -> bool {
        self.initialize(calib)
    }

    pub fn is_tetrahedral_available(&self) -> bool {
        self.interpolator.is_some()
    }

    pub fn interpolator(&self) -> Option<&TetrahedralInterpolator> {
        self.interpolator.as_ref()
    }

    pub fn into_shared(self) -> SharedOrchestrator {
        Arc::new(Mutex::new(self))
    }

    /// Convert one reading with the best available method.
    pub fn convert(&mut self, reading: &RawReading, calib: &CalibrationData) -> Conversion {
        if let Err(failure) = calib.validate() {
            tracing::warn!(%failure, "calibration invalid, using raw fallback");
            return self.raw_fallback(reading);
        }

        if calib.status.is_4_point_calibrated() {
            if let Some(rgb) = self.convert_four_point(reading, calib) {
                self.four_point = self.four_point.saturating_add(1);
                tracing::trace!(?reading, rgb = ?rgb.rgb8, "four-point conversion");
                return Conversion {
                    rgb,
                    method: ConversionMethod::FourPoint,
                };
            }
        }

        if calib.status.is_2_point_calibrated() {
            let rgb = two_point_map(compensated_counts(reading, calib), calib);
            self.two_point = self.two_point.saturating_add(1);
            tracing::trace!(?reading, rgb = ?rgb.rgb8, "two-point conversion");
            return Conversion {
                rgb,
                method: ConversionMethod::TwoPoint,
            };
        }

        self.raw_fallback(reading)
    }

    /// Tetrahedral conversion only; `None` when it is unavailable or fails.
    pub fn convert_four_point(
        &mut self,
        reading: &RawReading,
        calib: &CalibrationData,
    ) -> Option<RgbColor> {
        let interpolator = self.interpolator.as_mut()?;
        interpolator
            .convert(compensated_counts(reading, calib))
            .inspect_err(|err| tracing::debug!(%err, "four-point conversion failed"))
            .ok()
    }

    fn raw_fallback(&mut self, reading: &RawReading) -> Conversion {
        self.raw_fallback = self.raw_fallback.saturating_add(1);
        let rgb8 = [reading.x, reading.y, reading.z].map(|c| (c / 256) as u8);
        tracing::trace!(?reading, ?rgb8, "raw fallback conversion");
        Conversion {
            rgb: RgbColor::from_rgb8(rgb8),
            method: ConversionMethod::RawFallback,
        }
    }

    pub fn statistics(&self) -> ConversionStats {
        ConversionStats {
            four_point: self.four_point,
            two_point: self.two_point,
            raw_fallback: self.raw_fallback,
            interpolation: self.interpolator.as_ref().map(|i| i.statistics()),
        }
    }

    pub fn reset_statistics(&mut self) {
        self.four_point = 0;
        self.two_point = 0;
        self.raw_fallback = 0;
        if let Some(interpolator) = self.interpolator.as_mut() {
            interpolator.reset_statistics();
        }
    }

    /// Run the built-in accuracy probes through the interpolator.
    pub fn accuracy_self_test(&mut self) -> AccuracyReport {
        self.accuracy_self_test_with(&DEFAULT_PROBES)
    }

    /// Run `probes` through the interpolator.
    ///
    /// Empty report when four-point mode is unavailable.
    pub fn accuracy_self_test_with(&mut self, probes: &[AccuracyProbe]) -> AccuracyReport {
        let Some(interpolator) = self.interpolator.as_mut() else {
            tracing::debug!("accuracy self-test skipped: four-point mode unavailable");
            return AccuracyReport::default();
        };
        let samples = probes
            .iter()
            .map(|&probe| AccuracySample {
                probe,
                error: interpolator.validate_interpolation(probe.counts(), probe.expected),
            })
            .collect();
        let report = AccuracyReport::from_samples(samples);
        tracing::info!(
            mean_error = ?report.mean_error,
            failed = report.failed_probes(),
            "accuracy self-test complete"
        );
        report
    }

    /// Operator-facing summary of state and counters.
    pub fn diagnostics(&self) -> String {
        let stats = self.statistics();
        let mut out = String::from("Conversion orchestrator\n");
        let _ = writeln!(
            out,
            "  tetrahedral ready: {}",
            if self.is_tetrahedral_available() { "yes" } else { "no" }
        );
        let _ = writeln!(out, "  4-point conversions: {}", stats.four_point);
        let _ = writeln!(out, "  2-point conversions: {}", stats.two_point);
        let _ = writeln!(out, "  raw fallback conversions: {}", stats.raw_fallback);
        if stats.total() > 0 {
            let _ = writeln!(out, "  4-point usage: {:.1}%", stats.four_point_usage());
        }
        if let Some(interpolator) = &self.interpolator {
            out.push('\n');
            out.push_str(&interpolator.diagnostics());
        }
        out
    }
}

/// Color counts after IR compensation, computed in normalized space.
fn compensated_counts(reading: &RawReading, calib: &CalibrationData) -> [f32; 3] {
    apply_ir_compensation(reading.normalized(), &reading.ir(), &calib.settings)
        .map(|c| c * SENSOR_FULL_SCALE)
}

/// Map each channel linearly from `[black, white]` raw counts to `[0, 255]`.
///
/// A channel whose white does not exceed its black maps to 0.
fn two_point_map(counts: [f32; 3], calib: &CalibrationData) -> RgbColor {
    let black = calib.black.raw;
    let white = calib.white.raw;
    let scaled = std::array::from_fn(|c| {
        let span = white[c] - black[c];
        if span > 0.0 {
            (counts[c] - black[c]) / span * 255.0
        } else {
            0.0
        }
    });
    RgbColor::from_scaled(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{ReferenceKind, ReferencePoint};
    use crate::reading::IrReading;

    fn two_point_calibration() -> CalibrationData {
        let mut calib = CalibrationData::default();
        calib
            .capture_black(&RawReading::new(150, 180, 120, 50, 60), 1)
            .unwrap();
        calib
            .capture_white(&RawReading::new(45000, 50000, 35000, 900, 950), 2)
            .unwrap();
        calib
    }

    fn four_point_calibration() -> CalibrationData {
        let mut calib = CalibrationData::default();
        let refs = [
            [0.0, 0.0, 0.0],
            [60000.0, 60000.0, 60000.0],
            [5000.0, 8000.0, 50000.0],
            [50000.0, 45000.0, 5000.0],
        ];
        for kind in ReferenceKind::ALL {
            calib.set_reference(
                kind,
                ReferencePoint::new(refs[kind.index()], IrReading::default(), 0.9, 0),
            );
        }
        calib
    }

    #[test]
    fn test_uncalibrated_uses_raw_fallback() {
        let calib = CalibrationData::default();
        let mut orch = ConversionOrchestrator::new();
        assert!(orch.initialize(&calib));
        assert!(!orch.is_tetrahedral_available());

        let out = orch.convert(&RawReading::new(65535, 25600, 255, 0, 0), &calib);
        assert_eq!(out.method, ConversionMethod::RawFallback);
        assert_eq!(out.rgb.rgb8, [255, 100, 0]);
        assert_eq!(orch.statistics().raw_fallback, 1);
    }

    #[test]
    fn test_two_point_mid_gray() {
        let calib = two_point_calibration();
        let mut orch = ConversionOrchestrator::new();
        orch.initialize(&calib);
        let out = orch.convert(&RawReading::new(22500, 25000, 17500, 55, 55), &calib);
        assert_eq!(out.method, ConversionMethod::TwoPoint);
        for c in out.rgb.rgb8 {
            assert!((125..=131).contains(&c), "{:?}", out.rgb.rgb8);
        }
    }

    #[test]
    fn test_two_point_clamps_out_of_range() {
        let calib = two_point_calibration();
        let mut orch = ConversionOrchestrator::new();
        let bright = orch.convert(&RawReading::new(65535, 65535, 65535, 0, 0), &calib);
        assert_eq!(bright.rgb.rgb8, [255, 255, 255]);
        let dark = orch.convert(&RawReading::new(0, 0, 0, 0, 0), &calib);
        assert_eq!(dark.rgb.rgb8, [0, 0, 0]);
    }

    /// Fixed 25% compensation with 50% leakage: a full-scale IR reading
    /// removes 12.5% of every channel.
    fn with_strong_ir(mut calib: CalibrationData) -> CalibrationData {
        calib.settings.ir.base_compensation = 0.25;
        calib.settings.ir.adapt_to_brightness = false;
        calib.settings.spectral.leakage = [0.5; 3];
        calib
    }

    #[test]
    fn test_two_point_applies_ir_compensation_first() {
        let calib = with_strong_ir(two_point_calibration());
        let mut orch = ConversionOrchestrator::new();
        orch.initialize(&calib);

        let clean = RawReading::new(22500, 25000, 17500, 0, 0);
        let hot = RawReading::new(22500, 25000, 17500, 65535, 65535);
        let clean_out = orch.convert(&clean, &calib);
        let hot_out = orch.convert(&hot, &calib);
        assert_eq!(hot_out.method, ConversionMethod::TwoPoint);
        for c in 0..3 {
            assert!(
                hot_out.rgb.rgb8[c] < clean_out.rgb.rgb8[c],
                "{:?} vs {:?}",
                hot_out.rgb.rgb8,
                clean_out.rgb.rgb8
            );
        }

        let compensated = apply_ir_compensation(hot.normalized(), &hot.ir(), &calib.settings)
            .map(|c| c * SENSOR_FULL_SCALE);
        let (black, white) = (calib.black.raw, calib.white.raw);
        let expected = RgbColor::from_scaled(std::array::from_fn(|c| {
            (compensated[c] - black[c]) / (white[c] - black[c]) * 255.0
        }));
        assert_eq!(hot_out.rgb.rgb8, expected.rgb8);
    }

    #[test]
    fn test_four_point_applies_ir_compensation_first() {
        let calib = with_strong_ir(four_point_calibration());
        let mut orch = ConversionOrchestrator::new();
        orch.initialize(&calib);

        let clean = RawReading::new(30000, 30000, 30000, 0, 0);
        let hot = RawReading::new(30000, 30000, 30000, 65535, 65535);
        let clean_out = orch.convert(&clean, &calib);
        let hot_out = orch.convert(&hot, &calib);
        assert_eq!(hot_out.method, ConversionMethod::FourPoint);
        assert_ne!(hot_out.rgb.rgb8, clean_out.rgb.rgb8);

        let compensated = apply_ir_compensation(hot.normalized(), &hot.ir(), &calib.settings)
            .map(|c| c * SENSOR_FULL_SCALE);
        let expected = TetrahedralInterpolator::initialize(&calib)
            .unwrap()
            .convert(compensated)
            .unwrap();
        assert_eq!(hot_out.rgb.rgb8, expected.rgb8);
    }

    #[test]
    fn test_counters_saturate_instead_of_overflowing() {
        let calib = CalibrationData::default();
        let mut orch = ConversionOrchestrator {
            two_point: u32::MAX,
            raw_fallback: u32::MAX,
            ..ConversionOrchestrator::new()
        };
        let out = orch.convert(&RawReading::new(1000, 1000, 1000, 0, 0), &calib);
        assert_eq!(out.method, ConversionMethod::RawFallback);
        let stats = orch.statistics();
        assert_eq!(stats.raw_fallback, u32::MAX);
        assert_eq!(stats.total(), u32::MAX);
    }

    #[test]
    fn test_invalid_calibration_routes_to_raw_fallback() {
        let mut calib = two_point_calibration();
        calib.white.raw[1] = 100.0;
        let mut orch = ConversionOrchestrator::new();
        let out = orch.convert(&RawReading::new(25600, 25600, 25600, 0, 0), &calib);
        assert_eq!(out.method, ConversionMethod::RawFallback);
        assert_eq!(out.rgb.rgb8, [100, 100, 100]);
    }

    #[test]
    fn test_four_point_is_preferred_when_ready() {
        let calib = four_point_calibration();
        let mut orch = ConversionOrchestrator::new();
        orch.initialize(&calib);
        assert!(orch.is_tetrahedral_available());

        let out = orch.convert(&RawReading::new(60000, 60000, 60000, 0, 0), &calib);
        assert_eq!(out.method, ConversionMethod::FourPoint);
        assert_eq!(out.rgb.rgb8, [255, 255, 255]);

        let stats = orch.statistics();
        assert_eq!(stats.four_point, 1);
        assert_eq!(stats.four_point_usage(), 100.0);
        assert_eq!(stats.four_point_accuracy(), 100.0);
    }

    #[test]
    fn test_four_point_needs_calibration_flag_too() {
        let mut calib = four_point_calibration();
        let mut orch = ConversionOrchestrator::new();
        orch.initialize(&calib);
        calib.status.yellow = false;
        let out = orch.convert(&RawReading::new(30000, 30000, 30000, 0, 0), &calib);
        assert_eq!(out.method, ConversionMethod::TwoPoint);
    }

    #[test]
    fn test_degenerate_four_point_falls_back_to_two_point() {
        let mut calib = CalibrationData::default();
        let refs = [
            [0.0, 0.0, 0.0],
            [65535.0, 65535.0, 65535.0],
            [0.0, 0.0, 65535.0],
            [65535.0, 65535.0, 0.0],
        ];
        for kind in ReferenceKind::ALL {
            calib.set_reference(
                kind,
                ReferencePoint::new(refs[kind.index()], IrReading::default(), 0.9, 0),
            );
        }
        let mut orch = ConversionOrchestrator::new();
        assert!(orch.initialize(&calib));
        assert!(!orch.is_tetrahedral_available());
        let out = orch.convert(&RawReading::new(1000, 1000, 1000, 0, 0), &calib);
        assert_eq!(out.method, ConversionMethod::TwoPoint);
    }

    #[test]
    fn test_reset_statistics_clears_everything() {
        let calib = four_point_calibration();
        let mut orch = ConversionOrchestrator::new();
        orch.initialize(&calib);
        orch.convert(&RawReading::new(100, 100, 100, 0, 0), &calib);
        orch.reset_statistics();
        let stats = orch.statistics();
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.interpolation, Some(InterpolationStats::default()));
    }

    #[test]
    fn test_self_test_without_interpolator_is_empty() {
        let mut orch = ConversionOrchestrator::new();
        let report = orch.accuracy_self_test();
        assert!(report.samples.is_empty());
        assert_eq!(report.mean_error, None);
    }

    #[test]
    fn test_self_test_runs_every_probe() {
        let calib = four_point_calibration();
        let mut orch = ConversionOrchestrator::new();
        orch.initialize(&calib);
        let report = orch.accuracy_self_test();
        assert_eq!(report.samples.len(), DEFAULT_PROBES.len());
        for sample in &report.samples {
            assert!(sample.error.is_finite());
        }
    }

    #[test]
    fn test_custom_probe_on_reference_is_exact() {
        let calib = four_point_calibration();
        let mut orch = ConversionOrchestrator::new();
        orch.initialize(&calib);
        let probes = [AccuracyProbe::new([50000, 45000, 5000], [255, 255, 0])];
        let report = orch.accuracy_self_test_with(&probes);
        assert_eq!(report.mean_error, Some(0.0));
    }

    #[test]
    fn test_shared_orchestrator_serializes_access() {
        let calib = Arc::new(two_point_calibration());
        let shared = ConversionOrchestrator::new().into_shared();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let calib = Arc::clone(&calib);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        shared
                            .lock()
                            .convert(&RawReading::new(20000, 20000, 20000, 0, 0), &calib);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.lock().statistics().two_point, 100);
    }

    #[test]
    fn test_diagnostics_reports_readiness() {
        let calib = four_point_calibration();
        let mut orch = ConversionOrchestrator::new();
        assert!(orch.diagnostics().contains("tetrahedral ready: no"));
        orch.initialize(&calib);
        let text = orch.diagnostics();
        assert!(text.contains("tetrahedral ready: yes"));
        assert!(text.contains("Tetrahedral interpolator"));
    }
}
