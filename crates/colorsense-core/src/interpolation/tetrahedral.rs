//! Four-point tetrahedral interpolator built from a complete calibration.

use std::fmt::Write as _;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::{Tetrahedron, WeightSource};
use super::weights::TetrahedralWeights;
use crate::calibration::{CalibrationData, ReferenceKind};
use crate::error::CalibrationError;
use crate::reading::{RgbColor, normalize_counts};

/// Minimum |scalar triple product| for a usable tetrahedron.
pub const MIN_VOLUME: f32 = 1e-6;

/// Error reported when a conversion fails outright.
pub const FAILED_VALIDATION_ERROR: f32 = 999.0;

/// Running interpolation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterpolationStats {
    pub total: u32,
    /// Out-of-gamut queries answered with distance weighting.
    pub fallbacks: u32,
    /// Queries answered with the degenerate-system triangular route.
    pub triangular_fallbacks: u32,
}

impl InterpolationStats {
    /// Distance-weighted fallbacks as a percentage of all interpolations.
    pub fn fallback_rate(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.fallbacks as f32 / self.total as f32 * 100.0
        }
    }
}

/// Maps a raw tristimulus point to a blend of the four reference colors.
///
/// Only constructed from a validated four-point calibration, so an instance
/// is always ready to interpolate.
#[derive(Debug, Clone)]
pub struct TetrahedralInterpolator {
    tetrahedron: Tetrahedron,
    volume: f32,
    stats: InterpolationStats,
}

impl TetrahedralInterpolator {
    /// Build from a complete, valid, non-degenerate calibration.
    pub fn initialize(calib: &CalibrationData) -> Result<Self, CalibrationError> {
        if !calib.status.is_4_point_calibrated() {
            return Err(CalibrationError::IncompleteCalibration {
                completed: calib.status.completed_steps(),
            });
        }
        calib.validate()?;

        let corner = |kind| Vec3::from_array(normalize_counts(calib.reference(kind).raw));
        let tetrahedron = Tetrahedron::new(
            corner(ReferenceKind::Black),
            corner(ReferenceKind::White),
            corner(ReferenceKind::Blue),
            corner(ReferenceKind::Yellow),
        );

        let volume = tetrahedron.volume();
        if volume.is_nan() || volume.abs() <= MIN_VOLUME {
            tracing::warn!(volume, "reference points are coplanar, tetrahedral mode unavailable");
            return Err(CalibrationError::DegenerateGeometry { volume });
        }

        tracing::info!(
            volume,
            black = ?tetrahedron.corner(ReferenceKind::Black),
            white = ?tetrahedron.corner(ReferenceKind::White),
            blue = ?tetrahedron.corner(ReferenceKind::Blue),
            yellow = ?tetrahedron.corner(ReferenceKind::Yellow),
            "tetrahedral interpolator initialized"
        );

        Ok(Self {
            tetrahedron,
            volume,
            stats: InterpolationStats::default(),
        })
    }

    pub fn tetrahedron(&self) -> &Tetrahedron {
        &self.tetrahedron
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Blend weights for a point given in raw counts.
    pub fn interpolate(&mut self, xyz_counts: [f32; 3]) -> TetrahedralWeights {
        self.interpolate_with_source(xyz_counts).0
    }

    /// Like [`interpolate`](Self::interpolate), also reporting the route taken.
    pub fn interpolate_with_source(
        &mut self,
        xyz_counts: [f32; 3],
    ) -> (TetrahedralWeights, WeightSource) {
        self.stats.total = self.stats.total.saturating_add(1);
        let point = Vec3::from_array(normalize_counts(xyz_counts));
        let (weights, source) = self.tetrahedron.solve(point);
        match source {
            WeightSource::DistanceWeighted => {
                self.stats.fallbacks = self.stats.fallbacks.saturating_add(1);
                tracing::debug!(?xyz_counts, "point outside tetrahedron, distance-weighted fallback");
            }
            WeightSource::Triangular => {
                self.stats.triangular_fallbacks =
                    self.stats.triangular_fallbacks.saturating_add(1);
                tracing::debug!(?xyz_counts, "degenerate system, triangular fallback");
            }
            WeightSource::Invalid => {
                tracing::debug!(?xyz_counts, "no usable weights");
            }
            WeightSource::Barycentric => {}
        }
        (weights, source)
    }

    /// Interpolate and blend the corner colors.
    ///
    /// ```text
    /// rgb = Σ weight[k] × target[k],  clamped to [0, 255]
    /// ```
    pub fn convert(&mut self, xyz_counts: [f32; 3]) -> Result<RgbColor, CalibrationError> {
        let weights = self.interpolate(xyz_counts);
        if !weights.valid {
            return Err(CalibrationError::InvalidWeights);
        }
        Ok(RgbColor::from_scaled(weights.blend()))
    }

    /// Euclidean RGB error of converting `xyz_counts` against `expected`.
    ///
    /// Returns [`FAILED_VALIDATION_ERROR`] when the conversion fails.
    pub fn validate_interpolation(&mut self, xyz_counts: [f32; 3], expected: [u8; 3]) -> f32 {
        match self.convert(xyz_counts) {
            Ok(rgb) => rgb.distance_to(expected),
            Err(_) => FAILED_VALIDATION_ERROR,
        }
    }

    pub fn statistics(&self) -> InterpolationStats {
        self.stats
    }

    pub fn reset_statistics(&mut self) {
        self.stats = InterpolationStats::default();
    }

    /// Operator-facing summary of geometry and counters.
    pub fn diagnostics(&self) -> String {
        let mut out = String::from("Tetrahedral interpolator\n");
        let _ = writeln!(out, "  volume: {:.6}", self.volume);
        let _ = writeln!(
            out,
            "  interpolations: {}, fallbacks: {} ({:.1}%), triangular: {}",
            self.stats.total,
            self.stats.fallbacks,
            self.stats.fallback_rate(),
            self.stats.triangular_fallbacks
        );
        for kind in ReferenceKind::ALL {
            let p = self.tetrahedron.corner(kind);
            let t = kind.target_rgb();
            let _ = writeln!(
                out,
                "  {kind:<6} ({:.4}, {:.4}, {:.4}) -> RGB({}, {}, {})",
                p.x, p.y, p.z, t[0], t[1], t[2]
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::ReferencePoint;
    use crate::reading::IrReading;

    fn four_point(refs: [[f32; 3]; 4]) -> CalibrationData {
        let mut calib = CalibrationData::default();
        for kind in ReferenceKind::ALL {
            calib.set_reference(
                kind,
                ReferencePoint::new(refs[kind.index()], IrReading::default(), 0.9, 0),
            );
        }
        calib
    }

    fn sample_calibration() -> CalibrationData {
        four_point([
            [0.0, 0.0, 0.0],
            [60000.0, 60000.0, 60000.0],
            [5000.0, 8000.0, 50000.0],
            [50000.0, 45000.0, 5000.0],
        ])
    }

    #[test]
    fn test_requires_four_points() {
        let mut calib = sample_calibration();
        calib.status.yellow = false;
        let err = TetrahedralInterpolator::initialize(&calib).unwrap_err();
        assert!(matches!(err, CalibrationError::IncompleteCalibration { completed: 3 }));
    }

    #[test]
    fn test_degenerate_geometry_is_rejected() {
        let calib = four_point([
            [0.0, 0.0, 0.0],
            [65535.0, 65535.0, 65535.0],
            [0.0, 0.0, 65535.0],
            [65535.0, 65535.0, 0.0],
        ]);
        let err = TetrahedralInterpolator::initialize(&calib).unwrap_err();
        assert!(matches!(err, CalibrationError::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_invalid_calibration_is_rejected() {
        let mut calib = sample_calibration();
        calib.white.raw = [0.0, 0.0, 0.0];
        let err = TetrahedralInterpolator::initialize(&calib).unwrap_err();
        assert!(matches!(err, CalibrationError::Validation(_)));
    }

    #[test]
    fn test_reference_points_reproduce_their_corners() {
        let calib = sample_calibration();
        let mut interp = TetrahedralInterpolator::initialize(&calib).unwrap();
        for kind in ReferenceKind::ALL {
            let rgb = interp.convert(calib.reference(kind).raw).unwrap();
            assert_eq!(rgb.rgb8, kind.target_rgb().map(|c| c as u8), "{kind}");
        }
        assert_eq!(interp.statistics().fallbacks, 0);
    }

    #[test]
    fn test_black_white_midpoint_is_mid_gray() {
        let mut interp = TetrahedralInterpolator::initialize(&sample_calibration()).unwrap();
        let (weights, source) = interp.interpolate_with_source([30000.0, 30000.0, 30000.0]);
        assert_eq!(source, WeightSource::Barycentric);
        assert!((weights.black - 0.5).abs() < 1e-3, "{weights:?}");
        assert!((weights.white - 0.5).abs() < 1e-3, "{weights:?}");

        let rgb = interp.convert([30000.0, 30000.0, 30000.0]).unwrap();
        for c in rgb.rgb8 {
            assert!((127..=128).contains(&c), "{:?}", rgb.rgb8);
        }
    }

    #[test]
    fn test_out_of_gamut_counts_fallback() {
        let mut interp = TetrahedralInterpolator::initialize(&sample_calibration()).unwrap();
        let (weights, source) = interp.interpolate_with_source([65535.0, 0.0, 0.0]);
        assert_eq!(source, WeightSource::DistanceWeighted);
        assert!((weights.sum() - 1.0).abs() < 1e-4);

        let stats = interp.statistics();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.fallbacks, 1);
        assert_eq!(stats.fallback_rate(), 100.0);

        interp.reset_statistics();
        assert_eq!(interp.statistics(), InterpolationStats::default());
    }

    #[test]
    fn test_non_finite_input_fails_conversion() {
        let mut interp = TetrahedralInterpolator::initialize(&sample_calibration()).unwrap();
        let err = interp.convert([f32::INFINITY, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidWeights));
        assert_eq!(
            interp.validate_interpolation([f32::NAN, 0.0, 0.0], [0, 0, 0]),
            FAILED_VALIDATION_ERROR
        );
    }

    #[test]
    fn test_unboundedly_distant_input_fails_conversion() {
        let mut interp = TetrahedralInterpolator::initialize(&sample_calibration()).unwrap();
        let (weights, source) = interp.interpolate_with_source([3.0e38, 0.0, 0.0]);
        assert_eq!(source, WeightSource::Invalid);
        assert!(!weights.valid, "{weights:?}");
        let err = interp.convert([3.0e38, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidWeights));
        assert_eq!(interp.statistics().fallbacks, 0);
    }

    #[test]
    fn test_thin_tetrahedron_counts_triangular_fallbacks() {
        // Yellow sits 3 counts off the black/white/blue plane: usable volume,
        // but the barycentric determinant is below the solve threshold.
        let mut interp = TetrahedralInterpolator::initialize(&four_point([
            [0.0, 0.0, 0.0],
            [60000.0, 60000.0, 60000.0],
            [0.0, 0.0, 60000.0],
            [60000.0, 59997.0, 0.0],
        ]))
        .unwrap();
        assert!(interp.volume().abs() > MIN_VOLUME);
        assert!(interp.volume().abs() < 1e-4, "{}", interp.volume());

        let (weights, source) = interp.interpolate_with_source([20000.0, 20000.0, 10000.0]);
        assert_eq!(source, WeightSource::Triangular);
        assert!((weights.sum() - 1.0).abs() < 1e-4, "{weights:?}");
        assert_eq!(weights.to_array().iter().filter(|&&w| w == 0.0).count(), 1);
        interp.convert([30000.0, 30000.0, 30000.0]).unwrap();

        let stats = interp.statistics();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.triangular_fallbacks, 2);
        assert_eq!(stats.fallbacks, 0);
        assert!(interp.diagnostics().contains("triangular: 2"));
    }

    #[test]
    fn test_stats_saturate_instead_of_overflowing() {
        let mut interp = TetrahedralInterpolator::initialize(&sample_calibration()).unwrap();
        interp.stats = InterpolationStats {
            total: u32::MAX,
            fallbacks: u32::MAX,
            triangular_fallbacks: 0,
        };
        interp.interpolate([65535.0, 0.0, 0.0]);
        assert_eq!(interp.statistics().total, u32::MAX);
        assert_eq!(interp.statistics().fallbacks, u32::MAX);
    }

    #[test]
    fn test_validate_interpolation_measures_error() {
        let calib = sample_calibration();
        let mut interp = TetrahedralInterpolator::initialize(&calib).unwrap();
        let exact = interp.validate_interpolation(calib.white.raw, [255, 255, 255]);
        assert!(exact < 1e-6);
        let off = interp.validate_interpolation(calib.white.raw, [252, 251, 255]);
        assert!((off - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_diagnostics_lists_every_corner() {
        let interp = TetrahedralInterpolator::initialize(&sample_calibration()).unwrap();
        let text = interp.diagnostics();
        for kind in ReferenceKind::ALL {
            assert!(text.contains(kind.label()), "{text}");
        }
    }
}
