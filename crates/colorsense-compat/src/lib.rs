//! Colorsense Compat: older call shapes mapped onto `colorsense-core`.
//!
//! Firmware callers written against the previous sensor driver pass loose
//! channel values and read min/max fields. Everything here forwards to the
//! core; nothing in the core depends on this crate.

use colorsense_core::color_science::{srgb_decode, srgb_encode};
use colorsense_core::{
    CalibrationData, ColorSciencePipeline, ConversionOrchestrator, IrReading, RawReading,
    RgbColor, SENSOR_FULL_SCALE,
};

/// Blue must keep at least this `Z` share to pass the four-point integrity check.
const LEGACY_BLUE_Z_MIN: f32 = 0.3;
/// Yellow must keep at least this `X + Y` share.
const LEGACY_YELLOW_XY_MIN: f32 = 0.5;

/// RGB in the old flat layout: encoded floats plus 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegacyRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub r8: u8,
    pub g8: u8,
    pub b8: u8,
}

impl From<RgbColor> for LegacyRgb {
    fn from(rgb: RgbColor) -> Self {
        Self {
            r: rgb.encoded[0],
            g: rgb.encoded[1],
            b: rgb.encoded[2],
            r8: rgb.rgb8[0],
            g8: rgb.rgb8[1],
            b8: rgb.rgb8[2],
        }
    }
}

/// Convert loose channel values with the orchestrator's best method.
///
/// `None` converts against default (uncalibrated) data.
pub fn convert_xyz_to_rgb_multi_point(
    orchestrator: &mut ConversionOrchestrator,
    x: u16,
    y: u16,
    z: u16,
    ir1: u16,
    ir2: u16,
    calib: Option<&CalibrationData>,
) -> (u8, u8, u8) {
    let fallback;
    let calib = match calib {
        Some(calib) => calib,
        None => {
            fallback = CalibrationData::default();
            &fallback
        }
    };
    let [r, g, b] = orchestrator
        .convert(&RawReading::new(x, y, z, ir1, ir2), calib)
        .rgb
        .rgb8;
    (r, g, b)
}

/// Run the color-science pipeline, answering black when the data is unusable.
pub fn xyz_to_rgb(xyz: [f32; 3], ir: &IrReading, calib: &CalibrationData) -> LegacyRgb {
    match ColorSciencePipeline::convert(xyz, ir, calib) {
        Ok(rgb) => rgb.into(),
        Err(err) => {
            tracing::warn!(%err, "legacy conversion refused, returning black");
            LegacyRgb::default()
        }
    }
}

pub fn apply_srgb_gamma(linear: f32) -> f32 {
    srgb_encode(linear)
}

pub fn apply_inverse_srgb_gamma(encoded: f32) -> f32 {
    srgb_decode(encoded)
}

/// Single-factor IR model of the previous driver.
///
/// ```text
/// raw × (1 − mean(ir1, ir2) / 65535 × ir_compensation_factor)
/// ```
///
/// Returns `raw` unchanged when ambient compensation is disabled.
pub fn legacy_ir_compensation(raw: u16, ir1: u16, ir2: u16, calib: &CalibrationData) -> f32 {
    let raw = raw as f32;
    if !calib.settings.ambient_compensation {
        return raw;
    }
    let ir_level = (ir1 as f32 + ir2 as f32) / 2.0 / SENSOR_FULL_SCALE;
    raw * (1.0 - ir_level * calib.settings.ir_compensation_factor)
}

/// Overall grade of a calibration, as reported by [`LegacyCalibrationView::summary`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSummary {
    pub calibration_type: &'static str,
    pub completion_percentage: f32,
    pub quality_score: f32,
    pub is_valid: bool,
    pub recommendation: &'static str,
}

/// Read-only view exposing calibration data under the old accessor names.
#[derive(Debug, Clone, Copy)]
pub struct LegacyCalibrationView<'a> {
    data: &'a CalibrationData,
}

impl<'a> LegacyCalibrationView<'a> {
    pub fn new(data: &'a CalibrationData) -> Self {
        Self { data }
    }

    pub fn is_calibrated(&self) -> bool {
        self.data.status.is_2_point_calibrated()
    }

    pub fn black_reference_complete(&self) -> bool {
        self.data.status.black
    }

    pub fn white_reference_complete(&self) -> bool {
        self.data.status.white
    }

    pub fn completion_percentage(&self) -> f32 {
        self.data.status.progress_percent()
    }

    pub fn min_x(&self) -> f32 {
        self.data.black.raw[0]
    }

    pub fn min_y(&self) -> f32 {
        self.data.black.raw[1]
    }

    pub fn min_z(&self) -> f32 {
        self.data.black.raw[2]
    }

    pub fn max_x(&self) -> f32 {
        self.data.white.raw[0]
    }

    pub fn max_y(&self) -> f32 {
        self.data.white.raw[1]
    }

    pub fn max_z(&self) -> f32 {
        self.data.white.raw[2]
    }

    pub fn calibration_type(&self) -> &'static str {
        let status = &self.data.status;
        if status.is_4_point_calibrated() {
            "4-point"
        } else if status.is_2_point_calibrated() {
            "2-point"
        } else {
            "uncalibrated"
        }
    }

    /// Core validation plus loose dominance checks on blue and yellow.
    pub fn validate_4_point(&self) -> bool {
        if !self.data.is_valid() {
            return false;
        }
        if !self.data.status.is_4_point_calibrated() {
            return true;
        }
        let share = |part: f32, raw: [f32; 3]| {
            let total = raw[0] + raw[1] + raw[2];
            if total > 0.0 { Some(part / total) } else { None }
        };
        let blue = self.data.blue.raw;
        let yellow = self.data.yellow.raw;
        let blue_ok = share(blue[2], blue).is_none_or(|r| r >= LEGACY_BLUE_Z_MIN);
        let yellow_ok =
            share(yellow[0] + yellow[1], yellow).is_none_or(|r| r >= LEGACY_YELLOW_XY_MIN);
        blue_ok && yellow_ok
    }

    /// Score in [0, 100].
    ///
    /// ```text
    /// 50   two-point
    /// +30  four-point
    /// +20  dynamic range > 0.8,  +10 when > 0.6
    /// ```
    pub fn quality_score(&self) -> f32 {
        let status = &self.data.status;
        if !status.is_2_point_calibrated() {
            return 0.0;
        }
        let mut score = 50.0;
        if status.is_4_point_calibrated() {
            score += 30.0;
        }
        let white_y = self.data.white.luminance();
        if white_y > 0.0 {
            let range = (white_y - self.data.black.luminance()) / white_y;
            if range > 0.8 {
                score += 20.0;
            } else if range > 0.6 {
                score += 10.0;
            }
        }
        f32::min(score, 100.0)
    }

    pub fn summary(&self) -> CalibrationSummary {
        let quality_score = self.quality_score();
        let recommendation = if quality_score >= 90.0 {
            "excellent, ready for critical work"
        } else if quality_score >= 70.0 {
            "good"
        } else if quality_score >= 50.0 {
            "acceptable, recalibrate for best results"
        } else {
            "poor, recalibration required"
        };
        CalibrationSummary {
            calibration_type: self.calibration_type(),
            completion_percentage: self.completion_percentage(),
            quality_score,
            is_valid: self.validate_4_point(),
            recommendation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_legacy_ir_compensation_formula() {
        let calib = CalibrationData::default();
        // mean IR = full scale, factor 0.1
        let out = legacy_ir_compensation(10000, 65535, 65535, &calib);
        assert!((out - 9000.0).abs() < EPSILON);
    }

    #[test]
    fn test_legacy_ir_compensation_disabled() {
        let mut calib = CalibrationData::default();
        calib.settings.ambient_compensation = false;
        assert_eq!(legacy_ir_compensation(1234, 65535, 65535, &calib), 1234.0);
    }

    #[test]
    fn test_gamma_aliases_roundtrip() {
        for v in [0.0, 0.002, 0.18, 0.5, 1.0] {
            assert!((apply_inverse_srgb_gamma(apply_srgb_gamma(v)) - v).abs() < EPSILON);
        }
    }

    #[test]
    fn test_xyz_to_rgb_black_on_invalid_data() {
        let mut calib = CalibrationData::default();
        calib.settings.ir_compensation_factor = 2.0;
        let out = xyz_to_rgb([0.5, 0.5, 0.5], &IrReading::default(), &calib);
        assert_eq!(out, LegacyRgb::default());
    }

    #[test]
    fn test_uncalibrated_view() {
        let calib = CalibrationData::default();
        let view = LegacyCalibrationView::new(&calib);
        assert!(!view.is_calibrated());
        assert_eq!(view.calibration_type(), "uncalibrated");
        assert_eq!(view.quality_score(), 0.0);
        assert_eq!(view.summary().recommendation, "poor, recalibration required");
    }
}
