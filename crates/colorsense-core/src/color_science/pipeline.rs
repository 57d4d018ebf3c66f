//! The deterministic XYZ → RGB pipeline.

use super::compensation::{apply_ambient_compensation, apply_ir_compensation, normalize_white_point};
use super::transfer::{quantize, srgb_encode};
use crate::calibration::CalibrationData;
use crate::error::CalibrationError;
use crate::reading::{IrReading, RawReading, RgbColor};

/// Converts a normalized tristimulus reading to display RGB.
///
/// Stages, in order:
///
/// ```text
/// 1. ambient compensation   (black subtraction, skipped when disabled)
/// 2. IR compensation
/// 3. white-point normalization
/// 4. XYZ → linear RGB matrix
/// 5. clamp to [0, 1]
/// 6. sRGB encode
/// 7. quantize to 8 bits
/// ```
///
/// Stateless; the calibration snapshot is the only input besides the reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorSciencePipeline;

impl ColorSciencePipeline {
    /// Run all stages on a normalized `xyz` triple.
    ///
    /// Refuses calibration data that fails validation.
    pub fn convert(
        xyz: [f32; 3],
        ir: &IrReading,
        calib: &CalibrationData,
    ) -> Result<RgbColor, CalibrationError> {
        calib.validate().inspect_err(|failure| {
            tracing::debug!(%failure, "pipeline refused calibration data");
        })?;

        let settings = &calib.settings;
        let mut signal = xyz;
        if settings.ambient_compensation {
            signal = apply_ambient_compensation(signal, calib.black.normalized);
        }
        signal = apply_ir_compensation(signal, ir, settings);
        signal = normalize_white_point(signal, calib.white.normalized);

        let linear = calib.matrix().apply(signal).map(|c| c.clamp(0.0, 1.0));
        let encoded = linear.map(srgb_encode);
        Ok(RgbColor {
            linear,
            encoded,
            rgb8: encoded.map(quantize),
        })
    }

    /// Normalize a raw sensor sample and convert it.
    pub fn convert_reading(
        reading: &RawReading,
        calib: &CalibrationData,
    ) -> Result<RgbColor, CalibrationError> {
        Self::convert(reading.normalized(), &reading.ir(), calib)
    }
}
