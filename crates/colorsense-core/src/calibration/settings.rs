//! Tunable calibration settings: acceptance thresholds and compensation models.
//!
//! Every struct here deserializes with `#[serde(default)]`, so a partial JSON
//! document only overrides what it names. Defaults are tuned for an LED-lit
//! TCS3430-class sensor.

use serde::{Deserialize, Serialize};

use crate::color_science::chromaticity::ContaminationWeights;
use crate::color_science::color_space::MatrixSelection;
use crate::error::CalibrationError;

/// Acceptance gates for reference capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum `Z / (X + Y + Z)` for a blue capture.
    pub blue_z_ratio_min: f32,
    /// Minimum `(X + Y) / (X + Y + Z)` for a yellow capture.
    pub yellow_xy_ratio_min: f32,
    /// Maximum acceptable color error (ΔE).
    pub max_color_error: f32,
    pub min_signal_noise_ratio: f32,
    /// Minimum repeatability, percent.
    pub repeatability_threshold: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            blue_z_ratio_min: 0.6,
            yellow_xy_ratio_min: 0.8,
            max_color_error: 5.0,
            min_signal_noise_ratio: 10.0,
            repeatability_threshold: 90.0,
        }
    }
}

/// LED-driven IR compensation strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrCompensationConfig {
    /// Base compensation strength. Zero disables IR compensation.
    pub base_compensation: f32,
    /// Extra compensation per unit of luminance when adapting.
    pub brightness_response: f32,
    /// Expected IR / illumination ratio.
    pub ir_to_led_ratio: f32,
    pub adapt_to_brightness: bool,
    pub min_compensation: f32,
    pub max_compensation: f32,
}

impl Default for IrCompensationConfig {
    fn default() -> Self {
        Self {
            base_compensation: 0.08,
            brightness_response: 0.02,
            ir_to_led_ratio: 0.15,
            adapt_to_brightness: true,
            min_compensation: 0.02,
            max_compensation: 0.25,
        }
    }
}

/// Fraction of the IR contamination that leaks into each color channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralLeakageConfig {
    /// X, Y, Z leakage fractions.
    pub leakage: [f32; 3],
    /// Per-channel leakage when true, the uniform [`LegacyIrModel`] otherwise.
    pub per_channel: bool,
}

impl Default for SpectralLeakageConfig {
    fn default() -> Self {
        Self {
            leakage: [0.03, 0.015, 0.08],
            per_channel: true,
        }
    }
}

/// Uniform IR model used when per-channel leakage is disabled.
///
/// ```text
/// uniform = contamination × scale
/// channel *= 1 − uniform × sensitivity[channel]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyIrModel {
    pub scale: f32,
    /// X, Y, Z sensitivities.
    pub sensitivity: [f32; 3],
}

impl Default for LegacyIrModel {
    fn default() -> Self {
        Self {
            scale: 0.1,
            sensitivity: [0.5, 0.3, 1.0],
        }
    }
}

/// The non-reference part of the calibration data, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    pub thresholds: Thresholds,
    pub ir: IrCompensationConfig,
    pub spectral: SpectralLeakageConfig,
    pub legacy_ir: LegacyIrModel,
    pub contamination: ContaminationWeights,
    pub ambient_compensation: bool,
    /// Global IR compensation factor in [0, 1].
    pub ir_compensation_factor: f32,
    pub matrix: MatrixSelection,
    /// Row-major matrix used when `matrix` is [`MatrixSelection::Custom`].
    pub custom_matrix: Option<[f32; 9]>,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            ir: IrCompensationConfig::default(),
            spectral: SpectralLeakageConfig::default(),
            legacy_ir: LegacyIrModel::default(),
            contamination: ContaminationWeights::default(),
            ambient_compensation: true,
            ir_compensation_factor: 0.1,
            matrix: MatrixSelection::Standard,
            custom_matrix: None,
        }
    }
}

impl CalibrationSettings {
    pub fn from_json(json: &str) -> Result<Self, CalibrationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, CalibrationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
