//! The calibration aggregate and its invariant check.

use serde::{Deserialize, Serialize};

use super::reference::{ReferenceKind, ReferencePoint};
use super::settings::CalibrationSettings;
use super::status::CalibrationStatus;
use crate::color_science::color_space::{ColorMatrix, MatrixSelection};
use crate::error::ValidationFailure;

/// D65 white point, normalized so Y = 1.
pub const D65_WHITE: [f32; 3] = [0.95047, 1.0, 1.08883];

const CHANNEL_NAMES: [char; 3] = ['X', 'Y', 'Z'];

/// Everything the conversion pipelines read: four reference points, tunable
/// settings and progress flags.
///
/// Capture routines mutate one reference at a time; recalibration replaces
/// the whole aggregate (see [`CalibrationData::reset`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub black: ReferencePoint,
    pub white: ReferencePoint,
    pub blue: ReferencePoint,
    pub yellow: ReferencePoint,
    pub settings: CalibrationSettings,
    pub status: CalibrationStatus,
}

impl Default for CalibrationData {
    fn default() -> Self {
        Self {
            black: ReferencePoint::default(),
            white: ReferencePoint::from_normalized(D65_WHITE),
            blue: ReferencePoint::default(),
            yellow: ReferencePoint::default(),
            settings: CalibrationSettings::default(),
            status: CalibrationStatus::default(),
        }
    }
}

impl CalibrationData {
    pub fn with_settings(settings: CalibrationSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn reference(&self, kind: ReferenceKind) -> &ReferencePoint {
        match kind {
            ReferenceKind::Black => &self.black,
            ReferenceKind::White => &self.white,
            ReferenceKind::Blue => &self.blue,
            ReferenceKind::Yellow => &self.yellow,
        }
    }

    /// Overwrite one reference whole and mark it complete.
    pub fn set_reference(&mut self, kind: ReferenceKind, point: ReferencePoint) {
        let slot = match kind {
            ReferenceKind::Black => &mut self.black,
            ReferenceKind::White => &mut self.white,
            ReferenceKind::Blue => &mut self.blue,
            ReferenceKind::Yellow => &mut self.yellow,
        };
        *slot = point;
        self.status.mark(kind);
    }

    /// Replace the tunable settings, keeping references and progress.
    pub fn apply_settings(&mut self, settings: CalibrationSettings) {
        self.settings = settings;
    }

    /// Restore defaults. Recalibration starts from here.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The XYZ → linear RGB matrix chosen by the settings.
    ///
    /// `Custom` without a stored matrix resolves to the standard one.
    pub fn matrix(&self) -> ColorMatrix {
        match (self.settings.matrix, self.settings.custom_matrix) {
            (MatrixSelection::Standard, _) => ColorMatrix::SRGB_D65,
            (MatrixSelection::Alternate, _) => ColorMatrix::ADOBE_RGB,
            (MatrixSelection::Custom, Some(m)) => ColorMatrix::from_row_major(m),
            (MatrixSelection::Custom, None) => ColorMatrix::SRGB_D65,
        }
    }

    /// Check the invariants every conversion path relies on.
    ///
    /// ```text
    /// white.Y > black.Y
    /// every raw channel finite and ≥ 0
    /// ir_compensation_factor ∈ [0, 1]
    /// every quality ∈ [0, 1]
    /// ```
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        for kind in ReferenceKind::ALL {
            let point = self.reference(kind);
            for (i, &value) in point.raw.iter().enumerate() {
                let channel = CHANNEL_NAMES[i];
                if !value.is_finite() {
                    return Err(ValidationFailure::NonFinite {
                        reference: kind,
                        channel,
                    });
                }
                if value < 0.0 {
                    return Err(ValidationFailure::NegativeChannel {
                        reference: kind,
                        channel,
                        value,
                    });
                }
            }
            if !(0.0..=1.0).contains(&point.quality) {
                return Err(ValidationFailure::QualityOutOfRange {
                    reference: kind,
                    quality: point.quality,
                });
            }
        }

        let white = self.white.luminance();
        let black = self.black.luminance();
        if white <= black {
            return Err(ValidationFailure::WhiteNotBrighter { white, black });
        }

        let factor = self.settings.ir_compensation_factor;
        if !(0.0..=1.0).contains(&factor) {
            return Err(ValidationFailure::CompensationFactorOutOfRange(factor));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
