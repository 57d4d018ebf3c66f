//! Error types for calibration and conversion.
//!
//! Nothing here is fatal to a conversion: every variant is recoverable by
//! falling back to a lower-fidelity method. The orchestrator does exactly
//! that and reports the method it ended up using.

use crate::calibration::ReferenceKind;

/// A calibration invariant that does not hold.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("white luminance {white} is not above black luminance {black}")]
    WhiteNotBrighter { white: f32, black: f32 },

    #[error("{reference} reference has a negative {channel} channel ({value})")]
    NegativeChannel {
        reference: ReferenceKind,
        channel: char,
        value: f32,
    },

    #[error("{reference} reference has a non-finite {channel} channel")]
    NonFinite {
        reference: ReferenceKind,
        channel: char,
    },

    #[error("IR compensation factor {0} is outside [0, 1]")]
    CompensationFactorOutOfRange(f32),

    #[error("{reference} reference quality {quality} is outside [0, 1]")]
    QualityOutOfRange {
        reference: ReferenceKind,
        quality: f32,
    },
}

/// Errors produced by the calibration store, the pipelines and the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("calibration data failed validation: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("{reference} capture rejected: dominance ratio {ratio:.3} below minimum {minimum:.3}")]
    CaptureRejected {
        reference: ReferenceKind,
        ratio: f32,
        minimum: f32,
    },

    #[error("{reference} capture requires black and white references first")]
    MissingPrerequisite { reference: ReferenceKind },

    #[error("4-point calibration incomplete ({completed}/4 references captured)")]
    IncompleteCalibration { completed: u8 },

    #[error("reference points are degenerate (tetrahedron volume {volume:e})")]
    DegenerateGeometry { volume: f32 },

    #[error("interpolation produced no usable weights")]
    InvalidWeights,

    #[error("invalid calibration settings: {0}")]
    Config(#[from] serde_json::Error),
}

impl CalibrationError {
    /// True for the capture-time rejections a caller should surface to the operator.
    pub fn is_capture_rejection(&self) -> bool {
        matches!(
            self,
            Self::CaptureRejected { .. } | Self::MissingPrerequisite { .. }
        )
    }
}
