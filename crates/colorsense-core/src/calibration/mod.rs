//! Calibration store: reference points, settings, progress and capture.

pub mod capture;
pub mod data;
pub mod reference;
pub mod settings;
pub mod status;

pub use data::{CalibrationData, D65_WHITE};
pub use reference::{ReferenceKind, ReferencePoint};
pub use settings::{
    CalibrationSettings, IrCompensationConfig, LegacyIrModel, SpectralLeakageConfig, Thresholds,
};
pub use status::CalibrationStatus;
