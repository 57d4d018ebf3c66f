//! Colorsense Core: calibration model and sensor-to-RGB conversion.
//!
//! Turns raw counts from a five-channel tristimulus + IR sensor into display
//! color. Two conversion engines share one calibration store: a deterministic
//! color-science pipeline and a four-point tetrahedral interpolator, with an
//! orchestrator choosing between them. No I/O, no global state.

pub mod calibration;
pub mod color_science;
pub mod conversion;
pub mod error;
pub mod interpolation;
pub mod reading;

// Re-exports for convenience.
pub use calibration::{
    CalibrationData, CalibrationSettings, CalibrationStatus, ReferenceKind, ReferencePoint,
};
pub use color_science::ColorSciencePipeline;
pub use conversion::{
    AccuracyProbe, AccuracyReport, Conversion, ConversionMethod, ConversionOrchestrator,
    ConversionStats, SharedOrchestrator,
};
pub use error::{CalibrationError, ValidationFailure};
pub use interpolation::{TetrahedralInterpolator, TetrahedralWeights, WeightSource};
pub use reading::{IrReading, RawReading, RgbColor, SENSOR_FULL_SCALE};
