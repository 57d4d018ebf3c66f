//! Conversion orchestration and the accuracy self-test.

pub mod accuracy;
pub mod orchestrator;

pub use accuracy::{AccuracyProbe, AccuracyReport, AccuracySample, DEFAULT_PROBES, ERROR_CUTOFF};
pub use orchestrator::{
    Conversion, ConversionMethod, ConversionOrchestrator, ConversionStats, SharedOrchestrator,
};
