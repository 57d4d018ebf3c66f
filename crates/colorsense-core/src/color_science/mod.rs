//! Color science: compensation stages, matrices, transfer functions and the
//! XYZ → RGB pipeline built from them.

pub mod chromaticity;
pub mod color_space;
pub mod compensation;
pub mod pipeline;
pub mod transfer;

pub use chromaticity::{
    ContaminationWeights, chromaticity, color_temperature, estimate_ir_contamination, mccamy_cct,
};
pub use color_space::{ColorMatrix, MatrixSelection, matrix_multiply_3x3};
pub use compensation::{
    apply_ambient_compensation, apply_ir_compensation, clamp, normalize_white_point,
};
pub use pipeline::ColorSciencePipeline;
pub use transfer::{SrgbTransfer, TransferFunction, quantize, srgb_decode, srgb_encode};
