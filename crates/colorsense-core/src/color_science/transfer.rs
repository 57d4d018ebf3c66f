//! sRGB transfer function (OETF/EOTF) and 8-bit quantization.
//!
//! Transfer functions convert between non-linear (encoded) and linear light values.

/// A transfer function that converts between linear and non-linear encodings.
pub trait TransferFunction: Send + Sync {
    /// Convert from non-linear (encoded) to linear light.
    fn to_linear(&self, encoded: f32) -> f32;

    /// Convert from linear light to non-linear (encoded).
    fn to_encoded(&self, linear: f32) -> f32;
}

/// sRGB transfer function per IEC 61966-2-1.
///
/// ```text
/// to_linear:   V <= 0.04045 → V / 12.92
///              V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
///
/// from_linear: L <= 0.0031308 → L × 12.92
///              L >  0.0031308 → 1.055 × L^(1/2.4) − 0.055
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SrgbTransfer;

impl SrgbTransfer {
    const THRESHOLD: f32 = 0.003_130_8;
    const LINEAR_COEFF: f32 = 12.92;
    const SCALE: f32 = 1.055;
    const OFFSET: f32 = 0.055;
    const GAMMA: f32 = 2.4;
}

impl TransferFunction for SrgbTransfer {
    fn to_linear(&self, encoded: f32) -> f32 {
        if encoded <= Self::THRESHOLD * Self::LINEAR_COEFF {
            encoded / Self::LINEAR_COEFF
        } else {
            ((encoded + Self::OFFSET) / Self::SCALE).powf(Self::GAMMA)
        }
    }

    fn to_encoded(&self, linear: f32) -> f32 {
        if linear <= Self::THRESHOLD {
            linear * Self::LINEAR_COEFF
        } else {
            Self::SCALE * linear.powf(1.0 / Self::GAMMA) - Self::OFFSET
        }
    }
}

/// Gamma-encode a linear channel.
pub fn srgb_encode(linear: f32) -> f32 {
    SrgbTransfer.to_encoded(linear)
}

/// Inverse gamma: encoded channel back to linear light.
pub fn srgb_decode(encoded: f32) -> f32 {
    SrgbTransfer.to_linear(encoded)
}

/// Scale an encoded [0, 1] channel to an 8-bit value, clamping and rounding.
pub fn quantize(encoded: f32) -> u8 {
    (encoded * 255.0).clamp(0.0, 255.0).round() as u8
}
