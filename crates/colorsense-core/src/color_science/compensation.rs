//! Signal compensation stages: black subtraction, IR removal, white normalization.
//!
//! All stages work on normalized tristimulus triples (counts / full scale).

use crate::calibration::CalibrationSettings;
use crate::reading::IrReading;

/// Floor applied after black subtraction so no channel reaches exact zero.
pub const AMBIENT_FLOOR: f32 = 0.001;
/// A channel left below this share of its input signals over-subtraction.
pub const OVER_SUBTRACTION_RATIO: f32 = 0.1;
/// Share of the black reference subtracted on the over-subtraction retry.
pub const BLACK_REDUCTION: f32 = 0.5;
/// No channel may fall below this share of the largest channel.
pub const MIN_CHANNEL_RATIO: f32 = 0.01;

/// Clamp a scalar to `[min, max]`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Subtract the black reference, guarding against noisy dark captures.
///
/// ```text
/// out = max(xyz − black, 0.001)
/// if any out[c] < 0.1 × xyz[c]:  out = max(xyz − 0.5 × black, 0.001)
/// out[c] = max(out[c], 0.01 × max(out))
/// ```
pub fn apply_ambient_compensation(xyz: [f32; 3], black: [f32; 3]) -> [f32; 3] {
    let subtract = |scale: f32| -> [f32; 3] {
        std::array::from_fn(|c| (xyz[c] - black[c] * scale).max(AMBIENT_FLOOR))
    };

    let mut out = subtract(1.0);
    let over_subtracted = (0..3).any(|c| out[c] < xyz[c] * OVER_SUBTRACTION_RATIO);
    if over_subtracted {
        tracing::trace!(?xyz, ?black, "over-subtraction, retrying with half black");
        out = subtract(BLACK_REDUCTION);
    }

    let floor = out[0].max(out[1]).max(out[2]) * MIN_CHANNEL_RATIO;
    out.map(|c| c.max(floor))
}

/// Remove LED-driven IR leakage from a normalized triple.
///
/// ```text
/// comp          = base                                  (fixed)
///               = clamp(base + Y × response, min, max)  (adaptive)
/// contamination = mean(ir1, ir2) × comp
/// per-channel:  c −= c × leakage[c] × contamination
/// uniform:      c ×= 1 − contamination × scale × sensitivity[c]
/// ```
///
/// Disabled when the base compensation is not positive. Output is never negative.
pub fn apply_ir_compensation(
    xyz: [f32; 3],
    ir: &IrReading,
    settings: &CalibrationSettings,
) -> [f32; 3] {
    let config = &settings.ir;
    if config.base_compensation <= 0.0 {
        return xyz;
    }

    let compensation = if config.adapt_to_brightness {
        let brightness = xyz[1];
        clamp(
            config.base_compensation + brightness * config.brightness_response,
            config.min_compensation,
            config.max_compensation,
        )
    } else {
        config.base_compensation
    };
    let contamination = (ir.ir1 + ir.ir2) / 2.0 * compensation;

    let out: [f32; 3] = if settings.spectral.per_channel {
        let leakage = settings.spectral.leakage;
        std::array::from_fn(|c| xyz[c] - xyz[c] * leakage[c] * contamination)
    } else {
        let legacy = &settings.legacy_ir;
        let uniform = contamination * legacy.scale;
        std::array::from_fn(|c| xyz[c] * (1.0 - uniform * legacy.sensitivity[c]))
    };
    out.map(|c| c.max(0.0))
}

/// Divide each channel by the white reference.
///
/// A non-positive white channel yields 0 for that channel.
pub fn normalize_white_point(xyz: [f32; 3], white: [f32; 3]) -> [f32; 3] {
    std::array::from_fn(|c| {
        if white[c] > 0.0 {
            xyz[c] / white[c]
        } else {
            0.0
        }
    })
}
