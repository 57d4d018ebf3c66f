//! Chromaticity, correlated color temperature, and the IR contamination estimate.
//!
//! # Reference
//! - McCamy, C. S. (1992), Correlated color temperature as an explicit
//!   function of chromaticity coordinates

use serde::{Deserialize, Serialize};

use crate::reading::IrReading;

/// CIE 1931 chromaticity `(x, y)` of a tristimulus triple.
///
/// Returns `(0, 0)` when the triple sums to zero or less.
pub fn chromaticity(xyz: [f32; 3]) -> (f32, f32) {
    let sum = xyz[0] + xyz[1] + xyz[2];
    if sum > 0.0 {
        (xyz[0] / sum, xyz[1] / sum)
    } else {
        (0.0, 0.0)
    }
}

/// McCamy's cubic approximation of CCT (Kelvin) from chromaticity.
///
/// ```text
/// n   = (x − 0.3320) / (0.1858 − y)
/// CCT = 449 n³ + 3525 n² + 6823.3 n + 5520.33
/// ```
pub fn mccamy_cct(x: f32, y: f32) -> f32 {
    let n = (x - 0.3320) / (0.1858 - y);
    449.0 * n * n * n + 3525.0 * n * n + 6823.3 * n + 5520.33
}

/// CCT of a tristimulus triple, or `None` if it carries no signal.
pub fn color_temperature(xyz: [f32; 3]) -> Option<f32> {
    let sum = xyz[0] + xyz[1] + xyz[2];
    if sum <= 0.0 {
        return None;
    }
    let (x, y) = chromaticity(xyz);
    Some(mccamy_cct(x, y))
}

/// Weighting of the three IR contamination factors.
///
/// The defaults are empirical; they are kept configurable rather than derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContaminationWeights {
    /// Weight of the IR1/IR2 spectral-signature term.
    pub ratio: f32,
    /// Weight of the absolute IR level term.
    pub level: f32,
    /// Weight of the IR1/IR2 asymmetry term.
    pub asymmetry: f32,
}

impl Default for ContaminationWeights {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            level: 0.3,
            asymmetry: 0.2,
        }
    }
}

/// Estimate ambient IR contamination in [0, 1] from normalized IR channels.
///
/// ```text
/// ratio_term     = clamp((ir1/ir2 − 0.8) / 1.5, 0, 1)
/// level_term     = clamp(mean × 2, 0, 1)
/// asymmetry_term = clamp(|ir1 − ir2| × 3, 0, 1)
/// ```
pub fn estimate_ir_contamination(ir: &IrReading, weights: &ContaminationWeights) -> f32 {
    let ratio_term = ((ir.ratio - 0.8) / 1.5).clamp(0.0, 1.0);
    let level_term = (ir.mean * 2.0).clamp(0.0, 1.0);
    let asymmetry_term = ((ir.ir1 - ir.ir2).abs() * 3.0).clamp(0.0, 1.0);

    let total = weights.ratio * ratio_term
        + weights.level * level_term
        + weights.asymmetry * asymmetry_term;
    total.clamp(0.0, 1.0)
}
