//! Corner weights of a tetrahedral interpolation.

use serde::{Deserialize, Serialize};

use crate::calibration::ReferenceKind;

/// Tolerance below zero still counted as inside the tetrahedron.
pub const INSIDE_TOLERANCE: f32 = -0.001;

/// Blend weights of the four reference corners.
///
/// `valid` is false when no usable weights could be computed: non-finite
/// input, or a point so far out that every inverse distance vanishes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TetrahedralWeights {
    pub black: f32,
    pub white: f32,
    pub blue: f32,
    pub yellow: f32,
    pub valid: bool,
}

impl TetrahedralWeights {
    /// Weights in [`ReferenceKind::ALL`] order, marked valid.
    pub fn from_array(w: [f32; 4]) -> Self {
        Self {
            black: w[0],
            white: w[1],
            blue: w[2],
            yellow: w[3],
            valid: true,
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.black, self.white, self.blue, self.yellow]
    }

    pub fn get(&self, kind: ReferenceKind) -> f32 {
        self.to_array()[kind.index()]
    }

    pub fn sum(&self) -> f32 {
        self.to_array().iter().sum()
    }

    /// Every weight at or above [`INSIDE_TOLERANCE`].
    pub fn is_inside_tetrahedron(&self) -> bool {
        self.to_array().iter().all(|&w| w >= INSIDE_TOLERANCE)
    }

    /// Scale so the weights sum to one.
    ///
    /// A sum that is not finite and positive cannot be scaled; the set is
    /// marked invalid instead.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum.is_finite() && sum > 0.0 {
            self.black /= sum;
            self.white /= sum;
            self.blue /= sum;
            self.yellow /= sum;
        } else {
            self.valid = false;
        }
    }

    /// Weighted sum of the corner target colors, unclamped.
    pub fn blend(&self) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for kind in ReferenceKind::ALL {
            let w = self.get(kind);
            let target = kind.target_rgb();
            for c in 0..3 {
                out[c] += w * target[c];
            }
        }
        out
    }
}
