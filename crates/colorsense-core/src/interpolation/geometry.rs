//! Tetrahedron geometry and the barycentric solve with its fallbacks.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use super::weights::TetrahedralWeights;
use crate::calibration::ReferenceKind;

/// Below this |determinant| the barycentric system is treated as degenerate.
pub const DETERMINANT_EPSILON: f32 = 1e-4;
/// Added to every distance before inverting it.
pub const DISTANCE_EPSILON: f32 = 0.001;

/// How a weight set was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    /// Exact barycentric solve, point inside the tetrahedron.
    Barycentric,
    /// Degenerate system; inverse-distance over the three nearest corners.
    Triangular,
    /// Point outside the tetrahedron; inverse-distance over all four corners.
    DistanceWeighted,
    /// No weights could be computed (non-finite or unboundedly distant point).
    Invalid,
}

/// Four corner points in normalized sensor space, indexed by [`ReferenceKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tetrahedron {
    corners: [Vec3; 4],
}

impl Tetrahedron {
    pub fn new(black: Vec3, white: Vec3, blue: Vec3, yellow: Vec3) -> Self {
        Self {
            corners: [black, white, blue, yellow],
        }
    }

    pub fn corner(&self, kind: ReferenceKind) -> Vec3 {
        self.corners[kind.index()]
    }

    /// Scalar triple product of the edges leaving the black corner.
    ///
    /// ```text
    /// V = (white − black) · ((blue − black) × (yellow − black))
    /// ```
    ///
    /// Six times the signed volume; zero for coplanar corners.
    pub fn volume(&self) -> f32 {
        let black = self.corner(ReferenceKind::Black);
        let e1 = self.corner(ReferenceKind::White) - black;
        let e2 = self.corner(ReferenceKind::Blue) - black;
        let e3 = self.corner(ReferenceKind::Yellow) - black;
        e1.dot(e2.cross(e3))
    }

    /// Blend weights for `point` and the route that produced them.
    ///
    /// Solves, by Cramer's rule with yellow as the origin,
    ///
    /// ```text
    /// [black − yellow | white − yellow | blue − yellow] · (wk, ww, wb)ᵀ = point − yellow
    /// wy = 1 − wk − ww − wb
    /// ```
    ///
    /// then falls back to [`WeightSource::Triangular`] when the system is
    /// degenerate, or [`WeightSource::DistanceWeighted`] when the point lies
    /// outside.
    pub fn solve(&self, point: Vec3) -> (TetrahedralWeights, WeightSource) {
        if !point.is_finite() {
            return (TetrahedralWeights::invalid(), WeightSource::Invalid);
        }

        let origin = self.corner(ReferenceKind::Yellow);
        let a = self.corner(ReferenceKind::Black) - origin;
        let b = self.corner(ReferenceKind::White) - origin;
        let c = self.corner(ReferenceKind::Blue) - origin;
        let rhs = point - origin;

        let det = Mat3::from_cols(a, b, c).determinant();
        if !det.is_finite() || det.abs() < DETERMINANT_EPSILON {
            return checked(self.triangular_weights(point), WeightSource::Triangular);
        }

        let black = Mat3::from_cols(rhs, b, c).determinant() / det;
        let white = Mat3::from_cols(a, rhs, c).determinant() / det;
        let blue = Mat3::from_cols(a, b, rhs).determinant() / det;
        let weights = TetrahedralWeights::from_array([black, white, blue, 1.0 - black - white - blue]);

        if weights.is_inside_tetrahedron() {
            (weights, WeightSource::Barycentric)
        } else {
            checked(self.distance_weights(point), WeightSource::DistanceWeighted)
        }
    }

    fn inverse_distances(&self, point: Vec3) -> [f32; 4] {
        self.corners
            .map(|corner| 1.0 / (point.distance(corner) + DISTANCE_EPSILON))
    }

    /// Inverse-distance weights over all four corners.
    pub fn distance_weights(&self, point: Vec3) -> TetrahedralWeights {
        let mut weights = TetrahedralWeights::from_array(self.inverse_distances(point));
        weights.normalize();
        weights
    }

    /// Inverse-distance weights over the three corners nearest `point`.
    ///
    /// The farthest corner gets weight zero; ties drop the earliest corner
    /// in [`ReferenceKind::ALL`] order.
    pub fn triangular_weights(&self, point: Vec3) -> TetrahedralWeights {
        let distances = self.corners.map(|corner| point.distance(corner));
        let mut farthest = 0;
        for i in 1..4 {
            if distances[i] > distances[farthest] {
                farthest = i;
            }
        }

        let mut inverse = distances.map(|d| 1.0 / (d + DISTANCE_EPSILON));
        inverse[farthest] = 0.0;
        let mut weights = TetrahedralWeights::from_array(inverse);
        weights.normalize();
        weights
    }
}

/// Fallback weights keep their route only if they could be normalized.
fn checked(weights: TetrahedralWeights, source: WeightSource) -> (TetrahedralWeights, WeightSource) {
    if weights.valid {
        (weights, source)
    } else {
        (weights, WeightSource::Invalid)
    }
}
