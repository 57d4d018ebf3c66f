//! Tetrahedral interpolation between the four calibration references.

pub mod geometry;
pub mod tetrahedral;
pub mod weights;

pub use geometry::{Tetrahedron, WeightSource};
pub use tetrahedral::{InterpolationStats, TetrahedralInterpolator};
pub use weights::TetrahedralWeights;
