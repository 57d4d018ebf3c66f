//! XYZ → linear RGB matrices and the 3x3 transform.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

/// A row-major 3x3 color matrix for linear color space conversions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatrix(pub [[f32; 3]; 3]);

impl ColorMatrix {
    /// XYZ → linear sRGB (ITU-R BT.709 primaries, D65 white).
    pub const SRGB_D65: Self = Self([
        [3.2406, -1.5372, -0.4986],
        [-0.9689, 1.8758, 0.0415],
        [0.0557, -0.2040, 1.0570],
    ]);

    /// XYZ → linear Adobe RGB (1998), the wide-gamut alternative.
    pub const ADOBE_RGB: Self = Self([
        [2.0413, -0.5649, -0.3447],
        [-0.9692, 1.8760, 0.0416],
        [0.0134, -0.1184, 1.0154],
    ]);

    /// Returns the identity matrix (no-op transform).
    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Build from nine row-major coefficients.
    pub fn from_row_major(m: [f32; 9]) -> Self {
        Self([[m[0], m[1], m[2]], [m[3], m[4], m[5]], [m[6], m[7], m[8]]])
    }

    /// Apply this matrix to a column vector.
    pub fn apply(&self, v: [f32; 3]) -> [f32; 3] {
        (self.to_mat3() * Vec3::from_array(v)).to_array()
    }

    fn to_mat3(self) -> Mat3 {
        // glam reads each inner array as a column, so rows load transposed.
        Mat3::from_cols_array_2d(&self.0).transpose()
    }
}

/// Which XYZ → RGB matrix the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixSelection {
    /// [`ColorMatrix::SRGB_D65`].
    #[default]
    Standard,
    /// [`ColorMatrix::ADOBE_RGB`].
    Alternate,
    /// The caller-supplied matrix stored with the calibration data.
    Custom,
}

/// Multiply a row-major 3x3 matrix (nine coefficients) by a vector.
pub fn matrix_multiply_3x3(matrix: &[f32; 9], input: [f32; 3]) -> [f32; 3] {
    ColorMatrix::from_row_major(*matrix).apply(input)
}
