//! Reference points: the four captured calibration anchors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reading::{IrReading, SENSOR_FULL_SCALE, normalize_counts};

/// Identifies one of the four calibration anchors.
///
/// Also serves as the corner tag of the interpolation tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Black,
    White,
    Blue,
    Yellow,
}

impl ReferenceKind {
    /// All anchors, in corner order.
    pub const ALL: [Self; 4] = [Self::Black, Self::White, Self::Blue, Self::Yellow];

    /// Position in [`ReferenceKind::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Black => 0,
            Self::White => 1,
            Self::Blue => 2,
            Self::Yellow => 3,
        }
    }

    /// Display color this anchor stands for.
    pub const fn target_rgb(self) -> [f32; 3] {
        match self {
            Self::Black => [0.0, 0.0, 0.0],
            Self::White => [255.0, 255.0, 255.0],
            Self::Blue => [0.0, 0.0, 255.0],
            Self::Yellow => [255.0, 255.0, 0.0],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One captured calibration anchor.
///
/// Always written whole: a capture replaces the entire struct.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Raw tristimulus counts.
    pub raw: [f32; 3],
    /// `raw` divided by the sensor full scale.
    pub normalized: [f32; 3],
    pub ir: IrReading,
    /// Capture quality in [0, 1].
    pub quality: f32,
    /// Caller-supplied capture time in milliseconds.
    pub timestamp_ms: u64,
}

impl ReferencePoint {
    pub fn new(raw: [f32; 3], ir: IrReading, quality: f32, timestamp_ms: u64) -> Self {
        Self {
            raw,
            normalized: normalize_counts(raw),
            ir,
            quality,
            timestamp_ms,
        }
    }

    /// A reference whose normalized triple is given directly (defaults, tests).
    pub fn from_normalized(normalized: [f32; 3]) -> Self {
        Self {
            raw: normalized.map(|c| c * SENSOR_FULL_SCALE),
            normalized,
            ir: IrReading::default(),
            quality: 0.0,
            timestamp_ms: 0,
        }
    }

    /// Luminance (Y) channel of the raw triple.
    pub fn luminance(&self) -> f32 {
        self.raw[1]
    }
}

impl Default for ReferencePoint {
    fn default() -> Self {
        Self::from_normalized([0.0, 0.0, 0.0])
    }
}
