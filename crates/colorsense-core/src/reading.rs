//! Sensor readings and the RGB record produced from them.

use serde::{Deserialize, Serialize};

use crate::color_science::chromaticity::{
    ContaminationWeights, chromaticity, estimate_ir_contamination, mccamy_cct,
};
use crate::color_science::transfer::srgb_decode;

/// Full-scale count of the sensor's 16-bit channels.
pub const SENSOR_FULL_SCALE: f32 = 65535.0;

/// One raw sample from the five-channel sensor: three color channels
/// (X, Y, Z) and two near-infrared channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawReading {
    pub x: u16,
    pub y: u16,
    pub z: u16,
    pub ir1: u16,
    pub ir2: u16,
}

impl RawReading {
    pub const fn new(x: u16, y: u16, z: u16, ir1: u16, ir2: u16) -> Self {
        Self { x, y, z, ir1, ir2 }
    }

    /// Color channels as floating-point counts.
    pub fn counts(&self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }

    /// Color channels divided by the sensor full scale.
    pub fn normalized(&self) -> [f32; 3] {
        normalize_counts(self.counts())
    }

    /// IR channels, normalized by full scale.
    pub fn ir(&self) -> IrReading {
        IrReading::new(
            self.ir1 as f32 / SENSOR_FULL_SCALE,
            self.ir2 as f32 / SENSOR_FULL_SCALE,
        )
    }
}

/// Divide a count triple by the sensor full scale.
pub fn normalize_counts(counts: [f32; 3]) -> [f32; 3] {
    [
        counts[0] / SENSOR_FULL_SCALE,
        counts[1] / SENSOR_FULL_SCALE,
        counts[2] / SENSOR_FULL_SCALE,
    ]
}

/// Near-infrared measurement attached to a reading or reference point.
///
/// `ir1` and `ir2` are normalized to [0, 1]. `ratio` and `mean` are always
/// derived from them; `temperature_estimate` and `ambient_level` are only
/// filled in by [`IrReading::with_estimates`] (capture time).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrReading {
    pub ir1: f32,
    pub ir2: f32,
    pub ratio: f32,
    pub mean: f32,
    /// McCamy CCT (Kelvin) of the tristimulus captured alongside this IR sample.
    pub temperature_estimate: f32,
    /// Estimated IR contamination in [0, 1].
    pub ambient_level: f32,
}

impl IrReading {
    pub fn new(ir1: f32, ir2: f32) -> Self {
        Self {
            ir1,
            ir2,
            ratio: if ir2 != 0.0 { ir1 / ir2 } else { 1.0 },
            mean: (ir1 + ir2) / 2.0,
            temperature_estimate: 0.0,
            ambient_level: 0.0,
        }
    }

    /// Fill the capture-time estimates from the accompanying tristimulus.
    pub fn with_estimates(mut self, xyz: [f32; 3], weights: &ContaminationWeights) -> Self {
        let (x, y) = chromaticity(xyz);
        self.temperature_estimate = if x == 0.0 && y == 0.0 {
            0.0
        } else {
            mccamy_cct(x, y)
        };
        self.ambient_level = estimate_ir_contamination(&self, weights);
        self
    }
}

impl Default for IrReading {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A converted color.
///
/// `linear` holds linear-light channels in [0, 1], `encoded` the
/// sRGB-encoded channels in [0, 1], and `rgb8` the quantized display value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RgbColor {
    pub linear: [f32; 3],
    pub encoded: [f32; 3],
    pub rgb8: [u8; 3],
}

impl RgbColor {
    /// Build from an 8-bit display value, recovering the float channels.
    pub fn from_rgb8(rgb8: [u8; 3]) -> Self {
        let encoded = rgb8.map(|c| c as f32 / 255.0);
        Self {
            linear: encoded.map(srgb_decode),
            encoded,
            rgb8,
        }
    }

    /// Build from display-scale channels in [0, 255], clamping and rounding.
    pub fn from_scaled(rgb: [f32; 3]) -> Self {
        let scaled = rgb.map(|c| c.clamp(0.0, 255.0));
        let encoded = scaled.map(|c| c / 255.0);
        Self {
            linear: encoded.map(srgb_decode),
            encoded,
            rgb8: scaled.map(|c| c.round() as u8),
        }
    }

    /// Euclidean distance to another 8-bit value, in RGB units.
    pub fn distance_to(&self, other: [u8; 3]) -> f32 {
        let d: f32 = (0..3)
            .map(|i| {
                let delta = self.rgb8[i] as f32 - other[i] as f32;
                delta * delta
            })
            .sum();
        d.sqrt()
    }
}
