//! Calibration progress flags.

use serde::{Deserialize, Serialize};

use super::reference::ReferenceKind;

/// Which of the four references have been captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalibrationStatus {
    pub black: bool,
    pub white: bool,
    pub blue: bool,
    pub yellow: bool,
}

impl CalibrationStatus {
    /// Black and white captured: the linear mapping is available.
    pub fn is_2_point_calibrated(&self) -> bool {
        self.black && self.white
    }

    /// All four captured: tetrahedral interpolation is available.
    pub fn is_4_point_calibrated(&self) -> bool {
        self.black && self.white && self.blue && self.yellow
    }

    pub fn completed_steps(&self) -> u8 {
        [self.black, self.white, self.blue, self.yellow]
            .into_iter()
            .filter(|&done| done)
            .count() as u8
    }

    pub fn progress_percent(&self) -> f32 {
        self.completed_steps() as f32 / 4.0 * 100.0
    }

    pub fn is_complete(&self, kind: ReferenceKind) -> bool {
        match kind {
            ReferenceKind::Black => self.black,
            ReferenceKind::White => self.white,
            ReferenceKind::Blue => self.blue,
            ReferenceKind::Yellow => self.yellow,
        }
    }

    pub fn mark(&mut self, kind: ReferenceKind) {
        match kind {
            ReferenceKind::Black => self.black = true,
            ReferenceKind::White => self.white = true,
            ReferenceKind::Blue => self.blue = true,
            ReferenceKind::Yellow => self.yellow = true,
        }
    }
}
