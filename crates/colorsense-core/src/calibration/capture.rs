//! Reference capture: turns one sensor reading into a reference point.
//!
//! A capture either writes its reference whole and marks it complete, or
//! fails and leaves the stored reference untouched.

use super::data::CalibrationData;
use super::reference::{ReferenceKind, ReferencePoint};
use crate::error::{CalibrationError, ValidationFailure};
use crate::reading::RawReading;

/// Total black signal (X + Y + Z counts) below which a capture is rated good.
const BLACK_LOW_SIGNAL: f32 = 5000.0;

impl CalibrationData {
    /// Capture the black (dark) reference. Always accepted.
    ///
    /// Quality is 0.9 for a low total signal and 0.5 otherwise.
    pub fn capture_black(
        &mut self,
        reading: &RawReading,
        timestamp_ms: u64,
    ) -> Result<ReferencePoint, CalibrationError> {
        let counts = reading.counts();
        let total: f32 = counts.iter().sum();
        let quality = if total < BLACK_LOW_SIGNAL { 0.9 } else { 0.5 };
        Ok(self.store(ReferenceKind::Black, reading, quality, timestamp_ms))
    }

    /// Capture the white reference.
    ///
    /// Rejected when black is already captured and white is not brighter.
    /// Quality is the share of white luminance above black.
    pub fn capture_white(
        &mut self,
        reading: &RawReading,
        timestamp_ms: u64,
    ) -> Result<ReferencePoint, CalibrationError> {
        let white_y = reading.y as f32;
        let quality = if self.status.black {
            let black_y = self.black.luminance();
            if white_y <= black_y {
                tracing::warn!(white_y, black_y, "white capture rejected: not brighter than black");
                return Err(ValidationFailure::WhiteNotBrighter {
                    white: white_y,
                    black: black_y,
                }
                .into());
            }
            ((white_y - black_y) / white_y).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Ok(self.store(ReferenceKind::White, reading, quality, timestamp_ms))
    }

    /// Capture the blue reference, gated on `Z / (X + Y + Z)`.
    pub fn capture_blue(
        &mut self,
        reading: &RawReading,
        timestamp_ms: u64,
    ) -> Result<ReferencePoint, CalibrationError> {
        let counts = reading.counts();
        let ratio = dominance_ratio(counts[2], counts);
        let minimum = self.settings.thresholds.blue_z_ratio_min;
        self.capture_chromatic(ReferenceKind::Blue, reading, ratio, minimum, timestamp_ms)
    }

    /// Capture the yellow reference, gated on `(X + Y) / (X + Y + Z)`.
    pub fn capture_yellow(
        &mut self,
        reading: &RawReading,
        timestamp_ms: u64,
    ) -> Result<ReferencePoint, CalibrationError> {
        let counts = reading.counts();
        let ratio = dominance_ratio(counts[0] + counts[1], counts);
        let minimum = self.settings.thresholds.yellow_xy_ratio_min;
        self.capture_chromatic(ReferenceKind::Yellow, reading, ratio, minimum, timestamp_ms)
    }

    fn capture_chromatic(
        &mut self,
        reference: ReferenceKind,
        reading: &RawReading,
        ratio: f32,
        minimum: f32,
        timestamp_ms: u64,
    ) -> Result<ReferencePoint, CalibrationError> {
        if !self.status.is_2_point_calibrated() {
            tracing::warn!(%reference, "capture attempted before black and white");
            return Err(CalibrationError::MissingPrerequisite { reference });
        }
        if ratio < minimum {
            tracing::warn!(%reference, ratio, minimum, "capture rejected: not saturated enough");
            return Err(CalibrationError::CaptureRejected {
                reference,
                ratio,
                minimum,
            });
        }
        Ok(self.store(reference, reading, ratio, timestamp_ms))
    }

    fn store(
        &mut self,
        kind: ReferenceKind,
        reading: &RawReading,
        quality: f32,
        timestamp_ms: u64,
    ) -> ReferencePoint {
        let ir = reading
            .ir()
            .with_estimates(reading.normalized(), &self.settings.contamination);
        let point = ReferencePoint::new(reading.counts(), ir, quality, timestamp_ms);
        self.set_reference(kind, point);
        tracing::info!(
            reference = %kind,
            quality,
            progress = self.status.progress_percent(),
            "reference captured"
        );
        point
    }
}

/// `part / (X + Y + Z)`, or 0 when the reading carries no signal.
fn dominance_ratio(part: f32, counts: [f32; 3]) -> f32 {
    let total = counts[0] + counts[1] + counts[2];
    if total > 0.0 { part / total } else { 0.0 }
}
