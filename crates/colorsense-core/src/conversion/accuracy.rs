//! Accuracy self-test: known raw points against their expected colors.

use serde::{Deserialize, Serialize};

/// Errors at or above this many RGB units count as failed probes.
pub const ERROR_CUTOFF: f32 = 100.0;

/// A raw tristimulus point and the color it should convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyProbe {
    pub xyz: [u16; 3],
    pub expected: [u8; 3],
}

impl AccuracyProbe {
    pub const fn new(xyz: [u16; 3], expected: [u8; 3]) -> Self {
        Self { xyz, expected }
    }

    pub fn counts(&self) -> [f32; 3] {
        self.xyz.map(f32::from)
    }
}

/// Built-in probes: mid gray, yellow, blue and red.
pub const DEFAULT_PROBES: [AccuracyProbe; 4] = [
    AccuracyProbe::new([8000, 8000, 8000], [128, 128, 128]),
    AccuracyProbe::new([15000, 15000, 2000], [255, 255, 0]),
    AccuracyProbe::new([2000, 4000, 15000], [0, 0, 255]),
    AccuracyProbe::new([15000, 8000, 8000], [255, 128, 128]),
];

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracySample {
    pub probe: AccuracyProbe,
    /// Euclidean RGB error.
    pub error: f32,
}

impl AccuracySample {
    /// Whether this sample enters the mean.
    pub fn is_counted(&self) -> bool {
        self.error < ERROR_CUTOFF
    }
}

/// Result of an accuracy self-test.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub samples: Vec<AccuracySample>,
    /// Mean error over counted samples; `None` when nothing was counted.
    pub mean_error: Option<f32>,
}

impl AccuracyReport {
    pub fn from_samples(samples: Vec<AccuracySample>) -> Self {
        let counted: Vec<f32> = samples
            .iter()
            .filter(|s| s.is_counted())
            .map(|s| s.error)
            .collect();
        let mean_error = if counted.is_empty() {
            None
        } else {
            Some(counted.iter().sum::<f32>() / counted.len() as f32)
        };
        Self {
            samples,
            mean_error,
        }
    }

    pub fn failed_probes(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_counted()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(error: f32) -> AccuracySample {
        AccuracySample {
            probe: DEFAULT_PROBES[0],
            error,
        }
    }

    #[test]
    fn test_mean_excludes_failed_probes() {
        let report = AccuracyReport::from_samples(vec![sample(10.0), sample(20.0), sample(999.0)]);
        assert_eq!(report.mean_error, Some(15.0));
        assert_eq!(report.failed_probes(), 1);
        assert_eq!(report.samples.len(), 3);
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let report = AccuracyReport::from_samples(vec![sample(100.0)]);
        assert_eq!(report.mean_error, None);
    }

    #[test]
    fn test_empty_report_has_no_mean() {
        assert_eq!(AccuracyReport::from_samples(Vec::new()).mean_error, None);
    }
}
