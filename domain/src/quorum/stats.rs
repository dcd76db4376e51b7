//! Confidence statistics over one round's answers

use crate::response::schema::MAX_CONFIDENCE;
use serde::{Deserialize, Serialize};

/// Standard deviation above which a round is flagged as high variance
pub const HIGH_VARIANCE_STDDEV: f64 = 2.0;

/// Summary statistics of self-reported confidence scores
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub samples: usize,
    pub mean: f64,
    /// Population standard deviation; 0 with fewer than 2 samples
    pub stddev: f64,
    /// `[mean - stddev, mean + stddev]` clamped to `[0, 10]`
    pub interval: [f64; 2],
    /// Highest minus lowest score
    pub spread: u8,
    pub high_variance: bool,
}

impl ConfidenceStats {
    pub fn from_scores(scores: &[u8]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let n = scores.len() as f64;
        let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
        let stddev = if scores.len() < 2 {
            0.0
        } else {
            let variance = scores
                .iter()
                .map(|&s| (f64::from(s) - mean).powi(2))
                .sum::<f64>()
                / n;
            variance.sqrt()
        };

        let max = f64::from(MAX_CONFIDENCE);
        let interval = [
            (mean - stddev).clamp(0.0, max),
            (mean + stddev).clamp(0.0, max),
        ];

        let spread = scores.iter().max().copied().unwrap_or(0) - scores.iter().min().copied().unwrap_or(0);

        Self {
            samples: scores.len(),
            mean,
            stddev,
            interval,
            spread,
            high_variance: stddev > HIGH_VARIANCE_STDDEV,
        }
    }

    /// Width of the confidence interval
    pub fn interval_width(&self) -> f64 {
        self.interval[1] - self.interval[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_scores() {
        let stats = ConfidenceStats::from_scores(&[]);
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.interval, [0.0, 0.0]);
        assert!(!stats.high_variance);
    }

    #[test]
    fn test_single_sample_has_zero_stddev() {
        let stats = ConfidenceStats::from_scores(&[6]);
        assert_eq!(stats.mean, 6.0);
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.interval, [6.0, 6.0]);
        assert_eq!(stats.spread, 0);
    }

    #[test]
    fn test_population_stddev() {
        // mean 7, deviations 1,0,4,9 -> variance 14/4 = 3.5
        let stats = ConfidenceStats::from_scores(&[8, 7, 9, 4]);
        assert!(approx(stats.mean, 7.0));
        assert!(approx(stats.stddev, 3.5f64.sqrt()));
        assert_eq!(stats.spread, 5);
        assert!(!stats.high_variance);
    }

    #[test]
    fn test_interval_is_clamped() {
        // mean 5.5, stddev 4.5 -> raw interval [1, 10]
        let stats = ConfidenceStats::from_scores(&[1, 10]);
        assert!(approx(stats.stddev, 4.5));
        assert!(stats.high_variance);
        assert!(stats.interval[0] >= 0.0 && stats.interval[1] <= 10.0);

        // mean 8.75 with a large stddev would exceed 10 unclamped
        let stats = ConfidenceStats::from_scores(&[10, 10, 10, 5]);
        assert!(stats.mean + stats.stddev > 10.0);
        assert_eq!(stats.interval[1], 10.0);
    }

    #[test]
    fn test_stddev_never_negative() {
        for scores in [&[5u8, 5, 5][..], &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], &[0, 10]] {
            let stats = ConfidenceStats::from_scores(scores);
            assert!(stats.stddev >= 0.0);
            assert!(stats.interval[0] <= stats.interval[1]);
        }
    }
}
