//! Statistical reductions used by the measurement engine
//!
//! Observation summaries use a fixed normal approximation for confidence
//! intervals, and time-weighted averages integrate right-continuous step
//! functions recorded as `(timestamp, value)` logs.

use serde::Serialize;
use tracing::warn;

use crate::types::defaults;

/// z-score of the two-sided 95% normal interval
pub const Z_SCORE_95: f64 = 1.96;

/// Summary of an unordered observation sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationSummary {
    /// Number of observations
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Bessel-corrected sample standard deviation (0 for fewer than two samples)
    pub std_dev: f64,
    /// Confidence level the interval was requested at
    pub confidence_level: f64,
    /// `(lower, upper)` bounds of the confidence interval for the mean
    #[serde(rename = "confidence_interval_95")]
    pub confidence_interval: (f64, f64),
}

impl ObservationSummary {
    /// Summary of an empty sequence: every statistic is zero
    pub fn empty(confidence_level: f64) -> Self {
        Self {
            count: 0,
            mean: 0.0,
            std_dev: 0.0,
            confidence_level,
            confidence_interval: (0.0, 0.0),
        }
    }

    /// Summarize `samples` with a normal-approximation interval
    ///
    /// Only the 95% level is exact; any other level falls back to z = 1.96
    /// with a warning.
    pub fn from_samples(samples: &[f64], confidence_level: f64) -> Self {
        let count = samples.len();
        if count == 0 {
            return Self::empty(confidence_level);
        }

        let mean = mean(samples);
        let std_dev = if count > 1 {
            let sum_sq: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        let half_width = z_score(confidence_level) * std_dev / (count as f64).sqrt();

        Self {
            count,
            mean,
            std_dev,
            confidence_level,
            confidence_interval: (mean - half_width, mean + half_width),
        }
    }

    /// Half-width of the confidence interval
    pub fn half_width(&self) -> f64 {
        (self.confidence_interval.1 - self.confidence_interval.0) / 2.0
    }
}

/// z-score used for a requested confidence level
pub fn z_score(confidence_level: f64) -> f64 {
    if (confidence_level - defaults::CONFIDENCE_LEVEL).abs() > f64::EPSILON {
        warn!(
            requested = confidence_level,
            "Only the 95% confidence level is supported; using z = {}", Z_SCORE_95
        );
    }
    Z_SCORE_95
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

/// Time-weighted average of a step function over `total_duration`
///
/// Value `v_i` holds from `t_i` until `t_{i+1}`, the last value until
/// `end_time`. Segments are clipped at `end_time`.
pub fn time_weighted_average(log: &[(f64, usize)], end_time: f64, total_duration: f64) -> f64 {
    if total_duration <= 0.0 {
        return 0.0;
    }

    let area: f64 = log
        .iter()
        .enumerate()
        .map(|(i, &(t, value))| {
            let next = log.get(i + 1).map_or(end_time, |&(t_next, _)| t_next.min(end_time));
            (next - t).max(0.0) * value as f64
        })
        .sum();

    area / total_duration
}
