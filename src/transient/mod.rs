//! Batch-means warm-up detection
//!
//! Stateless functions over a raw observation sequence (typically
//! [`Measure::wait_times`](crate::measure::Measure::wait_times)). The
//! sequence is cut into contiguous batches, and for every candidate cutoff
//! `k` the mean of the remaining batches is compared with the global mean.
//! The warm-up ends at the first `k` after which that relative error stays
//! below a threshold for `patience` consecutive cutoffs.
//!
//! # Usage Example
//!
//! ```rust
//! use queue_kpi_simulator::transient::{calculate_transient_data, find_transient_end};
//!
//! let raw = [1.0, 1.0, 9.0, 9.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0];
//! let data = calculate_transient_data(&raw, 6)?;
//! assert_eq!(data.batch_means, vec![1.0, 9.0, 5.0, 5.0, 5.0, 5.0]);
//!
//! let k = find_transient_end(&data.rk, 0.05, 2);
//! assert_eq!(k, 2);
//! assert_eq!(data.observation_cutoff(k), 4);
//! # Ok::<(), queue_kpi_simulator::simulation::QueueError>(())
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::measure::{mean, ObservationSummary};
use crate::simulation::{QueueError, QueueResult};
use crate::types::{defaults, TransientConfig};

/// Intermediate arrays of the batch-means analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransientData {
    /// Mean of each non-empty batch
    pub batch_means: Vec<f64>,
    /// Number of raw observations in each non-empty batch
    pub batch_sizes: Vec<usize>,
    /// Mean of the batch means
    pub global_mean: f64,
    /// `xk_bar[k]` is the mean of `batch_means[k..]`
    pub xk_bar: Vec<f64>,
    /// Relative error of `xk_bar[k]` against the global mean
    pub rk: Vec<f64>,
}

impl TransientData {
    /// Number of raw observations covered by the first `k` batches
    pub fn observation_cutoff(&self, k: usize) -> usize {
        self.batch_sizes.iter().take(k).sum()
    }

    /// Number of batches that held data
    pub fn num_batches(&self) -> usize {
        self.batch_means.len()
    }
}

/// Split `raw` into `num_batches` batches and compute the relative-error curve
///
/// Batch sizes differ by at most one, with the longer batches first.
pub fn calculate_transient_data(raw: &[f64], num_batches: usize) -> QueueResult<TransientData> {
    if num_batches == 0 {
        return Err(QueueError::InvalidBatchCount);
    }
    if raw.len() < num_batches {
        return Err(QueueError::insufficient_data(raw.len(), num_batches));
    }

    let base = raw.len() / num_batches;
    let extra = raw.len() % num_batches;

    let mut batch_means = Vec::with_capacity(num_batches);
    let mut batch_sizes = Vec::with_capacity(num_batches);
    let mut offset = 0;
    for index in 0..num_batches {
        let size = base + usize::from(index < extra);
        let batch = &raw[offset..offset + size];
        offset += size;
        if batch.is_empty() {
            continue;
        }
        batch_means.push(mean(batch));
        batch_sizes.push(size);
    }

    let global_mean = mean(&batch_means);

    let mut xk_bar = vec![0.0; batch_means.len()];
    let mut suffix_sum = 0.0;
    for k in (0..batch_means.len()).rev() {
        suffix_sum += batch_means[k];
        xk_bar[k] = suffix_sum / (batch_means.len() - k) as f64;
    }

    let rk = if global_mean == 0.0 {
        vec![0.0; xk_bar.len()]
    } else {
        xk_bar.iter().map(|x| (x - global_mean) / global_mean).collect()
    };

    debug!(
        observations = raw.len(),
        batches = batch_means.len(),
        global_mean,
        "Computed transient data"
    );

    Ok(TransientData { batch_means, batch_sizes, global_mean, xk_bar, rk })
}

/// First batch index after which `|rk|` stays below `threshold` for `patience` batches
///
/// Candidate cutoffs are `k < rk.len() - patience`, so the window ending at
/// the last batch is never accepted. Returns 0 when no such window exists or
/// when `rk` is not longer than `patience`.
pub fn find_transient_end(rk: &[f64], threshold: f64, patience: usize) -> usize {
    if patience == 0 || rk.len() <= patience {
        return 0;
    }

    rk.windows(patience)
        .take(rk.len() - patience)
        .position(|window| window.iter().all(|r| r.abs() < threshold))
        .unwrap_or(0)
}

/// Outcome of a warm-up estimation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarmupEstimate {
    /// Number of leading batches classified as warm-up
    pub transient_end_batch: usize,
    /// Number of leading raw observations to discard
    pub observation_cutoff: usize,
    /// Whether enough observations were available to run the analysis
    pub sufficient_data: bool,
    /// Summary of the observations kept after the cutoff
    pub steady_state: ObservationSummary,
}

/// Run the full analysis on `raw` and summarize the steady-state part
///
/// Too few observations is not fatal: the whole sequence is treated as
/// steady state. A zero batch count still fails.
pub fn estimate_warmup(raw: &[f64], config: &TransientConfig) -> QueueResult<WarmupEstimate> {
    let data = match calculate_transient_data(raw, config.num_batches) {
        Ok(data) => data,
        Err(QueueError::InsufficientData { available, required }) => {
            warn!(available, required, "Not enough observations for warm-up detection; using all data");
            return Ok(WarmupEstimate {
                transient_end_batch: 0,
                observation_cutoff: 0,
                sufficient_data: false,
                steady_state: ObservationSummary::from_samples(raw, defaults::CONFIDENCE_LEVEL),
            });
        }
        Err(err) => return Err(err),
    };

    let transient_end_batch = find_transient_end(&data.rk, config.threshold, config.patience);
    let observation_cutoff = data.observation_cutoff(transient_end_batch);

    debug!(transient_end_batch, observation_cutoff, "Estimated warm-up period");

    Ok(WarmupEstimate {
        transient_end_batch,
        observation_cutoff,
        sufficient_data: true,
        steady_state: ObservationSummary::from_samples(
            &raw[observation_cutoff..],
            defaults::CONFIDENCE_LEVEL,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uneven_split_puts_longer_batches_first() {
        let raw: Vec<f64> = (1..=10).map(f64::from).collect();
        let data = calculate_transient_data(&raw, 3).unwrap();

        assert_eq!(data.batch_sizes, vec![4, 3, 3]);
        assert_eq!(data.batch_means, vec![2.5, 6.0, 9.0]);
        assert_eq!(data.observation_cutoff(2), 7);
        assert_eq!(data.observation_cutoff(0), 0);
    }

    #[test]
    fn test_suffix_means_and_relative_error() {
        let raw = [6.0, 3.0, 3.0];
        let data = calculate_transient_data(&raw, 3).unwrap();

        assert_eq!(data.global_mean, 4.0);
        assert_eq!(data.xk_bar, vec![4.0, 3.0, 3.0]);
        assert_eq!(data.rk, vec![0.0, -0.25, -0.25]);
    }

    #[test]
    fn test_zero_global_mean_gives_zero_errors() {
        let data = calculate_transient_data(&[0.0; 8], 4).unwrap();
        assert_eq!(data.rk, vec![0.0; 4]);
    }

    #[test]
    fn test_insufficient_data() {
        let result = calculate_transient_data(&[1.0, 2.0], 5);
        assert!(matches!(
            result,
            Err(QueueError::InsufficientData { available: 2, required: 5 })
        ));
    }

    #[test]
    fn test_zero_batches_rejected() {
        assert!(matches!(calculate_transient_data(&[1.0], 0), Err(QueueError::InvalidBatchCount)));
    }

    #[test]
    fn test_find_transient_end_requires_stable_window() {
        // A single small value at index 1 is noise, the window starting at 3 is stable
        let rk = [0.5, 0.01, 0.4, 0.02, 0.01, 0.03, 0.2];
        assert_eq!(find_transient_end(&rk, 0.05, 3), 3);
        assert_eq!(find_transient_end(&rk, 0.05, 1), 1);
    }

    #[test]
    fn test_find_transient_end_defaults_to_zero() {
        assert_eq!(find_transient_end(&[0.5, 0.4, 0.3, 0.2], 0.05, 2), 0);
        assert_eq!(find_transient_end(&[0.0, 0.0, 0.0], 0.05, 3), 0);
        assert_eq!(find_transient_end(&[], 0.05, 1), 0);
    }

    #[test]
    fn test_find_transient_end_never_accepts_final_window() {
        // Only the trailing window is stable
        assert_eq!(find_transient_end(&[0.5, 0.5, 0.01, 0.01], 0.05, 2), 0);
        assert_eq!(find_transient_end(&[0.5, 0.5, 0.01], 0.05, 1), 0);
        // One batch earlier it is a valid cutoff
        assert_eq!(find_transient_end(&[0.5, 0.01, 0.01, 0.5], 0.05, 2), 1);
    }

    #[test]
    fn test_estimate_warmup_discards_leading_batches() {
        let mut raw = vec![1.0; 10];
        raw.extend([9.0; 10]);
        raw.extend([5.0; 40]);
        let config = TransientConfig { num_batches: 6, threshold: 0.05, patience: 2 };

        let estimate = estimate_warmup(&raw, &config).unwrap();
        assert!(estimate.sufficient_data);
        assert_eq!(estimate.transient_end_batch, 2);
        assert_eq!(estimate.observation_cutoff, 20);
        assert_eq!(estimate.steady_state.count, 40);
        assert_eq!(estimate.steady_state.mean, 5.0);
    }

    #[test]
    fn test_estimate_warmup_with_too_little_data_keeps_everything() {
        let raw = [1.0, 2.0, 3.0];
        let estimate = estimate_warmup(&raw, &TransientConfig::default()).unwrap();

        assert!(!estimate.sufficient_data);
        assert_eq!(estimate.observation_cutoff, 0);
        assert_eq!(estimate.steady_state.count, 3);
        assert_eq!(estimate.steady_state.mean, 2.0);
    }
}
