//! Descriptive statistics over simulated counts.

use serde::{Deserialize, Serialize};

/// Summary of a set of non-negative integer samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    /// Average of the two middle values when `count` is even.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
}

/// Summarize counts. Returns None for an empty slice.
pub fn summarize_counts(samples: &[u64]) -> Option<SampleSummary> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();

    let count = sorted.len();
    let mean = sorted.iter().map(|&v| v as f64).sum::<f64>() / count as f64;
    let variance = sorted
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count as f64;
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    };

    Some(SampleSummary {
        count,
        mean,
        median,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[count - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_none() {
        assert!(summarize_counts(&[]).is_none());
    }

    #[test]
    fn odd_count() {
        let s = summarize_counts(&[5, 1, 3]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!((s.min, s.max), (1, 5));
        assert!((s.std_dev - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn even_count_median_averages_middle_pair() {
        let s = summarize_counts(&[4, 1, 2, 7]).unwrap();
        assert_eq!(s.median, 3.0);
    }

    #[test]
    fn constant_samples_have_zero_spread() {
        let s = summarize_counts(&[6; 10]).unwrap();
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.median, 6.0);
    }
}
