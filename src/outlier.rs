//! Outlier filtering
//!
//! Participants whose average ratio strictly exceeds a task ceiling are kept in
//! the stored relations but dropped from the summary bands and the charts.

use serde::{Deserialize, Serialize};

/// Result of splitting a list of averages against a ceiling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierSplit {
    /// Positions above the ceiling, ascending
    pub outliers: Vec<usize>,
    /// Remaining positions, ascending
    pub kept: Vec<usize>,
}

impl OutlierSplit {
    /// Select the kept positions from any array parallel to the averages
    /// (averages, min errors, max errors, ...)
    pub fn retain<T: Clone>(&self, values: &[T]) -> Vec<T> {
        self.kept
            .iter()
            .filter_map(|&i| values.get(i).cloned())
            .collect()
    }
}

/// Ceiling-based outlier filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFilter {
    ceiling: f64,
}

impl OutlierFilter {
    pub fn new(ceiling: f64) -> Self {
        Self { ceiling }
    }

    /// Partition positions of `averages` into outliers (`> ceiling`) and kept
    pub fn split(&self, averages: &[f64]) -> OutlierSplit {
        let (outliers, kept): (Vec<usize>, Vec<usize>) =
            (0..averages.len()).partition(|&i| averages[i] > self.ceiling);
        OutlierSplit { outliers, kept }
    }
}

/// Median of the values; the mean of the middle pair for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_removes_values_above_ceiling() {
        let averages = [1.0, 2.0, 50.0, 3.0];
        let split = OutlierFilter::new(10.0).split(&averages);

        assert_eq!(split.outliers, vec![2]);
        assert_eq!(split.kept, vec![0, 1, 3]);
        assert_eq!(split.retain(&averages), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ceiling_is_exclusive() {
        let split = OutlierFilter::new(8.0).split(&[8.0, 8.0001]);
        assert_eq!(split.outliers, vec![1]);
    }

    #[test]
    fn test_retain_applies_to_parallel_arrays() {
        let averages = [4.0, 30.0, 5.0];
        let lower = [0.5, 10.0, 1.0];
        let upper = [1.5, 12.0, 0.25];
        let split = OutlierFilter::new(20.0).split(&averages);

        assert_eq!(split.retain(&lower), vec![0.5, 1.0]);
        assert_eq!(split.retain(&upper), vec![1.5, 0.25]);
    }

    #[test]
    fn test_everything_filtered() {
        let split = OutlierFilter::new(1.0).split(&[2.0, 3.0]);
        assert!(split.kept.is_empty());
        assert!(split.retain(&[2.0, 3.0]).is_empty());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[1.0, 2.0, 50.0, 3.0]), Some(2.5));
    }
}
