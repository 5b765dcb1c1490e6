//! Classification of values into a fixed number of bins.

use crate::error::{Error, Result};
use crate::processing::min_max;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// Equal-count bins from the percentiles of the data
    Quantiles,
    /// Equal-width bins between min and max
    EqualInterval,
}

/// Result of classifying a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Upper bound of each bin, ascending and unique
    pub breaks: Vec<f64>,
    /// Bin index for each input value, in input order
    pub classes: Vec<usize>,
}

impl Classification {
    pub fn k(&self) -> usize {
        self.breaks.len()
    }

    /// Class index scaled onto [0, 1] across the classes actually used.
    pub fn position(&self, index: usize) -> f64 {
        let (lo, hi) = match (self.classes.iter().min(), self.classes.iter().max()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => return 0.0,
        };
        if hi == lo {
            return 0.0;
        }
        let c = self.classes[index];
        (c - lo) as f64 / (hi - lo) as f64
    }
}

pub fn classify(values: &[f64], scheme: Scheme, k: usize) -> Result<Classification> {
    if k == 0 {
        return Err(Error::Config("bin count must be at least 1".to_string()));
    }
    let breaks = match scheme {
        Scheme::Quantiles => quantile_breaks(values, k)?,
        Scheme::EqualInterval => equal_interval_breaks(values, k)?,
    };
    let classes = values.iter().map(|&v| bin_of(&breaks, v)).collect();
    Ok(Classification { breaks, classes })
}

/// Percentile with linear interpolation between order statistics. `sorted` must be non-empty.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * pct / 100.0;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn quantile_breaks(values: &[f64], k: usize) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(Error::EmptySequence("classify"));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut breaks: Vec<f64> = (1..=k)
        .map(|i| percentile(&sorted, (100.0 * i as f64 / k as f64).min(100.0)))
        .collect();
    breaks.dedup();
    Ok(breaks)
}

fn equal_interval_breaks(values: &[f64], k: usize) -> Result<Vec<f64>> {
    let (lo, hi) = min_max(values).ok_or(Error::EmptySequence("classify"))?;
    let width = (hi - lo) / k as f64;
    let mut breaks: Vec<f64> = (1..k).map(|i| lo + width * i as f64).collect();
    breaks.push(hi);
    breaks.dedup();
    Ok(breaks)
}

/// First bin whose upper bound is >= `value`; values past the last bound land in the last bin.
fn bin_of(breaks: &[f64], value: f64) -> usize {
    breaks.partition_point(|&b| b < value).min(breaks.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_breaks_match_linear_percentiles() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let c = classify(&values, Scheme::Quantiles, 4).unwrap();
        assert_eq!(c.breaks, vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(c.classes, vec![0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_quantiles_interpolate() {
        let c = classify(&[10.0, 20.0], Scheme::Quantiles, 2).unwrap();
        assert_eq!(c.breaks, vec![15.0, 20.0]);
        assert_eq!(c.classes, vec![0, 1]);
    }

    #[test]
    fn test_quantiles_collapse_duplicate_breaks() {
        let c = classify(&[7.0, 7.0, 7.0, 7.0], Scheme::Quantiles, 5).unwrap();
        assert_eq!(c.k(), 1);
        assert!(c.classes.iter().all(|&x| x == 0));
        assert_eq!(c.position(2), 0.0);
    }

    #[test]
    fn test_equal_interval() {
        let c = classify(&[0.0, 2.5, 5.0, 10.0], Scheme::EqualInterval, 4).unwrap();
        assert_eq!(c.breaks, vec![2.5, 5.0, 7.5, 10.0]);
        assert_eq!(c.classes, vec![0, 0, 1, 3]);
    }

    #[test]
    fn test_position_spans_used_classes() {
        let c = classify(&[50.0, 200.0, 10.0], Scheme::Quantiles, 3).unwrap();
        assert_eq!(c.classes, vec![1, 2, 0]);
        assert_eq!(c.position(0), 0.5);
        assert_eq!(c.position(1), 1.0);
        assert_eq!(c.position(2), 0.0);
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert!(matches!(classify(&[1.0], Scheme::Quantiles, 0), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(classify(&[], Scheme::Quantiles, 5), Err(Error::EmptySequence(_))));
    }
}
