use crate::error::{Error, Result};
use crate::processing::min_max;

/// Rescale `values` so the minimum maps to 0.0 and the maximum to 1.0.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>> {
    let (lo, hi) = min_max(values).ok_or(Error::EmptySequence("normalize"))?;
    if hi == lo {
        return Err(Error::DegenerateRange {
            len: values.len(),
            value: lo,
        });
    }

    let span = hi - lo;
    Ok(values.iter().map(|v| (v - lo) / span).collect())
}
