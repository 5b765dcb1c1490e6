//! Tick placement for map axes and the color bar.

const STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Evenly spaced "nice" values inside `[lo, hi]`, at most `max_ticks + 1` of them.
///
/// Returns the ticks and the step between them.
pub fn nice_ticks(lo: f64, hi: f64, max_ticks: usize) -> (Vec<f64>, f64) {
    if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
        return (vec![lo], 0.0);
    }
    let max_ticks = max_ticks.max(1);
    let raw = (hi - lo) / max_ticks as f64;
    let magnitude = 10f64.powf(raw.log10().floor());

    let step = STEPS
        .iter()
        .map(|s| s * magnitude)
        .find(|&step| count_in(lo, hi, step) <= max_ticks + 1)
        .unwrap_or(10.0 * magnitude);

    let tol = step * 1e-9;
    let first = (lo / step - 1e-9).ceil();
    let ticks = (0..)
        .map(|i| (first + i as f64) * step)
        .take_while(|&v| v <= hi + tol)
        .map(|v| if v.abs() < tol { 0.0 } else { v })
        .collect();
    (ticks, step)
}

fn count_in(lo: f64, hi: f64, step: f64) -> usize {
    let first = (lo / step - 1e-9).ceil();
    let last = (hi / step + 1e-9).floor();
    if last < first {
        0
    } else {
        (last - first) as usize + 1
    }
}

/// Label for a tick value with just enough decimals for `step`.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = (0..6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(6) as usize;
    format!("{:.*}", decimals, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longitude_ticks() {
        let (ticks, step) = nice_ticks(-127.0, -64.0, 8);
        assert_eq!(step, 10.0);
        assert_eq!(ticks, vec![-120.0, -110.0, -100.0, -90.0, -80.0, -70.0]);
    }

    #[test]
    fn test_fractional_ticks() {
        let (ticks, step) = nice_ticks(0.0, 1.0, 5);
        assert_eq!(step, 0.2);
        assert_eq!(ticks.len(), 6);
        assert_eq!(format_tick(ticks[1], step), "0.2");
    }

    #[test]
    fn test_degenerate_range() {
        let (ticks, step) = nice_ticks(3.0, 3.0, 5);
        assert_eq!(ticks, vec![3.0]);
        assert_eq!(step, 0.0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(-120.0, 10.0), "-120");
        assert_eq!(format_tick(2.5, 2.5), "2.5");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
    }
}
