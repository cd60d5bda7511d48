//! Trailing moving average

/// Default window of the dashboard's moving-average overlay
pub const DEFAULT_WINDOW: usize = 7;

/// Trailing simple moving average
///
/// `result[i]` is the mean of `series[i + 1 - window..=i]`. The first
/// `window - 1` entries lack history and are `None`, never zero. A zero
/// window yields all `None`.
pub fn moving_average(series: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }

    (0..series.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &series[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}
