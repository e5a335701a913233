// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (close_{t-n+1} + ... + close_t) / n
//
// Each window is summed directly rather than with a running total so that the
// output does not accumulate floating-point drift over long histories.
// =============================================================================

/// Compute the SMA series for `values` over a trailing window of `period`.
///
/// Returns an empty `Vec` when `period == 0` or the input is shorter than the
/// window.  Each output element corresponds to an input starting at index
/// `period - 1`.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let n = period as f64;
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / n)
        .collect()
}
