// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
//   alpha  = 2 / (n + 1)
//   seed   = mean of the first n values
//   EMA_t  = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// Used directly for the EMA overlays and as the building block of MACD, which
// chains it over the MACD line for the signal.
// =============================================================================

/// EMA of `values` over window `period`, seeded with the first window's mean.
///
/// The result is compact: element `k` belongs to input index `period - 1 + k`.
/// Empty when `period` is zero or exceeds the input length.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let alpha = 2.0 / (period + 1) as f64;
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);
    out.extend(values[period..].iter().scan(seed, |prev, &x| {
        *prev = alpha * x + (1.0 - alpha) * *prev;
        Some(*prev)
    }));
    out
}
