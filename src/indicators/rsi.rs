// =============================================================================
// Relative Strength Index (RSI), Wilder smoothing
// =============================================================================
//
// Oscillator in [0, 100] comparing average up-moves with average down-moves
// over the last `n` closes.
//
//   d_t        = close_t - close_{t-1}
//   seed avgs  = mean gain and mean loss over the first n deltas
//   avg_t      = (avg_{t-1} * (n - 1) + x_t) / n        (gain and loss alike)
//   RSI        = 100 - 100 / (1 + avg_gain / avg_loss)
//
// A window with no losses reads 100.
// =============================================================================

/// Default look-back used by the dashboard.
pub const RSI_PERIOD: usize = 14;
/// Upper reference line.
pub const OVERBOUGHT: f64 = 70.0;
/// Lower reference line.
pub const OVERSOLD: f64 = 30.0;

/// RSI of `closes` over `period` deltas.
///
/// Compact output: element `k` belongs to close index `period + k`.  Empty
/// when `period` is zero or fewer than `period + 1` closes are available.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let n = period as f64;
    let moves: Vec<(f64, f64)> = closes.windows(2).map(|w| split_move(w[1] - w[0])).collect();

    let (mut avg_gain, mut avg_loss) = moves[..period]
        .iter()
        .fold((0.0, 0.0), |(g, l), &(up, down)| (g + up, l + down));
    avg_gain /= n;
    avg_loss /= n;

    let mut out = Vec::with_capacity(moves.len() - period + 1);
    out.push(rsi_from_averages(avg_gain, avg_loss));

    for &(up, down) in &moves[period..] {
        avg_gain = (avg_gain * (n - 1.0) + up) / n;
        avg_loss = (avg_loss * (n - 1.0) + down) / n;
        out.push(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

/// Human-readable zone for an RSI reading.
pub fn rsi_zone(value: f64) -> &'static str {
    if value >= OVERBOUGHT {
        "OVERBOUGHT"
    } else if value <= OVERSOLD {
        "OVERSOLD"
    } else {
        "NEUTRAL"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Split a close-to-close change into (gain, loss), both non-negative.
fn split_move(delta: f64) -> (f64, f64) {
    if delta > 0.0 {
        (delta, 0.0)
    } else {
        (0.0, -delta)
    }
}

/// Average gain / average loss to an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
