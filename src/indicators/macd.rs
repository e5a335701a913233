// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line = EMA(fast) - EMA(slow)
//   Signal    = EMA(signal) of the MACD line
//   Histogram = MACD line - Signal
//
// Both EMAs are SMA-seeded (see `ema.rs`), so the MACD line starts at index
// `slow - 1` and the signal line `signal - 1` bars later.
// =============================================================================

use super::ema::calculate_ema;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Tail-aligned MACD outputs.
///
/// All three vectors end at the last close; `macd` is longer than `signal`
/// and `histogram`, which have equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdOutput {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD for `closes`.
///
/// Returns empty vectors when `fast` is zero, `fast >= slow`, or the input is
/// shorter than `slow`.  When there are at least `slow` closes but fewer than
/// `slow + signal - 1`, only the MACD line is populated.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    if fast == 0 || fast >= slow || closes.len() < slow {
        return MacdOutput::default();
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    // ema_fast starts at fast-1, ema_slow at slow-1: skip the difference.
    let skip = slow - fast;
    let macd: Vec<f64> = ema_slow
        .iter()
        .zip(&ema_fast[skip..])
        .map(|(s, f)| f - s)
        .collect();

    let signal_line = calculate_ema(&macd, signal);
    let offset = macd.len() - signal_line.len();
    let histogram = signal_line
        .iter()
        .zip(&macd[offset..])
        .map(|(s, m)| m - s)
        .collect();

    MacdOutput {
        macd,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 10.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn signal_line_reference_values() {
        // fast 3, slow 5, signal 2 worked by hand from the SMA-seeded EMAs.
        let closes = [10.0, 11.0, 12.0, 11.0, 13.0, 14.0, 13.0, 15.0, 16.0, 15.0];
        let out = calculate_macd(&closes, 3, 5, 2);

        let macd = [0.6, 0.733333, 0.488889, 0.659259, 0.772840, 0.515226];
        let signal = [0.666667, 0.548148, 0.622222, 0.722634, 0.584362];
        let histogram = [0.066667, -0.059259, 0.037037, 0.050206, -0.069136];

        let pairs = [
            (&out.macd, &macd[..]),
            (&out.signal, &signal[..]),
            (&out.histogram, &histogram[..]),
        ];
        for (got, want) in pairs {
            assert_eq!(got.len(), want.len());
            for (g, w) in got.iter().zip(want) {
                assert!((g - w).abs() < 1e-5, "got {g}, want {w}");
            }
        }
    }

    #[test]
    fn macd_lengths() {
        let closes = wave(100);
        let out = calculate_macd(&closes, 12, 26, 9);
        assert_eq!(out.macd.len(), 100 - 26 + 1);
        assert_eq!(out.signal.len(), 100 - 26 - 9 + 2);
        assert_eq!(out.histogram.len(), out.signal.len());
    }

    #[test]
    fn macd_line_is_fast_minus_slow() {
        let closes = wave(60);
        let out = calculate_macd(&closes, 12, 26, 9);
        let fast = calculate_ema(&closes, 12);
        let slow = calculate_ema(&closes, 26);
        let expected = fast.last().unwrap() - slow.last().unwrap();
        assert!((out.macd.last().unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let closes = wave(80);
        let out = calculate_macd(&closes, 12, 26, 9);
        let m = *out.macd.last().unwrap();
        let s = *out.signal.last().unwrap();
        assert!((out.histogram.last().unwrap() - (m - s)).abs() < 1e-10);
    }

    #[test]
    fn macd_line_only_before_signal_warm_up() {
        let closes = wave(30);
        let out = calculate_macd(&closes, 12, 26, 9);
        assert_eq!(out.macd.len(), 5);
        assert!(out.signal.is_empty());
        assert!(out.histogram.is_empty());
    }

    #[test]
    fn macd_insufficient_data() {
        let out = calculate_macd(&wave(20), 12, 26, 9);
        assert!(out.macd.is_empty());
    }

    #[test]
    fn macd_rejects_inverted_periods() {
        assert_eq!(calculate_macd(&wave(100), 26, 12, 9), MacdOutput::default());
    }

    #[test]
    fn macd_constant_series_is_zero() {
        let closes = vec![50.0; 60];
        let out = calculate_macd(&closes, 12, 26, 9);
        for v in out.macd.iter().chain(&out.signal).chain(&out.histogram) {
            assert!(v.abs() < 1e-10);
        }
    }
}
