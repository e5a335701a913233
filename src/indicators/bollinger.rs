// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the POPULATION standard deviation
// (divide by n) of the same window of closes.

/// Default window.
pub const BB_PERIOD: usize = 20;
/// Default band width in standard deviations.
pub const BB_NUM_STD: f64 = 2.0;

/// One point of a Bollinger Band series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Calculate Bollinger Bands for every full window of `closes`.
///
/// Returns an empty `Vec` when `period == 0` or fewer than `period` closes are
/// available.  Each output element corresponds to a close starting at index
/// `period - 1`.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Vec<BollingerBand> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let n = period as f64;
    closes
        .windows(period)
        .map(|window| {
            let middle = window.iter().sum::<f64>() / n;
            let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            BollingerBand {
                upper: middle + num_std * std_dev,
                middle,
                lower: middle - num_std * std_dev,
            }
        })
        .collect()
}
