use serde::Serialize;

/// A named series aligned one-to-one with the bar sequence.
///
/// Leading `None` entries mark the warm-up region where the lookback window
/// is not yet full.  They are never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Align a tail-aligned (compact) result to `len` bars by padding the
    /// front with `None`.
    pub fn from_compact(name: impl Into<String>, compact: &[f64], len: usize) -> Self {
        debug_assert!(compact.len() <= len, "compact series longer than bar sequence");
        let pad = len.saturating_sub(compact.len());
        let values = std::iter::repeat(None)
            .take(pad)
            .chain(compact.iter().take(len).map(|&v| Some(v)))
            .collect();
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of leading undefined entries.
    pub fn warm_up(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }

    /// Most recent defined value.
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}
