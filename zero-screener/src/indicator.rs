//! Moving-average indicators over daily bars.
//!
//! Pure functions, no I/O. A trailing window of size `w` at index `i`
//! covers bars `[i-w+1, i]` inclusive; values for `i < w-1` are `None`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::Bar;

/// Window sizes to compute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorWindows {
    /// Windows for moving averages of close price
    pub close: Vec<usize>,
    /// Windows for moving averages of volume
    pub volume: Vec<usize>,
}

impl IndicatorWindows {
    /// MA5/MA10 of close and MA5 of volume.
    pub fn golden_cross() -> Self {
        Self {
            close: vec![5, 10],
            volume: vec![5],
        }
    }
}

/// Trailing arithmetic mean of `values` over `window` samples.
///
/// Each defined value is the sum of exactly `window` samples divided by
/// `window`. A zero window yields no values.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let sum: f64 = values[i + 1 - window..=i].iter().sum();
            Some(sum / window as f64)
        })
        .collect()
}

/// Bars annotated with trailing moving averages.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    bars: Vec<Bar>,
    close_ma: BTreeMap<usize, Vec<Option<f64>>>,
    volume_ma: BTreeMap<usize, Vec<Option<f64>>>,
}

impl IndicatorSeries {
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Index of the bar dated `date`.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.bars.binary_search_by_key(&date, |b| b.date).ok()
    }

    /// MA of close over `window` at `index`; `None` if not computed or undefined.
    pub fn close_ma(&self, window: usize, index: usize) -> Option<f64> {
        lookup(&self.close_ma, window, index)
    }

    /// MA of volume over `window` at `index`; `None` if not computed or undefined.
    pub fn volume_ma(&self, window: usize, index: usize) -> Option<f64> {
        lookup(&self.volume_ma, window, index)
    }
}

fn lookup(table: &BTreeMap<usize, Vec<Option<f64>>>, window: usize, index: usize) -> Option<f64> {
    table.get(&window)?.get(index).copied().flatten()
}

/// Annotate `bars` (ascending by date) with the requested moving averages.
pub fn augment(bars: Vec<Bar>, windows: &IndicatorWindows) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let close_ma = windows
        .close
        .iter()
        .map(|&w| (w, rolling_mean(&closes, w)))
        .collect();
    let volume_ma = windows
        .volume
        .iter()
        .map(|&w| (w, rolling_mean(&volumes, w)))
        .collect();

    IndicatorSeries {
        bars,
        close_ma,
        volume_ma,
    }
}
