//! Golden cross with volume confirmation.
//!
//! On the target day the MA5 of close must be at or above the MA10 after
//! being at or below it the day before, volume must spike above its own
//! 5-day average, and the bar must close up.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicator::IndicatorSeries;

/// Short close-price window
pub const SHORT_WINDOW: usize = 5;

/// Long close-price window
pub const LONG_WINDOW: usize = 10;

/// Volume average window
pub const VOLUME_WINDOW: usize = 5;

/// Smallest target index that is evaluated
pub const MIN_TARGET_INDEX: usize = 10;

/// Volume must exceed this multiple of its 5-day average
pub const VOLUME_SPIKE_MULTIPLIER: f64 = 1.5;

/// Exclusive bounds on volume / MA5(volume)
pub const VOLUME_RATIO_FLOOR: f64 = 1.0;
pub const VOLUME_RATIO_CEILING: f64 = 10.0;

/// Bar and indicator values reported for a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFeatures {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub volume_ma5: f64,
    pub close_ma5: f64,
    pub close_ma10: f64,
}

/// Why a series did not match on the target date.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// No bar on the target date
    DateNotFound,
    /// Target bar sits too early in the series
    InsufficientHistory { index: usize },
    /// A required moving average is undefined
    IndicatorUndefined,
    /// MA5 below MA10 today, or above it yesterday
    NoGoldenCross,
    /// Trailing volume average is zero
    ZeroVolumeAverage,
    /// Volume not above 1.5x its average
    VolumeNotSpiked { ratio: f64 },
    /// Volume ratio outside (1, 10)
    VolumeRatioOutOfRange { ratio: f64 },
    /// Close not above open
    NotClosedUp,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateNotFound => write!(f, "target date not in series"),
            Self::InsufficientHistory { index } => write!(f, "insufficient history (index {})", index),
            Self::IndicatorUndefined => write!(f, "indicator undefined"),
            Self::NoGoldenCross => write!(f, "no golden cross"),
            Self::ZeroVolumeAverage => write!(f, "zero volume average"),
            Self::VolumeNotSpiked { ratio } => write!(f, "volume ratio {:.2} not spiked", ratio),
            Self::VolumeRatioOutOfRange { ratio } => write!(f, "volume ratio {:.2} out of range", ratio),
            Self::NotClosedUp => write!(f, "did not close up"),
        }
    }
}

/// Evaluate the pattern on `target_date`; `None` means no match.
pub fn evaluate(series: &IndicatorSeries, target_date: NaiveDate) -> Option<MatchFeatures> {
    check(series, target_date).ok()
}

/// Evaluate the pattern on `target_date`, reporting the first failed condition.
pub fn check(series: &IndicatorSeries, target_date: NaiveDate) -> Result<MatchFeatures, Rejection> {
    let i = series.position(target_date).ok_or(Rejection::DateNotFound)?;
    if i < MIN_TARGET_INDEX {
        return Err(Rejection::InsufficientHistory { index: i });
    }

    let today = &series.bars()[i];

    let close_ma5 = series.close_ma(SHORT_WINDOW, i).ok_or(Rejection::IndicatorUndefined)?;
    let close_ma10 = series.close_ma(LONG_WINDOW, i).ok_or(Rejection::IndicatorUndefined)?;
    let prev_ma5 = series.close_ma(SHORT_WINDOW, i - 1).ok_or(Rejection::IndicatorUndefined)?;
    let prev_ma10 = series.close_ma(LONG_WINDOW, i - 1).ok_or(Rejection::IndicatorUndefined)?;
    let volume_ma5 = series.volume_ma(VOLUME_WINDOW, i).ok_or(Rejection::IndicatorUndefined)?;

    // Touches count on both days
    if !(close_ma5 >= close_ma10 && prev_ma5 <= prev_ma10) {
        return Err(Rejection::NoGoldenCross);
    }

    volume_confirmed(today.volume, volume_ma5)?;

    if !today.is_bullish() {
        return Err(Rejection::NotClosedUp);
    }

    Ok(MatchFeatures {
        date: today.date,
        close: today.close,
        volume: today.volume,
        volume_ma5,
        close_ma5,
        close_ma10,
    })
}

/// Volume spike check.
///
/// The ratio floor repeats the spike check's lower bound; both are kept.
pub fn volume_confirmed(volume: f64, volume_ma5: f64) -> Result<(), Rejection> {
    if volume_ma5 == 0.0 {
        return Err(Rejection::ZeroVolumeAverage);
    }

    let ratio = volume / volume_ma5;

    if !(volume > VOLUME_SPIKE_MULTIPLIER * volume_ma5) {
        return Err(Rejection::VolumeNotSpiked { ratio });
    }

    if !(VOLUME_RATIO_FLOOR < ratio && ratio < VOLUME_RATIO_CEILING) {
        return Err(Rejection::VolumeRatioOutOfRange { ratio });
    }

    Ok(())
}
