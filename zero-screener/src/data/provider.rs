//! Data provider abstraction for the screener.
//!
//! Defines the `InstrumentCatalog` and `BarSource` traits the screening
//! engine depends on, so the eastmoney adapter can be swapped for fixtures.

use std::fmt;
use std::sync::Arc;

use super::{Bar, Instrument};
use crate::error::Result;

// ============================================================================
// Fetch Failure
// ============================================================================

/// Why a per-instrument fetch produced no bars.
///
/// None of these abort a run; the instrument is skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchFailure {
    /// Source returned no data for the code
    NoData,
    /// Request exceeded the fetch timeout
    Timeout,
    /// Connection failed or non-success HTTP status
    Transport(String),
    /// Response could not be decoded into bars
    Malformed(String),
    /// Code cannot be mapped to a source identifier
    InvalidCode(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "No data returned"),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::Malformed(msg) => write!(f, "Malformed response: {}", msg),
            Self::InvalidCode(code) => write!(f, "Invalid instrument code: {}", code),
        }
    }
}

impl std::error::Error for FetchFailure {}

// ============================================================================
// Fetch Outcome
// ============================================================================

/// Result of fetching one instrument's daily bars.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Bars ascending by date, possibly fewer than requested
    Bars(Vec<Bar>),
    /// Nothing usable came back
    Failed(FetchFailure),
}

impl From<std::result::Result<Vec<Bar>, FetchFailure>> for FetchOutcome {
    fn from(result: std::result::Result<Vec<Bar>, FetchFailure>) -> Self {
        match result {
            Ok(bars) if bars.is_empty() => Self::Failed(FetchFailure::NoData),
            Ok(bars) => Self::Bars(bars),
            Err(failure) => Self::Failed(failure),
        }
    }
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Source of the screenable instrument universe.
pub trait InstrumentCatalog {
    /// List instruments. Failure is fatal for the run.
    fn list_instruments(&self) -> Result<Vec<Instrument>>;
}

/// Source of daily bars for one instrument.
pub trait BarSource {
    /// Provider name for logging (e.g., "eastmoney")
    fn name(&self) -> &'static str;

    /// Fetch at least `min_bars` of the most recent daily bars.
    ///
    /// Makes one request; no caching and no retry.
    fn fetch_daily_bars(&self, code: &str, min_bars: usize) -> FetchOutcome;
}

impl<T: InstrumentCatalog + ?Sized> InstrumentCatalog for Arc<T> {
    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        (**self).list_instruments()
    }
}

impl<T: BarSource + ?Sized> BarSource for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch_daily_bars(&self, code: &str, min_bars: usize) -> FetchOutcome {
        (**self).fetch_daily_bars(code, min_bars)
    }
}

// ============================================================================
// Tests
// ============================================================================
