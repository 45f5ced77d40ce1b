//! Market data module for A-shares.
//!
//! Provides the instrument and daily bar types, the provider traits the
//! screener depends on, and the eastmoney adapter implementing them.
//!
//! # Data Sources
//! - **Eastmoney**: free public API, no key required. Used for both the
//!   stock listing and daily K-lines.

mod eastmoney;
mod provider;

pub use eastmoney::EastmoneyClient;
pub use provider::{BarSource, FetchFailure, FetchOutcome, InstrumentCatalog};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// A listed instrument.
///
/// Identity is the exchange code; the name is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Exchange-issued code (e.g., "600000")
    pub code: String,
    /// Display name (e.g., "浦发银行")
    pub name: String,
}

impl Instrument {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// One trading day of OHLCV data for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// Close price
    pub close: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Volume (lots)
    pub volume: f64,
    /// Turnover in currency
    #[serde(default)]
    pub turnover: f64,
    /// Percent change reported by the source
    #[serde(default)]
    pub percent_change: f64,
}

impl Bar {
    /// Check if the bar closed above its open
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}
