//! Golden-cross stock screener.
//!
//! Screens the A-share universe for stocks whose 5-day moving average of
//! close crossed up through the 10-day average on a target date, with a
//! volume spike and an up close.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────┐    ┌─────────────┐    ┌──────────┐
//! │ EligibleCatalog │ -> │ fetch bars   │ -> │ indicators  │ -> │ pattern  │
//! │ (ST, 30, 68)    │    │ (per stock)  │    │ MA5/MA10    │    │ check    │
//! └─────────────────┘    └──────────────┘    └─────────────┘    └──────────┘
//!                                                                     │
//!                                     sort by close desc, CSV + table ┘
//! ```

pub mod eligibility;
pub mod engine;
pub mod pattern;
pub mod report;

pub use eligibility::{EligibilityPolicy, EligibleCatalog, FilterResult};
pub use engine::{
    sort_by_close_desc, LogProgress, Match, Progress, ProgressObserver, ScreenOutcome,
    ScreenerEngine,
};
pub use pattern::{MatchFeatures, Rejection};
pub use report::{render_table, CsvSink, ResultSink};

use chrono::NaiveDate;

use crate::error::{Result, ScreenerError};

/// Parse a compact `YYYYMMDD` target date.
pub fn parse_target_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScreenerError::InvalidDate(input.to_string()));
    }

    NaiveDate::parse_from_str(input, "%Y%m%d")
        .map_err(|_| ScreenerError::InvalidDate(input.to_string()))
}
