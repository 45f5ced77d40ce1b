//! Zero Screener Library
//!
//! End-of-day A-share screener for the 5/10-day moving-average golden
//! cross confirmed by a volume spike.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     zero-screener (CLI)                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐    │
//! │  │ Market Data  │   │  Indicators  │   │  Screener Engine │    │
//! │  │ (eastmoney)  │   │  (MA5/MA10)  │   │  + CSV report    │    │
//! │  └──────────────┘   └──────────────┘   └──────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Pattern
//!
//! On the target date `T` (index `i >= 10` in the instrument's bars):
//! - MA5(close) >= MA10(close) on `T` and MA5 <= MA10 on the bar before
//! - volume > 1.5 x MA5(volume), with the ratio strictly inside (1, 10)
//! - close > open
//!
//! The run is sequential with a fixed pause between instruments; one bad
//! instrument never aborts it.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod error;
pub mod indicator;
pub mod screener;

pub use data::{BarSource, EastmoneyClient, FetchFailure, FetchOutcome, InstrumentCatalog};
pub use data::{Bar, Instrument};
pub use error::{Result, ScreenerError};
pub use indicator::{augment, rolling_mean, IndicatorSeries, IndicatorWindows};
pub use screener::{
    parse_target_date, render_table, CsvSink, EligibilityPolicy, EligibleCatalog, Match,
    ResultSink, ScreenOutcome, ScreenerEngine,
};
