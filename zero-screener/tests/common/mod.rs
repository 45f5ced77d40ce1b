//! Shared fixtures for screener integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, NaiveDate};

use zero_screener::data::{Bar, BarSource, FetchOutcome, Instrument, InstrumentCatalog};
use zero_screener::{Result, ScreenerError};

/// Bars before the pattern starts
const LEAD_IN: usize = 19;

pub fn day(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).unwrap() + Duration::days(offset as i64)
}

/// Date of the crossover bar in `golden_cross_bars`.
pub fn cross_date() -> NaiveDate {
    day(LEAD_IN + 10)
}

fn bar(offset: usize, open: f64, close: f64, volume: f64) -> Bar {
    Bar {
        date: day(offset),
        open,
        close,
        high: close.max(open),
        low: close.min(open),
        volume,
        turnover: close * volume,
        percent_change: 0.0,
    }
}

/// 30 bars ending in a strict golden cross on `cross_date()`.
///
/// Unscaled: MA5 10.0 vs MA10 11.0 the day before, 12.0 vs 11.8 on the day,
/// volume 2000 against a 1000 average, close 20 above open 18.
pub fn golden_cross_bars(scale: f64) -> Vec<Bar> {
    let mut closes = vec![12.0; LEAD_IN + 5];
    closes.extend([10.0; 5]);
    closes.push(20.0);

    let last = closes.len() - 1;
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let close = c * scale;
            if i == last {
                bar(i, 18.0 * scale, close, 2000.0)
            } else {
                bar(i, close, close, 750.0)
            }
        })
        .collect()
}

/// 30 steadily rising bars; MA5 stays above MA10 so no cross occurs.
pub fn rising_bars() -> Vec<Bar> {
    (0..LEAD_IN + 11)
        .map(|i| {
            let close = 10.0 + i as f64;
            bar(i, close - 0.5, close, 1000.0)
        })
        .collect()
}

// ============================================================================
// Catalogs
// ============================================================================

pub struct StaticCatalog(pub Vec<Instrument>);

impl StaticCatalog {
    pub fn of(codes: &[(&str, &str)]) -> Self {
        Self(
            codes
                .iter()
                .map(|(code, name)| Instrument::new(*code, *name))
                .collect(),
        )
    }
}

impl InstrumentCatalog for StaticCatalog {
    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        Ok(self.0.clone())
    }
}

pub struct FailingCatalog;

impl InstrumentCatalog for FailingCatalog {
    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        Err(ScreenerError::Catalog("mock listing failure".into()))
    }
}

// ============================================================================
// Bar Source
// ============================================================================

/// Returns canned outcomes per code and records every request.
pub struct ScriptedSource {
    outcomes: HashMap<String, FetchOutcome>,
    requests: Mutex<Vec<(String, usize)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, code: &str, outcome: FetchOutcome) -> Self {
        self.outcomes.insert(code.to_string(), outcome);
        self
    }

    pub fn with_bars(self, code: &str, bars: Vec<Bar>) -> Self {
        self.with(code, FetchOutcome::Bars(bars))
    }

    pub fn requested_codes(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(code, _)| code.clone())
            .collect()
    }

    pub fn requested_limits(&self) -> Vec<usize> {
        self.requests.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }
}

impl BarSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn fetch_daily_bars(&self, code: &str, min_bars: usize) -> FetchOutcome {
        self.requests
            .lock()
            .unwrap()
            .push((code.to_string(), min_bars));

        self.outcomes
            .get(code)
            .cloned()
            .unwrap_or(FetchOutcome::Failed(zero_screener::FetchFailure::NoData))
    }
}
