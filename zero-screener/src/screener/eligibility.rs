//! Universe eligibility filter.
//!
//! Excludes ST (Special Treatment) stocks and whole boards by code prefix
//! (ChiNext "30", STAR "68" by default) before any bars are fetched.

use serde::{Deserialize, Serialize};
use tracing::info;
use zero_common::config::ScreenerConfig;

use crate::data::{Instrument, InstrumentCatalog};
use crate::error::Result;

// ============================================================================
// Filter Result
// ============================================================================

/// Counts from applying the eligibility filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    /// Number of instruments that passed
    pub passed: usize,
    /// Number of instruments eliminated
    pub eliminated: usize,
    /// Elimination rate (%)
    pub elimination_rate: f64,
}

impl FilterResult {
    pub fn new(input_count: usize, passed_count: usize) -> Self {
        let eliminated = input_count.saturating_sub(passed_count);
        let elimination_rate = if input_count > 0 {
            (eliminated as f64 / input_count as f64) * 100.0
        } else {
            0.0
        };

        Self {
            passed: passed_count,
            eliminated,
            elimination_rate,
        }
    }
}

// ============================================================================
// Eligibility Policy
// ============================================================================

/// Which listed instruments are screened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPolicy {
    /// Exclude names containing "ST"
    pub exclude_st: bool,
    /// Exclude codes starting with any of these
    pub excluded_prefixes: Vec<String>,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self::from_config(&ScreenerConfig::default())
    }
}

impl EligibilityPolicy {
    pub fn from_config(config: &ScreenerConfig) -> Self {
        Self {
            exclude_st: config.exclude_st,
            excluded_prefixes: config.excluded_prefixes.clone(),
        }
    }

    pub fn is_eligible(&self, instrument: &Instrument) -> bool {
        // Covers "ST" and "*ST"
        if self.exclude_st && instrument.name.contains("ST") {
            return false;
        }

        !self
            .excluded_prefixes
            .iter()
            .any(|prefix| instrument.code.starts_with(prefix.as_str()))
    }

    pub fn filter(&self, instruments: Vec<Instrument>) -> (Vec<Instrument>, FilterResult) {
        let input_count = instruments.len();

        let passed: Vec<Instrument> = instruments
            .into_iter()
            .filter(|i| self.is_eligible(i))
            .collect();

        let result = FilterResult::new(input_count, passed.len());
        (passed, result)
    }
}

// ============================================================================
// Eligible Catalog
// ============================================================================

/// Catalog decorator that applies an `EligibilityPolicy` to its source.
pub struct EligibleCatalog<C> {
    inner: C,
    policy: EligibilityPolicy,
}

impl<C: InstrumentCatalog> EligibleCatalog<C> {
    pub fn new(inner: C, policy: EligibilityPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<C: InstrumentCatalog> InstrumentCatalog for EligibleCatalog<C> {
    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        let listed = self.inner.list_instruments()?;
        let (eligible, result) = self.policy.filter(listed);

        info!(
            passed = result.passed,
            eliminated = result.eliminated,
            elimination_rate = format!("{:.1}%", result.elimination_rate),
            "Eligibility filter applied"
        );

        Ok(eligible)
    }
}
