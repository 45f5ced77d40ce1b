//! Screener engine module.
//!
//! The central orchestrator for full market screening runs.

use std::cmp::Ordering;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};
use zero_common::logging::generate_run_id;

use crate::data::{BarSource, FetchOutcome, Instrument, InstrumentCatalog};
use crate::error::Result;
use crate::indicator::{augment, IndicatorWindows};

use super::pattern::{self, MatchFeatures, MIN_TARGET_INDEX};

/// Bars requested per instrument (headroom over the indicator minimum)
pub const MIN_FETCH_BARS: usize = 30;

/// Instruments with fewer bars are skipped
pub const MIN_HISTORY_BARS: usize = 10;

/// Blocking pause after each instrument to respect upstream rate limits
pub const PACING_DELAY: Duration = Duration::from_millis(50);

/// Progress is logged every this many instruments
pub const PROGRESS_INTERVAL: usize = 200;

// ============================================================================
// Match
// ============================================================================

/// One instrument satisfying the pattern on the target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Stock code (e.g., "600000")
    pub code: String,
    /// Stock name
    pub name: String,
    /// Target date
    pub date: NaiveDate,
    /// Close price on the target date
    pub close: f64,
    /// Volume on the target date
    pub volume: f64,
    /// 5-day average volume
    pub volume_ma5: f64,
    /// 5-day average close
    pub close_ma5: f64,
    /// 10-day average close
    pub close_ma10: f64,
}

impl Match {
    pub fn new(instrument: &Instrument, features: MatchFeatures) -> Self {
        Self {
            code: instrument.code.clone(),
            name: instrument.name.clone(),
            date: features.date,
            close: features.close,
            volume: features.volume,
            volume_ma5: features.volume_ma5,
            close_ma5: features.close_ma5,
            close_ma10: features.close_ma10,
        }
    }
}

/// Sort matches by close price, highest first.
pub fn sort_by_close_desc(matches: &mut [Match]) {
    matches.sort_by(|a, b| b.close.partial_cmp(&a.close).unwrap_or(Ordering::Equal));
}

// ============================================================================
// Screen Outcome
// ============================================================================

/// Result of a screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenOutcome {
    /// Run ID for correlating logs
    pub id: String,
    /// Date the pattern was evaluated on
    pub target_date: NaiveDate,
    /// Instruments in the eligible universe
    pub total_instruments: usize,
    /// Instruments whose bars were evaluated
    pub evaluated: usize,
    /// Instruments skipped for failed fetches or short history
    pub skipped: usize,
    /// Matches, sorted by close descending
    pub matches: Vec<Match>,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub completed_at: DateTime<Utc>,
    /// Duration in seconds
    pub duration_secs: f64,
}

impl ScreenOutcome {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Summary string for logging.
    pub fn summary(&self) -> String {
        format!(
            "Screened {} stocks for {} in {:.1}s: {} evaluated, {} skipped, {} matched",
            self.total_instruments,
            self.target_date,
            self.duration_secs,
            self.evaluated,
            self.skipped,
            self.matches.len()
        )
    }
}

// ============================================================================
// Progress Observer
// ============================================================================

/// Progress after one instrument has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Zero-based position of the instrument just processed
    pub index: usize,
    /// Universe size
    pub total: usize,
    /// Matches so far
    pub matches: usize,
}

/// Receives progress after every instrument.
pub trait ProgressObserver {
    fn on_progress(&self, progress: Progress);
}

/// Logs progress every `PROGRESS_INTERVAL` instruments.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, progress: Progress) {
        if progress.index % PROGRESS_INTERVAL == 0 {
            info!(
                processed = progress.index,
                total = progress.total,
                matches = progress.matches,
                "Screening progress"
            );
        }
    }
}

// ============================================================================
// Screener Engine
// ============================================================================

enum Verdict {
    Matched(Match),
    NoMatch,
    Skipped,
}

/// The main screener engine.
///
/// Processes the universe one instrument at a time:
/// 1. Fetch recent daily bars
/// 2. Compute MA5/MA10 of close and MA5 of volume
/// 3. Evaluate the pattern on the target date
/// 4. Collect matches and sort by close descending
pub struct ScreenerEngine<C, S> {
    catalog: C,
    source: S,
    pacing: Duration,
    observer: Box<dyn ProgressObserver>,
}

impl<C: InstrumentCatalog, S: BarSource> ScreenerEngine<C, S> {
    /// Create a new screener engine with the default pacing and progress logging.
    pub fn new(catalog: C, source: S) -> Self {
        Self {
            catalog,
            source,
            pacing: PACING_DELAY,
            observer: Box::new(LogProgress),
        }
    }

    /// Replace the pause between instruments.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Replace the progress observer.
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Screen the whole universe for the pattern on `target_date`.
    ///
    /// Only a catalog failure is an error; per-instrument failures skip
    /// that instrument. An empty match list is a valid outcome.
    pub fn run(&self, target_date: NaiveDate) -> Result<ScreenOutcome> {
        let started_at = Utc::now();
        let id = generate_run_id();
        let span = info_span!("screen", run_id = %id, date = %target_date);
        let _guard = span.enter();

        let instruments = self.catalog.list_instruments()?;
        let total = instruments.len();

        info!(
            total,
            source = self.source.name(),
            "Starting golden-cross screen"
        );

        let mut matches = Vec::new();
        let mut evaluated = 0;
        let mut skipped = 0;

        for (index, instrument) in instruments.iter().enumerate() {
            match self.screen_instrument(instrument, target_date) {
                Verdict::Matched(m) => {
                    info!(code = %m.code, name = %m.name, close = m.close, "Pattern matched");
                    evaluated += 1;
                    matches.push(m);
                }
                Verdict::NoMatch => evaluated += 1,
                Verdict::Skipped => skipped += 1,
            }

            self.observer.on_progress(Progress {
                index,
                total,
                matches: matches.len(),
            });

            if !self.pacing.is_zero() {
                thread::sleep(self.pacing);
            }
        }

        sort_by_close_desc(&mut matches);

        let completed_at = Utc::now();
        let duration_secs = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let outcome = ScreenOutcome {
            id,
            target_date,
            total_instruments: total,
            evaluated,
            skipped,
            matches,
            started_at,
            completed_at,
            duration_secs,
        };

        info!("{}", outcome.summary());

        Ok(outcome)
    }

    fn screen_instrument(&self, instrument: &Instrument, target_date: NaiveDate) -> Verdict {
        let bars = match self.source.fetch_daily_bars(&instrument.code, MIN_FETCH_BARS) {
            FetchOutcome::Bars(bars) => bars,
            FetchOutcome::Failed(reason) => {
                debug!(code = %instrument.code, reason = %reason, "Skipped: fetch failed");
                return Verdict::Skipped;
            }
        };

        if bars.len() < MIN_HISTORY_BARS {
            debug!(code = %instrument.code, bars = bars.len(), "Skipped: short history");
            return Verdict::Skipped;
        }

        let series = augment(bars, &IndicatorWindows::golden_cross());

        // Target too early in the series to look back one bar
        if let Some(i) = series.position(target_date) {
            if i < MIN_TARGET_INDEX {
                debug!(code = %instrument.code, index = i, "Skipped: target too early");
                return Verdict::Skipped;
            }
        }

        match pattern::check(&series, target_date) {
            Ok(features) => Verdict::Matched(Match::new(instrument, features)),
            Err(rejection) => {
                debug!(code = %instrument.code, reason = %rejection, "No match");
                Verdict::NoMatch
            }
        }
    }
}
