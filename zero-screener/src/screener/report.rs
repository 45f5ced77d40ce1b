//! Screening result output.
//!
//! Writes matches as a spreadsheet-friendly CSV and renders them as a
//! plain-text table for the console.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use console::{measure_text_width, pad_str, Alignment};
use serde::Serialize;
use tracing::info;

use crate::error::{Result, ResultExt};

use super::engine::Match;

/// UTF-8 byte order mark so spreadsheet tools detect the encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Destination for a run's matches.
pub trait ResultSink {
    /// Persist `matches`; returns where they went, or `None` if nothing was written.
    fn write(&self, target_date: NaiveDate, matches: &[Match]) -> Result<Option<PathBuf>>;
}

// ============================================================================
// CSV Sink
// ============================================================================

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "代码")]
    code: &'a str,
    #[serde(rename = "名称")]
    name: &'a str,
    #[serde(rename = "日期")]
    date: String,
    #[serde(rename = "收盘价")]
    close: f64,
    #[serde(rename = "成交量")]
    volume: f64,
    #[serde(rename = "5日均量")]
    volume_ma5: f64,
    #[serde(rename = "MA5")]
    close_ma5: f64,
    #[serde(rename = "MA10")]
    close_ma10: f64,
}

impl<'a> From<&'a Match> for CsvRow<'a> {
    fn from(m: &'a Match) -> Self {
        Self {
            code: &m.code,
            name: &m.name,
            date: m.date.format("%Y-%m-%d").to_string(),
            close: m.close,
            volume: m.volume,
            volume_ma5: m.volume_ma5,
            close_ma5: m.close_ma5,
            close_ma10: m.close_ma10,
        }
    }
}

/// Writes `potential_stocks_<YYYYMMDD>.csv` into a directory.
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// File the matches for `target_date` are written to.
    pub fn file_path(&self, target_date: NaiveDate) -> PathBuf {
        self.output_dir
            .join(format!("potential_stocks_{}.csv", target_date.format("%Y%m%d")))
    }
}

impl ResultSink for CsvSink {
    fn write(&self, target_date: NaiveDate, matches: &[Match]) -> Result<Option<PathBuf>> {
        if matches.is_empty() {
            return Ok(None);
        }

        fs::create_dir_all(&self.output_dir)
            .context(format!("creating {}", self.output_dir.display()))?;

        let path = self.file_path(target_date);
        let mut file = File::create(&path).context(format!("creating {}", path.display()))?;
        file.write_all(UTF8_BOM)
            .context(format!("writing {}", path.display()))?;

        let mut writer = csv::Writer::from_writer(file);
        for m in matches {
            writer
                .serialize(CsvRow::from(m))
                .context(format!("writing {}", path.display()))?;
        }
        writer.flush().context(format!("flushing {}", path.display()))?;

        info!(path = %path.display(), rows = matches.len(), "Results saved");

        Ok(Some(path))
    }
}

// ============================================================================
// Console Table
// ============================================================================

const TABLE_HEADERS: [&str; 8] = ["代码", "名称", "日期", "收盘价", "成交量", "5日均量", "MA5", "MA10"];

/// Columns after this index are numeric and right-aligned
const LAST_TEXT_COLUMN: usize = 2;

/// Render matches as an aligned text table, one row per match.
///
/// Columns are padded by terminal display width, so double-width names
/// line up.
pub fn render_table(matches: &[Match]) -> String {
    let header: Vec<String> = TABLE_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows: Vec<Vec<String>> = matches
        .iter()
        .map(|m| {
            vec![
                m.code.clone(),
                m.name.clone(),
                m.date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", m.close),
                format!("{:.0}", m.volume),
                format!("{:.0}", m.volume_ma5),
                format!("{:.3}", m.close_ma5),
                format!("{:.3}", m.close_ma10),
            ]
        })
        .collect();

    let mut widths = [0usize; TABLE_HEADERS.len()];
    for row in std::iter::once(&header).chain(&rows) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, width))| {
                let align = if col > LAST_TEXT_COLUMN {
                    Alignment::Right
                } else {
                    Alignment::Left
                };
                pad_str(cell, width, align, None).into_owned()
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}
