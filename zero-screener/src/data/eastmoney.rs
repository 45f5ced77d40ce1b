//! Eastmoney adapter for A-share market data.
//!
//! Implements `InstrumentCatalog` and `BarSource` on top of the public
//! eastmoney APIs with a blocking HTTP client.
//!
//! # Data Sources
//! - Stock listing: push2.eastmoney.com
//! - Daily K-line: push2his.eastmoney.com

use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use zero_common::config::ScreenerConfig;

use super::provider::{BarSource, FetchFailure, FetchOutcome, InstrumentCatalog};
use super::{Bar, Instrument};
use crate::error::{Result, ResultExt, ScreenerError};

// ============================================================================
// Constants
// ============================================================================

/// Per-instrument K-line request timeout
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Listing request timeout (one large page)
const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Requested listing page size; the server may return fewer per page
const CATALOG_PAGE_SIZE: usize = 5000;

/// Board filter: Shanghai main board, Shenzhen main board, ChiNext
const CATALOG_BOARDS: &str = "m:1 t:2,m:0 t:6,m:0 t:80";

/// K-line field selection:
/// date,open,close,high,low,volume,turnover,amplitude,pct_chg
const KLINE_FIELDS1: &str = "f1,f2,f3,f4,f5,f6";
const KLINE_FIELDS2: &str = "f51,f52,f53,f54,f55,f56,f57,f58,f59";

/// Number of comma-separated fields per K-line
const KLINE_FIELD_COUNT: usize = 9;

/// Position of the percent change (f59) in a K-line
const KLINE_PCT_CHG: usize = 8;

// ============================================================================
// Symbol Mapping
// ============================================================================

/// Convert an exchange code to eastmoney secid format.
///
/// Shanghai codes (leading 6) use market 1; Shenzhen and Beijing use 0.
/// "600000" -> "1.600000", "000001" -> "0.000001"
fn to_secid(code: &str) -> Option<String> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let market = if code.starts_with('6') { "1" } else { "0" };
    Some(format!("{}.{}", market, code))
}

// ============================================================================
// Eastmoney Client
// ============================================================================

/// Blocking eastmoney client.
pub struct EastmoneyClient {
    /// HTTP client
    client: reqwest::blocking::Client,
    /// Daily K-line endpoint
    kline_url: String,
    /// Stock listing endpoint
    catalog_url: String,
}

impl EastmoneyClient {
    /// Create a client against the public endpoints
    pub fn new() -> Result<Self> {
        Self::from_config(&ScreenerConfig::default())
    }

    /// Create from config
    pub fn from_config(config: &ScreenerConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
            .build()
            .context("building eastmoney HTTP client")?;

        Ok(Self {
            client,
            kline_url: config.kline_url.clone(),
            catalog_url: config.catalog_url.clone(),
        })
    }

    /// Fetch daily K-lines (forward-adjusted) for one code
    fn fetch_kline(&self, code: &str, limit: usize) -> std::result::Result<Vec<Bar>, FetchFailure> {
        let secid = to_secid(code).ok_or_else(|| FetchFailure::InvalidCode(code.to_string()))?;
        let limit = limit.to_string();

        debug!(code, secid = %secid, "Fetching kline from eastmoney");

        let response = self
            .client
            .get(&self.kline_url)
            .query(&[
                ("secid", secid.as_str()),
                ("fields1", KLINE_FIELDS1),
                ("fields2", KLINE_FIELDS2),
                ("klt", "101"),
                ("fqt", "1"),
                ("end", ""),
                ("lmt", limit.as_str()),
            ])
            .send()
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            return Err(FetchFailure::Transport(format!("HTTP {}", response.status())));
        }

        let data: KlineResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                FetchFailure::Timeout
            } else {
                FetchFailure::Malformed(e.to_string())
            }
        })?;

        if data.rc != 0 {
            return Err(FetchFailure::Malformed(format!("rc={}", data.rc)));
        }

        let klines = data.data.and_then(|d| d.klines).unwrap_or_default();
        if klines.is_empty() {
            return Err(FetchFailure::NoData);
        }

        parse_klines(&klines)
    }

    /// Fetch one page of the stock listing
    fn fetch_listing_page(&self, page: usize) -> Result<ListingPage> {
        let page = page.to_string();
        let page_size = CATALOG_PAGE_SIZE.to_string();

        let response = self
            .client
            .get(&self.catalog_url)
            .timeout(CATALOG_TIMEOUT)
            .query(&[
                ("pn", page.as_str()),
                ("pz", page_size.as_str()),
                ("po", "1"),
                ("np", "1"),
                ("fltt", "2"),
                ("invt", "2"),
                ("fid", "f12"),
                ("fs", CATALOG_BOARDS),
                ("fields", "f12,f14"),
            ])
            .send()
            .map_err(|e| ScreenerError::Catalog(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScreenerError::Catalog(format!("HTTP {}", response.status())));
        }

        let body: ListingResponse = response
            .json()
            .map_err(|e| ScreenerError::Catalog(format!("Failed to parse listing: {}", e)))?;

        parse_listing(body)
    }
}

fn transport_failure(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Transport(e.to_string())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse one eastmoney K-line string into a Bar.
///
/// Format: "2024-01-02,10.50,10.80,10.90,10.40,1000000,10500000.00,4.76,2.86"
fn parse_kline(line: &str) -> std::result::Result<Bar, FetchFailure> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < KLINE_FIELD_COUNT {
        return Err(FetchFailure::Malformed(format!("short kline: {}", line)));
    }

    let date = NaiveDate::parse_from_str(parts[0], "%Y-%m-%d")
        .map_err(|e| FetchFailure::Malformed(format!("date '{}': {}", parts[0], e)))?;

    let field = |idx: usize, label: &str| -> std::result::Result<f64, FetchFailure> {
        parts[idx]
            .trim()
            .parse::<f64>()
            .map_err(|e| FetchFailure::Malformed(format!("{} '{}': {}", label, parts[idx], e)))
    };

    Ok(Bar {
        date,
        open: field(1, "open")?,
        close: field(2, "close")?,
        high: field(3, "high")?,
        low: field(4, "low")?,
        volume: field(5, "volume")?,
        turnover: field(6, "turnover")?,
        percent_change: field(KLINE_PCT_CHG, "pct_chg")?,
    })
}

/// Parse K-lines into bars ascending by date with duplicate dates dropped.
fn parse_klines(klines: &[String]) -> std::result::Result<Vec<Bar>, FetchFailure> {
    let mut bars = klines
        .iter()
        .map(|line| parse_kline(line))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    Ok(bars)
}

/// One page of listing results plus the reported universe size.
struct ListingPage {
    instruments: Vec<Instrument>,
    total: usize,
}

fn parse_listing(body: ListingResponse) -> Result<ListingPage> {
    let data = body
        .data
        .ok_or_else(|| ScreenerError::Catalog(format!("empty listing (rc={})", body.rc)))?;

    let instruments = data
        .diff
        .into_iter()
        .filter(|entry| !entry.f12.is_empty())
        .map(|entry| Instrument::new(entry.f12, entry.f14))
        .collect();

    Ok(ListingPage {
        instruments,
        total: data.total,
    })
}

// ============================================================================
// Provider Implementations
// ============================================================================

/// Number of pages needed for `total` entries at `page_len` per page.
fn page_count(total: usize, page_len: usize) -> usize {
    if page_len == 0 {
        return 0;
    }
    total.div_ceil(page_len)
}

/// Read listing pages until the reported universe is complete.
///
/// The page count comes from the reported total and the size of the first
/// page, so a server that caps the page size below the request is still
/// read to the end.
fn collect_pages<F>(mut fetch_page: F) -> Result<Vec<Instrument>>
where
    F: FnMut(usize) -> Result<ListingPage>,
{
    let first = fetch_page(1)?;
    let total = first.total;
    let pages = page_count(total, first.instruments.len());
    let mut instruments = first.instruments;

    debug!(total, pages, page_len = instruments.len(), "Fetched first listing page");

    for page in 2..=pages {
        let listing = fetch_page(page)?;
        let fetched = listing.instruments.len();
        instruments.extend(listing.instruments);

        debug!(page, fetched, "Fetched listing page");

        if fetched == 0 || instruments.len() >= total {
            break;
        }
    }

    if instruments.len() < total {
        warn!(
            fetched = instruments.len(),
            total,
            "Listing ended before the reported total"
        );
    }

    Ok(instruments)
}

impl InstrumentCatalog for EastmoneyClient {
    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        collect_pages(|page| self.fetch_listing_page(page))
    }
}

impl BarSource for EastmoneyClient {
    fn name(&self) -> &'static str {
        "eastmoney"
    }

    fn fetch_daily_bars(&self, code: &str, min_bars: usize) -> FetchOutcome {
        let outcome = FetchOutcome::from(self.fetch_kline(code, min_bars));
        if let FetchOutcome::Failed(ref failure) = outcome {
            debug!(code, reason = %failure, "Kline fetch failed");
        }
        outcome
    }
}

// ============================================================================
// Eastmoney API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct KlineResponse {
    /// Return code (0 = success)
    #[serde(default)]
    rc: i32,
    /// Data
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    /// K-line data as strings
    klines: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    rc: i32,
    data: Option<ListingData>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    diff: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    /// Code
    #[serde(default)]
    f12: String,
    /// Name
    #[serde(default)]
    f14: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_secid() {
        assert_eq!(to_secid("600000"), Some("1.600000".to_string()));
        assert_eq!(to_secid("000001"), Some("0.000001".to_string()));
        assert_eq!(to_secid("830799"), Some("0.830799".to_string()));
        assert_eq!(to_secid("60000A"), None);
        assert_eq!(to_secid(""), None);
    }

    #[test]
    fn test_parse_kline() {
        let bar =
            parse_kline("2025-10-16,10.50,10.80,10.90,10.40,123456,133000000.00,4.76,2.86").unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2025, 10, 16).unwrap());
        assert_eq!(bar.open, 10.50);
        assert_eq!(bar.close, 10.80);
        assert_eq!(bar.high, 10.90);
        assert_eq!(bar.low, 10.40);
        assert_eq!(bar.volume, 123456.0);
        assert_eq!(bar.turnover, 133000000.0);
        assert_eq!(bar.percent_change, 2.86);
    }

    #[test]
    fn test_parse_kline_down_day_keeps_negative_change() {
        // Amplitude 1.22 is always positive; the change field carries the sign
        let bar =
            parse_kline("2024-01-02,6.58,6.55,6.60,6.52,500000,328000000.00,1.22,-0.46").unwrap();
        assert!(!bar.is_bullish());
        assert_eq!(bar.percent_change, -0.46);
    }

    #[test]
    fn test_parse_kline_rejects_short_line() {
        let result = parse_kline("2025-10-16,10.50,10.80");
        assert!(matches!(result, Err(FetchFailure::Malformed(_))));

        // Eight fields lacks the percent change
        let result = parse_kline("2025-10-16,10.50,10.80,10.90,10.40,123456,133000000.00,4.76");
        assert!(matches!(result, Err(FetchFailure::Malformed(_))));
    }

    #[test]
    fn test_parse_kline_rejects_bad_number() {
        let result = parse_kline("2025-10-16,10.50,-,10.90,10.40,123456,133000000.00,4.76,2.86");
        assert!(matches!(result, Err(FetchFailure::Malformed(msg)) if msg.contains("close")));
    }

    #[test]
    fn test_parse_klines_sorts_and_dedups() {
        let klines = vec![
            "2025-10-16,1,2,3,0.5,100,200,5.0,1.0".to_string(),
            "2025-10-14,1,2,3,0.5,100,200,5.0,1.0".to_string(),
            "2025-10-15,1,2,3,0.5,100,200,5.0,1.0".to_string(),
            "2025-10-15,1,2,3,0.5,100,200,5.0,1.0".to_string(),
        ];
        let bars = parse_klines(&klines).unwrap();
        let days: Vec<u32> = bars.iter().map(|b| chrono::Datelike::day(&b.date)).collect();
        assert_eq!(days, vec![14, 15, 16]);
    }

    #[test]
    fn test_parse_kline_response_without_data() {
        let body: KlineResponse = serde_json::from_str(r#"{"rc":0,"rt":17,"data":null}"#).unwrap();
        assert!(body.data.is_none());
    }

    #[test]
    fn test_parse_listing() {
        let body: ListingResponse = serde_json::from_str(
            r#"{"rc":0,"data":{"total":2,"diff":[{"f12":"600000","f14":"浦发银行"},{"f12":"000001","f14":"平安银行"}]}}"#,
        )
        .unwrap();
        let page = parse_listing(body).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.instruments[0], Instrument::new("600000", "浦发银行"));
        assert_eq!(page.instruments[1].code, "000001");
    }

    #[test]
    fn test_parse_listing_without_data_is_catalog_error() {
        let body: ListingResponse = serde_json::from_str(r#"{"rc":102,"data":null}"#).unwrap();
        let err = parse_listing(body).err().unwrap();
        assert!(err.is_catalog());
    }

    fn listing(codes: std::ops::Range<usize>, total: usize) -> ListingPage {
        ListingPage {
            instruments: codes
                .map(|i| Instrument::new(format!("{:06}", i), format!("股票{}", i)))
                .collect(),
            total,
        }
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(5200, 5000), 2);
        assert_eq!(page_count(5000, 5000), 1);
        assert_eq!(page_count(2500, 100), 25);
        assert_eq!(page_count(0, 0), 0);
        assert_eq!(page_count(10, 0), 0);
    }

    #[test]
    fn test_collect_pages_follows_server_page_size() {
        // Server caps pages at 100 regardless of the requested size
        let mut requested = Vec::new();
        let instruments = collect_pages(|page| {
            requested.push(page);
            let start = (page - 1) * 100;
            Ok(listing(start..(start + 100).min(2550), 2550))
        })
        .unwrap();

        assert_eq!(instruments.len(), 2550);
        assert_eq!(requested, (1..=26).collect::<Vec<_>>());
        assert_eq!(instruments[2549].code, "002549");
    }

    #[test]
    fn test_collect_pages_single_page() {
        let mut calls = 0;
        let instruments = collect_pages(|_| {
            calls += 1;
            Ok(listing(0..3, 3))
        })
        .unwrap();
        assert_eq!(instruments.len(), 3);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_collect_pages_stops_on_empty_page() {
        let mut calls = 0;
        let instruments = collect_pages(|page| {
            calls += 1;
            if page == 1 {
                Ok(listing(0..10, 50))
            } else {
                Ok(listing(0..0, 50))
            }
        })
        .unwrap();
        assert_eq!(instruments.len(), 10);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_collect_pages_propagates_page_failure() {
        let err = collect_pages(|page| {
            if page == 1 {
                Ok(listing(0..10, 20))
            } else {
                Err(ScreenerError::Catalog("HTTP 502".into()))
            }
        })
        .unwrap_err();
        assert!(err.is_catalog());
    }

    #[test]
    fn test_client_builds_with_timeouts() {
        assert!(EastmoneyClient::from_config(&ScreenerConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_code_fails_without_request() {
        let client = EastmoneyClient::new().unwrap();
        let outcome = client.fetch_daily_bars("ABC", 30);
        assert_eq!(
            outcome,
            FetchOutcome::Failed(FetchFailure::InvalidCode("ABC".into()))
        );
    }

    // Integration tests require network access

    #[test]
    #[ignore = "requires network access"]
    fn test_fetch_daily_bars() {
        let client = EastmoneyClient::new().unwrap();
        let FetchOutcome::Bars(bars) = client.fetch_daily_bars("000001", 30) else {
            panic!("expected bars");
        };
        assert!(!bars.is_empty());
        assert!(bars.len() <= 30);
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    #[ignore = "requires network access"]
    fn test_list_instruments() {
        let client = EastmoneyClient::new().unwrap();
        let instruments = client.list_instruments().unwrap();
        assert!(instruments.len() > 1000);
    }
}
