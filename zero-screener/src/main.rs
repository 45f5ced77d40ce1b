//! Zero Screener - end-of-day golden-cross screen over A-shares.
//!
//! Lists the eligible universe, evaluates the MA5/MA10 golden cross with
//! volume confirmation on the target date, and saves matches as CSV.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Input;
use zero_common::config::{config_path, Config};
use zero_common::logging::init_logging_with_exclusions;
use zero_screener::screener::{parse_target_date, render_table, CsvSink, ResultSink};
use zero_screener::{EastmoneyClient, EligibilityPolicy, EligibleCatalog, ScreenerEngine};

/// Screen A-shares for a 5/10-day MA golden cross confirmed by volume.
#[derive(Parser, Debug)]
#[command(name = "zero-screener")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "MA5/MA10 golden-cross screener for A-shares", long_about = None)]
struct Cli {
    /// Target trading date as YYYYMMDD (prompted for when omitted)
    date: Option<String>,

    /// Directory for the result CSV
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.codecoder/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_file = cli.config.clone().unwrap_or_else(config_path);
    let mut config = Config::load_with_env(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.screener.output_dir = dir;
    }
    config.validate().context("Invalid configuration")?;

    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("Zero Screener v{}", env!("CARGO_PKG_VERSION"));
    if config_file.exists() {
        tracing::info!(path = %config_file.display(), "Configuration loaded");
    } else {
        tracing::info!(path = %config_file.display(), "Config file not found, using defaults");
    }

    let raw_date = match cli.date {
        Some(date) => date,
        None => Input::<String>::new()
            .with_prompt("请输入日期（如 20251016）")
            .interact_text()
            .context("Failed to read target date")?,
    };
    let target_date = parse_target_date(&raw_date)?;

    let client = Arc::new(EastmoneyClient::from_config(&config.screener)?);
    let catalog = EligibleCatalog::new(
        Arc::clone(&client),
        EligibilityPolicy::from_config(&config.screener),
    );
    let engine = ScreenerEngine::new(catalog, client);

    let outcome = engine.run(target_date)?;

    if outcome.is_empty() {
        println!("[RESULT] 没有股票符合筛选条件。");
        return Ok(());
    }

    println!(
        "[RESULT] {} 次日潜力股：{} 只",
        target_date.format("%Y%m%d"),
        outcome.matches.len()
    );
    print!("{}", render_table(&outcome.matches));

    let sink = CsvSink::new(&config.screener.output_dir);
    if let Some(path) = sink.write(target_date, &outcome.matches)? {
        println!("已保存至 {}", path.display());
    }

    Ok(())
}
