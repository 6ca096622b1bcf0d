//! CLI argument definitions for bubblewatch.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--demo` | `false` | Force synthetic data for every ticker |
//! | `--output` | `data/stocks.json` | Cache file to publish |
//! | `--tickers` | `NVDA,MSFT,GOOGL,META,AMZN` | Tickers to track, in order |
//! | `--timeout-ms` | `3000` | Per-symbol live fetch timeout |
//! | `--concurrency` | `2` | Max live fetches in flight |
//! | `--pretty` | `false` | Indent the JSON output |
//!
//! # Examples
//!
//! ```bash
//! # Refresh the default cache with live data
//! bubblewatch
//!
//! # Offline / local development
//! bubblewatch --demo --pretty
//!
//! # Track a custom list somewhere else
//! bubblewatch --tickers NVDA,MSFT --output /tmp/stocks.json
//! ```

use std::path::PathBuf;
use std::time::Duration;

use bubblewatch_core::{RefreshConfig, RefreshMode, Symbol, DEFAULT_OUTPUT_PATH};
use clap::Parser;

use crate::error::CliError;

/// Refresh the cached stock snapshot used by the bubblewatch chart.
///
/// Live quotes are preferred; any ticker whose live fetch fails gets a
/// deterministic synthetic point instead, so the file is always complete.
#[derive(Debug, Parser)]
#[command(name = "bubblewatch", author, version, about)]
pub struct Cli {
    /// Force synthetic data for every ticker (no network access).
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// Path of the JSON cache file to publish.
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Comma-separated tickers to track, in publication order.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,

    /// Per-symbol live fetch timeout in milliseconds.
    #[arg(long, default_value_t = 3000)]
    pub timeout_ms: u64,

    /// Maximum number of live fetches in flight.
    #[arg(long, default_value_t = 2)]
    pub concurrency: usize,

    /// Pretty-print the JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl Cli {
    pub fn to_config(&self) -> Result<RefreshConfig, CliError> {
        let mut config = RefreshConfig::default()
            .with_output_path(self.output.clone())
            .with_fetch_timeout(Duration::from_millis(self.timeout_ms))
            .with_max_concurrency(self.concurrency)
            .with_pretty(self.pretty)
            .with_mode(if self.demo {
                RefreshMode::Demo
            } else {
                RefreshMode::Live
            });

        if let Some(raw) = &self.tickers {
            let symbols = raw
                .iter()
                .map(|value| Symbol::parse(value))
                .collect::<Result<Vec<_>, _>>()?;
            config = config.with_symbols(symbols);
        }

        config.validate()?;
        Ok(config)
    }
}
