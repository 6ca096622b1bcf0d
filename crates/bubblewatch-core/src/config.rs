//! Refresh configuration passed explicitly into the snapshot builder.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::{Symbol, ValidationError};

/// Default location of the published cache file, relative to the repo root.
pub const DEFAULT_OUTPUT_PATH: &str = "data/stocks.json";

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(3_000);
const DEFAULT_MAX_CONCURRENCY: usize = 2;
const FALLBACK_BASE_PRICE: f64 = 100.0;
const FALLBACK_SHARES_OUTSTANDING: f64 = 10e9;

/// Tracked tickers with their synthetic anchors: (symbol, base price, shares outstanding).
const DEFAULT_TICKERS: [(&str, f64, f64); 5] = [
    ("NVDA", 140.0, 24.5e9),
    ("MSFT", 350.0, 10e9),
    ("GOOGL", 135.0, 10e9),
    ("META", 300.0, 10e9),
    ("AMZN", 120.0, 10e9),
];

/// One tracked ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSpec {
    pub symbol: Symbol,
    /// Anchor price for the synthetic random walk.
    pub base_price: f64,
    /// Used to derive market cap when a source does not report one.
    pub shares_outstanding: f64,
}

impl TickerSpec {
    pub fn new(symbol: Symbol, base_price: f64, shares_outstanding: f64) -> Self {
        Self {
            symbol,
            base_price,
            shares_outstanding,
        }
    }

    /// Spec for `symbol`, using the built-in anchors when the ticker is known.
    pub fn for_symbol(symbol: Symbol) -> Self {
        DEFAULT_TICKERS
            .iter()
            .find(|(known, _, _)| *known == symbol.as_str())
            .map(|(_, base_price, shares)| Self::new(symbol.clone(), *base_price, *shares))
            .unwrap_or_else(|| {
                Self::new(symbol, FALLBACK_BASE_PRICE, FALLBACK_SHARES_OUTSTANDING)
            })
    }

    /// Market cap in whole currency units for `price`.
    pub fn market_cap_at(&self, price: f64) -> u64 {
        (price * self.shares_outstanding).round().max(0.0) as u64
    }
}

/// The built-in ticker list, in publication order.
pub fn default_tickers() -> Vec<TickerSpec> {
    DEFAULT_TICKERS
        .iter()
        .filter_map(|(symbol, base_price, shares)| {
            Symbol::parse(symbol)
                .ok()
                .map(|symbol| TickerSpec::new(symbol, *base_price, *shares))
        })
        .collect()
}

/// Whether live data may be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Prefer live quotes, falling back per symbol.
    #[default]
    Live,
    /// Force synthetic quotes for every symbol.
    Demo,
}

/// Everything a refresh run needs to know, with no ambient globals.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshConfig {
    pub tickers: Vec<TickerSpec>,
    pub output_path: PathBuf,
    pub fetch_timeout: Duration,
    pub max_concurrency: usize,
    pub mode: RefreshMode,
    pub pretty: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            mode: RefreshMode::Live,
            pretty: false,
        }
    }
}

impl RefreshConfig {
    pub fn with_tickers(mut self, tickers: Vec<TickerSpec>) -> Self {
        self.tickers = tickers;
        self
    }

    /// Replace the ticker list with `symbols`, keeping known anchors.
    pub fn with_symbols(self, symbols: Vec<Symbol>) -> Self {
        let tickers = symbols.into_iter().map(TickerSpec::for_symbol).collect();
        self.with_tickers(tickers)
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_mode(mut self, mode: RefreshMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.tickers.iter().map(|spec| spec.symbol.clone()).collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tickers.is_empty() {
            return Err(ValidationError::EmptyTickerList);
        }

        let mut seen = HashSet::with_capacity(self.tickers.len());
        for spec in &self.tickers {
            if !seen.insert(&spec.symbol) {
                return Err(ValidationError::DuplicateTicker {
                    symbol: spec.symbol.to_string(),
                });
            }
            crate::domain::validate_positive("base_price", spec.base_price)?;
            crate::domain::validate_positive("shares_outstanding", spec.shares_outstanding)?;
        }

        if self.fetch_timeout.is_zero() {
            return Err(ValidationError::ZeroSetting {
                field: "fetch_timeout",
            });
        }
        if self.max_concurrency == 0 {
            return Err(ValidationError::ZeroSetting {
                field: "max_concurrency",
            });
        }

        Ok(())
    }
}
