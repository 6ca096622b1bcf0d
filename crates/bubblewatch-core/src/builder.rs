//! Snapshot assembly and publication.
//!
//! A run walks the configured tickers, asks the live source for each one
//! and substitutes a synthetic point for any symbol whose live fetch fails.
//! Fetch failures are never fatal; only publishing the file can fail.
//!
//! ```text
//! Start -> FetchingTicker(i) -> Success | FallbackSynthetic
//!       -> ... -> Assembling -> WritingAtomic -> Done
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::config::{RefreshConfig, RefreshMode, TickerSpec};
use crate::quote_source::{FetchError, QuoteSource};
use crate::sources::SyntheticSource;
use crate::writer;
use crate::{QuoteOrigin, QuotePoint, Snapshot, Symbol, UtcDateTime, ValidationError, WriteError};

/// Failure of a whole refresh run.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("invalid refresh configuration: {0}")]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// A symbol that was served synthetically after its live fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub symbol: Symbol,
    pub error: FetchError,
}

/// Summary of a completed refresh run.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub output_path: PathBuf,
    pub snapshot: Snapshot,
    pub fallbacks: Vec<Fallback>,
}

impl RefreshReport {
    pub fn live_count(&self) -> usize {
        self.snapshot.count_by_origin(QuoteOrigin::Live)
    }

    pub fn synthetic_count(&self) -> usize {
        self.snapshot.count_by_origin(QuoteOrigin::Synthetic)
    }
}

/// Snapshot plus the per-symbol fallbacks that shaped it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub snapshot: Snapshot,
    pub fallbacks: Vec<Fallback>,
}

/// Orchestrates per-ticker fetches and publishes the result.
pub struct SnapshotBuilder {
    config: RefreshConfig,
    live: Option<Arc<dyn QuoteSource>>,
    synthetic: SyntheticSource,
}

impl SnapshotBuilder {
    /// Builder without a live source; every point will be synthetic until
    /// one is attached with [`with_live_source`](Self::with_live_source).
    pub fn new(config: RefreshConfig) -> Self {
        Self {
            config,
            live: None,
            synthetic: SyntheticSource::new(),
        }
    }

    pub fn with_live_source(mut self, live: Arc<dyn QuoteSource>) -> Self {
        self.live = Some(live);
        self
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Build a complete snapshot for `tickers`: one point per ticker, in order.
    pub async fn build(&self, tickers: &[TickerSpec], clock: &dyn Clock) -> Snapshot {
        self.assemble(tickers, clock).await.snapshot
    }

    /// Like [`build`](Self::build), also reporting which symbols fell back.
    pub async fn assemble(&self, tickers: &[TickerSpec], clock: &dyn Clock) -> Assembly {
        let as_of = clock.now();

        let live = match (&self.live, self.config.mode) {
            (Some(live), RefreshMode::Live) => Arc::clone(live),
            (_, mode) => {
                tracing::info!(
                    demo = (mode == RefreshMode::Demo),
                    tickers = tickers.len(),
                    "using synthetic quotes for every ticker"
                );
                let points = tickers
                    .iter()
                    .map(|ticker| self.synthetic.generate(ticker, as_of.date()))
                    .collect();
                return Assembly {
                    snapshot: Snapshot::new(as_of, points),
                    fallbacks: Vec::new(),
                };
            }
        };

        let origin = live.origin();
        let handles = self.spawn_live_fetches(live, tickers, as_of);

        let mut points = Vec::with_capacity(tickers.len());
        let mut fallbacks = Vec::new();
        // Awaiting in ticker order keeps the output order independent of completion order.
        for (ticker, handle) in tickers.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(result) => result.and_then(|point| ensure_answers(ticker, origin, point)),
                Err(join_error) => Err(FetchError::network(format!(
                    "fetch task for '{}' did not complete: {join_error}",
                    ticker.symbol
                ))),
            };

            match outcome {
                Ok(point) => {
                    tracing::debug!(
                        symbol = %ticker.symbol,
                        price = point.price,
                        market_cap = point.market_cap,
                        "live quote fetched"
                    );
                    points.push(point);
                }
                Err(error) => {
                    tracing::warn!(
                        symbol = %ticker.symbol,
                        code = error.code(),
                        error = error.message(),
                        "live fetch failed; substituting synthetic quote"
                    );
                    points.push(self.synthetic.generate(ticker, as_of.date()));
                    fallbacks.push(Fallback {
                        symbol: ticker.symbol.clone(),
                        error,
                    });
                }
            }
        }

        Assembly {
            snapshot: Snapshot::new(as_of, points),
            fallbacks,
        }
    }

    /// Run end to end: validate config, build for the configured tickers,
    /// and atomically publish to the configured output path.
    pub async fn refresh(&self, clock: &dyn Clock) -> Result<RefreshReport, RefreshError> {
        self.config.validate()?;

        let Assembly {
            snapshot,
            fallbacks,
        } = self.assemble(&self.config.tickers, clock).await;

        let output_path = self.config.output_path.clone();
        writer::publish(&snapshot, &output_path, self.config.pretty)?;

        let report = RefreshReport {
            output_path,
            snapshot,
            fallbacks,
        };
        tracing::info!(
            path = %report.output_path.display(),
            live = report.live_count(),
            synthetic = report.synthetic_count(),
            "snapshot published"
        );
        Ok(report)
    }

    fn spawn_live_fetches(
        &self,
        live: Arc<dyn QuoteSource>,
        tickers: &[TickerSpec],
        as_of: UtcDateTime,
    ) -> Vec<JoinHandle<Result<QuotePoint, FetchError>>> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let timeout = self.config.fetch_timeout;

        tickers
            .iter()
            .cloned()
            .map(|ticker| {
                let live = Arc::clone(&live);
                let permits = Arc::clone(&permits);
                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|_| FetchError::network("fetch limiter closed"))?;

                    match tokio::time::timeout(timeout, live.fetch(&ticker, as_of)).await {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::timeout(format!(
                            "live fetch for '{}' exceeded {} ms",
                            ticker.symbol,
                            timeout.as_millis()
                        ))),
                    }
                })
            })
            .collect()
    }
}

/// A live answer must be for the requested ticker and tagged with the
/// source's own origin.
fn ensure_answers(
    ticker: &TickerSpec,
    origin: QuoteOrigin,
    point: QuotePoint,
) -> Result<QuotePoint, FetchError> {
    if point.symbol != ticker.symbol {
        return Err(FetchError::malformed(format!(
            "source answered '{}' for '{}'",
            point.symbol, ticker.symbol
        )));
    }
    if point.source != origin {
        return Err(FetchError::malformed(format!(
            "{origin} source returned a {} point for '{}'",
            point.source, ticker.symbol
        )));
    }
    Ok(point)
}
