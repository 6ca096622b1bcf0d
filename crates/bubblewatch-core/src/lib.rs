//! # Bubblewatch Core
//!
//! Refreshes the stock cache consumed by the bubblewatch front-end chart.
//!
//! ## Overview
//!
//! A refresh run produces one [`Snapshot`]: a price and market cap for every
//! tracked ticker, in configured order. Each ticker is fetched from the live
//! provider when possible; any failure for a single ticker is replaced by a
//! deterministic synthetic point so the snapshot is always complete. The
//! result is written to disk with an atomic temp-file-then-rename.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`builder`] | Snapshot assembly, fallback, and publishing |
//! | [`clock`] | Injectable "now" |
//! | [`config`] | Ticker list and run settings |
//! | [`domain`] | Wire types (`Symbol`, `QuotePoint`, `Snapshot`) |
//! | [`error`] | Validation and write errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`quote_source`] | `QuoteSource` trait and `FetchError` |
//! | [`sources`] | Yahoo (live) and synthetic sources |
//! | [`writer`] | Atomic file replacement |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bubblewatch_core::{RefreshConfig, SnapshotBuilder, SystemClock, YahooSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let builder = SnapshotBuilder::new(RefreshConfig::default())
//!         .with_live_source(Arc::new(YahooSource::default()));
//!     let report = builder.refresh(&SystemClock).await?;
//!     println!("{} live, {} synthetic", report.live_count(), report.synthetic_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI            │
//! └────────┬────────┘
//!          │ RefreshConfig
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ SnapshotBuilder │────▶│ Atomic writer    │
//! └────────┬────────┘     └──────────────────┘
//!          │ per ticker
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ QuoteSource     │────▶│ HTTP Client      │
//! │ live│synthetic  │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod builder;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod quote_source;
pub mod sources;
pub mod writer;

// Builder
pub use builder::{Assembly, Fallback, RefreshError, RefreshReport, SnapshotBuilder};

// Clock
pub use clock::{Clock, FixedClock, SystemClock};

// Configuration
pub use config::{default_tickers, RefreshConfig, RefreshMode, TickerSpec, DEFAULT_OUTPUT_PATH};

// Domain models
pub use domain::{round_to_cents, QuoteOrigin, QuotePoint, Snapshot, Symbol, UtcDateTime};

// Error types
pub use error::{ValidationError, WriteError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Quote sources
pub use quote_source::{FetchError, FetchErrorKind, FetchFuture, QuoteSource};
pub use sources::{SyntheticSource, YahooEndpoints, YahooSource};

// Publishing
pub use writer::{publish, write_atomic};
