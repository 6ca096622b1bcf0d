//! Quote source contract shared by the live and synthetic implementations.
//!
//! | Source | Origin | Can fail |
//! |--------|--------|----------|
//! | [`YahooSource`](crate::YahooSource) | [`QuoteOrigin::Live`] | yes, with [`FetchError`] |
//! | [`SyntheticSource`](crate::SyntheticSource) | [`QuoteOrigin::Synthetic`] | never |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{QuoteOrigin, QuotePoint, TickerSpec, UtcDateTime};

/// Per-symbol fetch failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Timeout,
    RateLimited,
    UnknownSymbol,
    MalformedResponse,
}

/// Transient, per-symbol failure. The snapshot builder recovers from these
/// by substituting a synthetic point; they never reach the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::RateLimited, message)
    }

    pub fn unknown_symbol(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::UnknownSymbol, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::MalformedResponse, message)
    }

    fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Network => "fetch.network",
            FetchErrorKind::Timeout => "fetch.timeout",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::UnknownSymbol => "fetch.unknown_symbol",
            FetchErrorKind::MalformedResponse => "fetch.malformed_response",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Boxed future returned by [`QuoteSource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<QuotePoint, FetchError>> + Send + 'a>>;

/// "Current price and market cap for ticker X".
///
/// Implementations must be `Send + Sync`; the builder shares them across
/// concurrently running fetch tasks.
pub trait QuoteSource: Send + Sync {
    /// Origin stamped on every point this source produces.
    fn origin(&self) -> QuoteOrigin;

    /// Fetch one point for `ticker`. `as_of` is the run's clock reading;
    /// sources use it when the upstream carries no timestamp of its own.
    fn fetch<'a>(&'a self, ticker: &'a TickerSpec, as_of: UtcDateTime) -> FetchFuture<'a>;
}
