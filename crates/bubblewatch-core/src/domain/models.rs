use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Where a quote point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteOrigin {
    Live,
    Synthetic,
}

impl QuoteOrigin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Synthetic => "synthetic",
        }
    }
}

impl Display for QuoteOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time price and market cap for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePoint {
    pub symbol: Symbol,
    pub price: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: u64,
    #[serde(rename = "timestampUTC")]
    pub timestamp: UtcDateTime,
    pub source: QuoteOrigin,
}

impl QuotePoint {
    pub fn new(
        symbol: Symbol,
        price: f64,
        market_cap: u64,
        timestamp: UtcDateTime,
        source: QuoteOrigin,
    ) -> Result<Self, ValidationError> {
        validate_positive("price", price)?;

        Ok(Self {
            symbol,
            price,
            market_cap,
            timestamp,
            source,
        })
    }
}

/// One complete set of quote points produced by a single refresh run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "generatedAtUTC")]
    pub generated_at: UtcDateTime,
    pub points: Vec<QuotePoint>,
}

impl Snapshot {
    pub fn new(generated_at: UtcDateTime, points: Vec<QuotePoint>) -> Self {
        Self {
            generated_at,
            points,
        }
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.points.iter().map(|point| &point.symbol)
    }

    pub fn count_by_origin(&self, origin: QuoteOrigin) -> usize {
        self.points
            .iter()
            .filter(|point| point.source == origin)
            .count()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

pub(crate) fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

/// Round a price to whole cents.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
