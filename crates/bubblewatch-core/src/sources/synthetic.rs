//! Deterministic stand-in quotes for offline and demo runs.
//!
//! Each point is a pure function of `(symbol, calendar day)`: the generator
//! is seeded from a stable hash of both, walks a year of daily steps from
//! the ticker's base price, and reports the final step. Two runs on the same
//! UTC day produce byte-identical points.

use time::Date;

use crate::quote_source::{FetchFuture, QuoteSource};
use crate::{round_to_cents, QuoteOrigin, QuotePoint, Symbol, TickerSpec, UtcDateTime};

const WALK_DAYS: u16 = 365;
const DAILY_DRIFT: f64 = 0.0008;
const SEASONAL_AMPLITUDE: f64 = 0.01;
const SEASONAL_PERIOD: f64 = 20.0;
const NOISE_BAND: f64 = 0.004;
const PRICE_FLOOR: f64 = 1.0;

/// Never-failing quote source keyed by symbol and day.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticSource;

impl SyntheticSource {
    pub const fn new() -> Self {
        Self
    }

    /// Point for `ticker` on `day`, stamped at midnight UTC.
    pub fn generate(&self, ticker: &TickerSpec, day: Date) -> QuotePoint {
        let mut rng = fastrand::Rng::with_seed(day_seed(&ticker.symbol, day));
        let mut price = ticker.base_price;

        for step in 0..=WALK_DAYS {
            let seasonal = (f64::from(step) / SEASONAL_PERIOD).sin() * SEASONAL_AMPLITUDE;
            let noise = (rng.f64() * 2.0 - 1.0) * NOISE_BAND;
            price = (price * (1.0 + seasonal + DAILY_DRIFT + noise)).max(PRICE_FLOOR);
        }

        let price = round_to_cents(price).max(PRICE_FLOOR);
        QuotePoint {
            symbol: ticker.symbol.clone(),
            price,
            market_cap: ticker.market_cap_at(price),
            timestamp: UtcDateTime::start_of_day(day),
            source: QuoteOrigin::Synthetic,
        }
    }
}

impl QuoteSource for SyntheticSource {
    fn origin(&self) -> QuoteOrigin {
        QuoteOrigin::Synthetic
    }

    fn fetch<'a>(&'a self, ticker: &'a TickerSpec, as_of: UtcDateTime) -> FetchFuture<'a> {
        Box::pin(async move { Ok(self.generate(ticker, as_of.date())) })
    }
}

/// Stable across processes and platforms, unlike `std`'s randomized hasher.
fn day_seed(symbol: &Symbol, day: Date) -> u64 {
    let symbol_hash = symbol
        .as_str()
        .bytes()
        .fold(5381_u64, |acc, byte| acc.wrapping_mul(33).wrapping_add(u64::from(byte)));
    mix(symbol_hash ^ mix(day.to_julian_day() as u64))
}

// splitmix64 finalizer
fn mix(mut value: u64) -> u64 {
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}
