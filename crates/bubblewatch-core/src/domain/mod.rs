//! # Domain Models
//!
//! Canonical types published in the stock cache file.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercase ticker symbol |
//! | [`UtcDateTime`] | RFC3339 UTC timestamp |
//! | [`QuotePoint`] | Price and market cap for one ticker |
//! | [`QuoteOrigin`] | Whether a point is live or synthetic |
//! | [`Snapshot`] | Ordered points produced by one refresh run |
//!
//! Field names on the wire follow the front-end contract (`marketCap`,
//! `timestampUTC`, `generatedAtUTC`) rather than Rust naming.

mod models;
mod symbol;
mod timestamp;

pub(crate) use models::validate_positive;
pub use models::{round_to_cents, QuoteOrigin, QuotePoint, Snapshot};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
