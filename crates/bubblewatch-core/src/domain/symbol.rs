//! Exchange ticker as Yahoo Finance spells it.
//!
//! | Form | Example |
//! |------|---------|
//! | plain equity | `NVDA` |
//! | share class | `BRK-B`, `BRK.B` |
//! | foreign listing | `SHEL.L` |
//! | index | `^GSPC` |
//! | currency pair | `EURUSD=X` |

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 12;
const INDEX_MARKER: char = '^';

/// Uppercase ticker, validated once at the edge and trusted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();
        if ticker.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let len = ticker.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        let body_offset = usize::from(ticker.starts_with(INDEX_MARKER));
        let mut chars = ticker.chars().enumerate().skip(body_offset);

        match chars.next() {
            Some((_, first)) if first.is_ascii_alphabetic() => {}
            Some((_, first)) => return Err(ValidationError::SymbolInvalidStart { ch: first }),
            None => return Err(ValidationError::EmptySymbol),
        }

        let mut previous_was_separator = false;
        for (index, ch) in chars {
            if ch.is_ascii_alphanumeric() {
                previous_was_separator = false;
                continue;
            }
            if !is_separator(ch) || previous_was_separator {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
            previous_was_separator = true;
        }
        if previous_was_separator {
            return Err(ValidationError::SymbolDanglingSeparator { symbol: ticker });
        }

        Ok(Self(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// share class, exchange suffix, and Yahoo's currency-pair suffix
fn is_separator(ch: char) -> bool {
    matches!(ch, '.' | '-' | '=')
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
