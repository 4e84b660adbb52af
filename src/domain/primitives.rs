//! Domain primitives: Timestamp, Pair, Currency, Side.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used for every date written to a ledger table.
pub const LEDGER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A UTC wall-clock instant with whole-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    /// Sub-second precision is dropped.
    pub fn new(at: NaiveDateTime) -> Self {
        Timestamp(at.with_nanosecond(0).unwrap_or(at))
    }

    /// Parse an export timestamp: RFC 3339 (`2023-01-05T12:34:56.789Z`) or a naive
    /// `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]`. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::new(dt.naive_utc()));
        }
        const FORMATS: [&str; 4] = [
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
        ];
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(Self::new)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Midnight of the same calendar day.
    pub fn start_of_day(&self) -> Self {
        Timestamp(self.0.date().and_time(chrono::NaiveTime::MIN))
    }

    pub fn minus_minutes(&self, minutes: i64) -> Self {
        Timestamp(self.0 - Duration::minutes(minutes))
    }

    pub fn plus_minutes(&self, minutes: i64) -> Self {
        Timestamp(self.0 + Duration::minutes(minutes))
    }

    pub fn to_ledger_string(&self) -> String {
        self.0.format(LEDGER_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ledger_string())
    }
}

/// Currency or asset symbol (e.g., "USDC", "BTC").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Currency(pub String);

impl Currency {
    pub fn new(symbol: impl Into<String>) -> Self {
        Currency(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tradable instrument identifier, e.g. `BTC-USDC`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pair(pub String);

const PAIR_SEPARATORS: [char; 3] = ['-', '/', '_'];

impl Pair {
    pub fn new(id: impl Into<String>) -> Self {
        Pair(id.into())
    }

    /// Map an exchange market onto a pair quoted in `quote`.
    ///
    /// A market whose quote leg is a prefix of `quote` (`BTC-USD` with quote `USDC`) is
    /// rewritten to `BTC-USDC`; anything else is kept verbatim.
    pub fn from_market(market: &str, quote: &Currency) -> Self {
        let market = market.trim();
        if market.ends_with(quote.as_str()) {
            return Pair::new(market);
        }
        match market.rsplit_once(PAIR_SEPARATORS) {
            Some((base, leg)) if !leg.is_empty() && quote.as_str().starts_with(leg) => {
                let sep = &market[base.len()..base.len() + 1];
                Pair::new(format!("{}{}{}", base, sep, quote))
            }
            _ => Pair::new(market),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base-asset symbol: the pair with the quote suffix and its separator stripped.
    ///
    /// Pairs not quoted in `quote` fall back to the leg before the first separator.
    pub fn base_asset(&self, quote: &Currency) -> Currency {
        if let Some(base) = self.0.strip_suffix(quote.as_str()) {
            let base = base.trim_end_matches(PAIR_SEPARATORS);
            if !base.is_empty() {
                return Currency::new(base);
            }
        }
        let base = self
            .0
            .split(PAIR_SEPARATORS)
            .next()
            .unwrap_or(self.0.as_str());
        Currency::new(base)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade side: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse a side label case-insensitively (`buy`, `BUY`, `Buy`).
    pub fn parse(label: &str) -> Option<Side> {
        match label.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
