//! Trade records, before and after sign normalization.

use crate::domain::{Currency, Decimal, Pair, Side, Timestamp};
use serde::{Deserialize, Serialize};

/// A trade row as handed over by an export source.
///
/// Fields that could not be parsed are `None`; the side label is kept verbatim so the
/// normalizer can reject it per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTrade {
    pub pair: Pair,
    pub side: String,
    /// Unsigned base-asset quantity.
    pub amount: Option<Decimal>,
    pub price: Option<Decimal>,
    pub fee_amount: Option<Decimal>,
    pub fee_currency: Currency,
    pub timestamp: Option<Timestamp>,
}

impl RawTrade {
    /// Fully parsed raw trade, mostly useful for fixtures.
    pub fn new(
        pair: Pair,
        side: impl Into<String>,
        amount: Decimal,
        price: Decimal,
        fee_amount: Decimal,
        fee_currency: Currency,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            pair,
            side: side.into(),
            amount: Some(amount),
            price: Some(price),
            fee_amount: Some(fee_amount),
            fee_currency,
            timestamp: Some(timestamp),
        }
    }
}

/// A canonical, sign-normalized trade.
///
/// `amount` and `total` are negative for sells; `fee_amount` is never positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub pair: Pair,
    pub side: Side,
    pub amount: Decimal,
    pub price: Decimal,
    pub total: Decimal,
    pub fee_amount: Decimal,
    pub fee_currency: Currency,
    pub timestamp: Timestamp,
}

impl Trade {
    /// Build a normalized trade from unsigned export values.
    ///
    /// Size and price are taken as magnitudes. Returns `None` when the notional
    /// overflows the decimal range.
    pub fn from_unsigned(
        pair: Pair,
        side: Side,
        amount: Decimal,
        price: Decimal,
        fee_amount: Decimal,
        fee_currency: Currency,
        timestamp: Timestamp,
    ) -> Option<Self> {
        let amount = amount.abs();
        let price = price.abs();
        let total = amount.checked_mul(price)?;
        let (amount, total) = match side {
            Side::Buy => (amount, total),
            Side::Sell => (-amount, -total),
        };
        Some(Trade {
            pair,
            side,
            amount,
            price,
            total,
            fee_amount: fee_amount.as_outflow(),
            fee_currency,
            timestamp,
        })
    }
}
