//! Inferred margin loans and the ledger events they expand into.

use crate::domain::{Currency, Decimal, Pair, Side, Timestamp};
use serde::{Deserialize, Serialize};

/// Which currency role financed a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanKind {
    /// A buy-opened block, financed by borrowing the quote currency.
    Quote,
    /// A sell-opened block, financed by borrowing the base asset.
    Asset,
}

impl From<Side> for LoanKind {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => LoanKind::Quote,
            Side::Sell => LoanKind::Asset,
        }
    }
}

/// Whether the block's running balance returned to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Closed,
    Open,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Closed => "Closed",
            LoanStatus::Open => "Open",
        }
    }
}

/// One loan per block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub pair: Pair,
    pub block_id: u32,
    /// Side of the block's opening trade.
    pub side: Side,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Peak principal owed; never negative.
    pub amount: Decimal,
    pub currency: Currency,
    pub status: LoanStatus,
}

impl LoanSummary {
    pub fn kind(&self) -> LoanKind {
        LoanKind::from(self.side)
    }

    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanLabel {
    #[serde(rename = "Margin Loan")]
    MarginLoan,
    #[serde(rename = "Margin Repayment")]
    MarginRepayment,
}

impl LoanLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanLabel::MarginLoan => "Margin Loan",
            LoanLabel::MarginRepayment => "Margin Repayment",
        }
    }
}

impl std::fmt::Display for LoanLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger-ready loan row. Exactly one of the received/sent sides is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanEvent {
    /// Ledger the event belongs to; not part of the ledger columns.
    pub kind: LoanKind,
    pub date: Timestamp,
    pub received_amount: Option<Decimal>,
    pub received_currency: Option<Currency>,
    pub sent_amount: Option<Decimal>,
    pub sent_currency: Option<Currency>,
    pub label: LoanLabel,
    /// Pair and block the event was derived from; not part of the ledger columns.
    #[serde(skip)]
    pub origin: Option<(Pair, u32)>,
}

impl LoanEvent {
    pub fn received(kind: LoanKind, date: Timestamp, amount: Decimal, currency: Currency) -> Self {
        Self {
            kind,
            date,
            received_amount: Some(amount),
            received_currency: Some(currency),
            sent_amount: None,
            sent_currency: None,
            label: LoanLabel::MarginLoan,
            origin: None,
        }
    }

    pub fn sent(kind: LoanKind, date: Timestamp, amount: Decimal, currency: Currency) -> Self {
        Self {
            kind,
            date,
            received_amount: None,
            received_currency: None,
            sent_amount: Some(amount),
            sent_currency: Some(currency),
            label: LoanLabel::MarginRepayment,
            origin: None,
        }
    }

    pub fn with_origin(mut self, pair: Pair, block_id: u32) -> Self {
        self.origin = Some((pair, block_id));
        self
    }

    /// Principal carried by the event, whichever side it sits on.
    pub fn amount(&self) -> Option<Decimal> {
        self.received_amount.or(self.sent_amount)
    }

    pub fn currency(&self) -> Option<&Currency> {
        self.received_currency
            .as_ref()
            .or(self.sent_currency.as_ref())
    }
}
