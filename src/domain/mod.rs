//! Domain types and determinism layer for the margin ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: Timestamp, Pair, Currency, Side
//! - Raw and normalized trades, loan summaries and loan events
//! - Transfer and funding activity rows
//! - Stable chronological ordering of a pair's trades

pub mod activity;
pub mod decimal;
pub mod loan;
pub mod ordering;
pub mod primitives;
pub mod trade;

pub use activity::{
    DepositSwap, FundingEntry, FundingLabel, RawFunding, RawTransfer, Transfer,
};
pub use decimal::Decimal;
pub use loan::{LoanEvent, LoanKind, LoanLabel, LoanStatus, LoanSummary};
pub use ordering::{sort_chronological, TradeOrderingKey};
pub use primitives::{Currency, Pair, Side, Timestamp, LEDGER_DATE_FORMAT};
pub use trade::{RawTrade, Trade};
