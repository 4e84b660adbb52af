//! Tabular row shapes for every output file.
//!
//! Each row type carries its header list so that empty tables can still be written
//! with a header line.

use crate::domain::{DepositSwap, FundingEntry, LoanEvent, LoanSummary, Trade, Transfer};
use crate::engine::BlockElement;
use serde::Serialize;

pub trait TableRow: Serialize {
    const HEADERS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRow {
    pub koinly_date: String,
    pub pair: String,
    pub side: &'static str,
    pub amount: String,
    pub price: String,
    pub total: String,
    pub fee_amount: String,
    pub fee_currency: String,
}

impl TableRow for TradeRow {
    const HEADERS: &'static [&'static str] = &[
        "Koinly Date",
        "Pair",
        "Side",
        "Amount",
        "Price",
        "Total",
        "Fee Amount",
        "Fee Currency",
    ];
}

impl From<&Trade> for TradeRow {
    fn from(t: &Trade) -> Self {
        Self {
            koinly_date: t.timestamp.to_ledger_string(),
            pair: t.pair.to_string(),
            side: t.side.as_str(),
            amount: t.amount.to_string(),
            price: t.price.to_string(),
            total: t.total.to_string(),
            fee_amount: t.fee_amount.to_string(),
            fee_currency: t.fee_currency.to_string(),
        }
    }
}

/// A segmented trade row; boundary markers leave every column but `block` empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentedRow {
    pub koinly_date: Option<String>,
    pub pair: Option<String>,
    pub side: Option<&'static str>,
    pub amount: Option<String>,
    pub price: Option<String>,
    pub total: Option<String>,
    pub fee_amount: Option<String>,
    pub fee_currency: Option<String>,
    pub running_sum: Option<String>,
    pub block: u32,
}

impl TableRow for SegmentedRow {
    const HEADERS: &'static [&'static str] = &[
        "Koinly Date",
        "Pair",
        "Side",
        "Amount",
        "Price",
        "Total",
        "Fee Amount",
        "Fee Currency",
        "Running Sum",
        "Block",
    ];
}

impl From<&BlockElement> for SegmentedRow {
    fn from(element: &BlockElement) -> Self {
        match element {
            BlockElement::Trade(seg) => {
                let row = TradeRow::from(&seg.trade);
                Self {
                    koinly_date: Some(row.koinly_date),
                    pair: Some(row.pair),
                    side: Some(row.side),
                    amount: Some(row.amount),
                    price: Some(row.price),
                    total: Some(row.total),
                    fee_amount: Some(row.fee_amount),
                    fee_currency: Some(row.fee_currency),
                    running_sum: Some(seg.running_balance.to_string()),
                    block: seg.block_id,
                }
            }
            BlockElement::Marker { block_id } => Self {
                koinly_date: None,
                pair: None,
                side: None,
                amount: None,
                price: None,
                total: None,
                fee_amount: None,
                fee_currency: None,
                running_sum: None,
                block: *block_id,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanSummaryRow {
    pub block: u32,
    pub start_date: String,
    pub end_date: String,
    pub currency: String,
    pub amount: String,
    pub status: &'static str,
}

impl TableRow for LoanSummaryRow {
    const HEADERS: &'static [&'static str] =
        &["Block", "Start Date", "End Date", "Currency", "Amount", "Status"];
}

impl From<&LoanSummary> for LoanSummaryRow {
    fn from(s: &LoanSummary) -> Self {
        Self {
            block: s.block_id,
            start_date: s.start_time.to_ledger_string(),
            end_date: s.end_time.to_ledger_string(),
            currency: s.currency.to_string(),
            amount: s.amount.to_string(),
            status: s.status.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanEventRow {
    pub date: String,
    pub received_amount: Option<String>,
    pub received_currency: Option<String>,
    pub sent_amount: Option<String>,
    pub sent_currency: Option<String>,
    pub label: &'static str,
}

impl TableRow for LoanEventRow {
    const HEADERS: &'static [&'static str] = &[
        "Date",
        "Received Amount",
        "Received Currency",
        "Sent Amount",
        "Sent Currency",
        "Label",
    ];
}

impl From<&LoanEvent> for LoanEventRow {
    fn from(e: &LoanEvent) -> Self {
        Self {
            date: e.date.to_ledger_string(),
            received_amount: e.received_amount.map(|d| d.to_string()),
            received_currency: e.received_currency.as_ref().map(ToString::to_string),
            sent_amount: e.sent_amount.map(|d| d.to_string()),
            sent_currency: e.sent_currency.as_ref().map(ToString::to_string),
            label: e.label.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRow {
    pub koinly_date: String,
    pub amount: String,
    pub currency: String,
    pub tx_hash: Option<String>,
}

impl TableRow for TransferRow {
    const HEADERS: &'static [&'static str] = &["Koinly Date", "Amount", "Currency", "TxHash"];
}

impl From<&Transfer> for TransferRow {
    fn from(t: &Transfer) -> Self {
        Self {
            koinly_date: t.date.to_ledger_string(),
            amount: t.amount.to_string(),
            currency: t.currency.to_string(),
            tx_hash: t.tx_hash.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositSwapRow {
    pub date: String,
    pub sent_amount: Option<String>,
    pub sent_currency: String,
    pub received_amount: Option<String>,
    pub received_currency: Option<String>,
    pub tx_hash: Option<String>,
    pub fee_amount: Option<String>,
    pub fee_currency: String,
    pub label: &'static str,
    pub description: &'static str,
}

impl TableRow for DepositSwapRow {
    const HEADERS: &'static [&'static str] = &[
        "Date",
        "Sent Amount",
        "Sent Currency",
        "Received Amount",
        "Received Currency",
        "TxHash",
        "Fee Amount",
        "Fee Currency",
        "Label",
        "Description",
    ];
}

impl From<&DepositSwap> for DepositSwapRow {
    fn from(s: &DepositSwap) -> Self {
        Self {
            date: s.date.to_ledger_string(),
            sent_amount: s.sent_amount.map(|d| d.to_string()),
            sent_currency: s.sent_currency.to_string(),
            received_amount: s.received_amount.map(|d| d.to_string()),
            received_currency: s.received_currency.as_ref().map(ToString::to_string),
            tx_hash: s.tx_hash.clone(),
            fee_amount: None,
            fee_currency: s.fee_currency.to_string(),
            label: DepositSwap::LABEL,
            description: DepositSwap::DESCRIPTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingRow {
    pub koinly_date: String,
    pub amount: String,
    pub label: &'static str,
    pub currency: String,
    pub description: &'static str,
}

impl TableRow for FundingRow {
    const HEADERS: &'static [&'static str] =
        &["Koinly Date", "Amount", "Label", "Currency", "Description"];
}

impl From<&FundingEntry> for FundingRow {
    fn from(f: &FundingEntry) -> Self {
        Self {
            koinly_date: f.date.to_ledger_string(),
            amount: f.amount.to_string(),
            label: f.label.as_str(),
            currency: f.currency.to_string(),
            description: FundingEntry::DESCRIPTION,
        }
    }
}
