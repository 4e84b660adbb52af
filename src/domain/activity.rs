//! Non-trade account activity: transfers and funding payments.

use crate::domain::{Currency, Decimal, Timestamp};
use serde::{Deserialize, Serialize};

/// A transfer row from the export, unparsable cells coerced to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransfer {
    pub created_at: Option<Timestamp>,
    pub transfer_type: String,
    pub debit_asset: Currency,
    pub debit_amount: Option<Decimal>,
    pub credit_asset: Option<Currency>,
    pub credit_amount: Option<Decimal>,
    pub tx_hash: Option<String>,
}

/// Transfer types that move funds out of the account.
pub const WITHDRAWAL_TYPES: [&str; 2] = ["WITHDRAWAL", "FAST_WITHDRAWAL"];

impl RawTransfer {
    pub fn is_withdrawal(&self) -> bool {
        let kind = self.transfer_type.trim();
        WITHDRAWAL_TYPES
            .iter()
            .any(|w| w.eq_ignore_ascii_case(kind))
    }
}

/// A signed transfer ledger row (negative for withdrawals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub date: Timestamp,
    pub amount: Decimal,
    pub currency: Currency,
    pub tx_hash: Option<String>,
}

/// A deposit that was auto-swapped into the quote currency on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSwap {
    pub date: Timestamp,
    pub sent_amount: Option<Decimal>,
    pub sent_currency: Currency,
    pub received_amount: Option<Decimal>,
    pub received_currency: Option<Currency>,
    pub tx_hash: Option<String>,
    pub fee_currency: Currency,
}

impl DepositSwap {
    pub const LABEL: &'static str = "Swap";
    pub const DESCRIPTION: &'static str = "Auto Deposit";
}

/// A single funding payment as exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFunding {
    pub effective_at: Option<Timestamp>,
    pub payment: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingLabel {
    #[serde(rename = "Margin Fee")]
    MarginFee,
    #[serde(rename = "Interest Earned")]
    InterestEarned,
}

impl FundingLabel {
    /// Negative net funding is a fee; zero or positive is income.
    pub fn for_amount(amount: Decimal) -> Self {
        if amount.is_negative() {
            FundingLabel::MarginFee
        } else {
            FundingLabel::InterestEarned
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FundingLabel::MarginFee => "Margin Fee",
            FundingLabel::InterestEarned => "Interest Earned",
        }
    }
}

/// Net funding for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingEntry {
    pub date: Timestamp,
    pub amount: Decimal,
    pub label: FundingLabel,
    pub currency: Currency,
}

impl FundingEntry {
    pub const DESCRIPTION: &'static str = "Funding";
}
