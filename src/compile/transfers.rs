use crate::domain::{Currency, DepositSwap, RawTransfer, Transfer};
use crate::engine::DataIssue;
use tracing::warn;

/// Signed transfer rows sorted by date ascending.
///
/// Withdrawals are negated. Rows without a usable date or amount are excluded.
pub fn compile_transfers(raw: &[RawTransfer]) -> (Vec<Transfer>, Vec<DataIssue>) {
    let mut issues = Vec::new();
    let mut transfers: Vec<Transfer> = raw
        .iter()
        .filter_map(|row| {
            let Some(date) = row.created_at else {
                warn!(transfer_type = %row.transfer_type, "Transfer without a usable date, excluded");
                issues.push(DataIssue::UnparsableTimestamp {
                    context: "transfers".to_string(),
                });
                return None;
            };
            let Some(amount) = row.debit_amount else {
                warn!(date = %date, "Transfer amount is not numeric, excluded");
                issues.push(DataIssue::NumericCoercionFailure {
                    context: "transfers".to_string(),
                    field: "debitAmount".to_string(),
                });
                return None;
            };
            let amount = if row.is_withdrawal() {
                -amount.abs()
            } else {
                amount
            };
            Some(Transfer {
                date,
                amount,
                currency: row.debit_asset.clone(),
                tx_hash: row.tx_hash.clone(),
            })
        })
        .collect();

    transfers.sort_by_key(|t| t.date);
    (transfers, issues)
}

/// Deposits that arrived in a currency other than `quote` and were swapped into it.
///
/// Export order is kept.
pub fn compile_deposit_swaps(raw: &[RawTransfer], quote: &Currency) -> Vec<DepositSwap> {
    raw.iter()
        .filter(|row| &row.debit_asset != quote)
        .filter_map(|row| {
            let date = row.created_at?;
            Some(DepositSwap {
                date,
                sent_amount: row.debit_amount,
                sent_currency: row.debit_asset.clone(),
                received_amount: row.credit_amount,
                received_currency: row.credit_asset.clone(),
                tx_hash: row.tx_hash.clone(),
                fee_currency: quote.clone(),
            })
        })
        .collect()
}
