use crate::domain::decimal::FUNDING_SCALE;
use crate::domain::{Currency, Decimal, FundingEntry, FundingLabel, RawFunding, Timestamp};
use crate::engine::DataIssue;
use std::collections::BTreeMap;
use tracing::warn;

/// Net funding per calendar day, ascending by day.
///
/// Payments are summed per UTC day and rounded to ten decimals before labelling.
/// Payments that are not numeric, or carry no usable date, are excluded.
pub fn compile_funding(raw: &[RawFunding], quote: &Currency) -> (Vec<FundingEntry>, Vec<DataIssue>) {
    let mut issues = Vec::new();
    let mut per_day: BTreeMap<Timestamp, Decimal> = BTreeMap::new();

    for row in raw {
        let Some(effective_at) = row.effective_at else {
            warn!("Funding payment without a usable date, excluded");
            issues.push(DataIssue::UnparsableTimestamp {
                context: "funding".to_string(),
            });
            continue;
        };
        let Some(payment) = row.payment else {
            warn!(date = %effective_at, "Funding payment is not numeric, excluded");
            issues.push(DataIssue::NumericCoercionFailure {
                context: "funding".to_string(),
                field: "payment".to_string(),
            });
            continue;
        };
        let day = per_day.entry(effective_at.start_of_day()).or_default();
        let Some(sum) = day.checked_add(payment) else {
            warn!(date = %effective_at, "Funding sum overflows, payment excluded");
            issues.push(DataIssue::NumericCoercionFailure {
                context: "funding".to_string(),
                field: "payment".to_string(),
            });
            continue;
        };
        *day = sum;
    }

    let entries = per_day
        .into_iter()
        .map(|(date, sum)| {
            let amount = sum.round_dp(FUNDING_SCALE);
            FundingEntry {
                date,
                amount,
                label: FundingLabel::for_amount(amount),
                currency: quote.clone(),
            }
        })
        .collect();

    (entries, issues)
}
