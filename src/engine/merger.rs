//! Cross-pair union of loan events into the two global ledgers.

use crate::domain::{LoanEvent, LoanKind};
use serde::Serialize;

/// The two time-ordered loan ledgers of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledgers {
    /// Loans denominated in the quote currency (buy-opened blocks).
    pub quote_loans: Vec<LoanEvent>,
    /// Loans denominated in a base asset (sell-opened blocks).
    pub asset_loans: Vec<LoanEvent>,
}

/// Partitions events by loan kind and orders each ledger by date.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoanMerger;

impl LoanMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge per-pair event lists, given in pair order.
    ///
    /// The sort is stable, so events sharing a date keep pair order and then
    /// open-before-close order. Both ledgers are returned even when empty.
    pub fn merge<'a, I>(&self, per_pair: I) -> Ledgers
    where
        I: IntoIterator<Item = &'a [LoanEvent]>,
    {
        let (mut quote_loans, mut asset_loans): (Vec<LoanEvent>, Vec<LoanEvent>) = per_pair
            .into_iter()
            .flatten()
            .cloned()
            .partition(|event| event.kind == LoanKind::Quote);

        quote_loans.sort_by_key(|event| event.date);
        asset_loans.sort_by_key(|event| event.date);

        Ledgers {
            quote_loans,
            asset_loans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, Decimal, LoanLabel, Timestamp};

    fn at(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn amt(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_partitions_by_kind_and_sorts_across_pairs() {
        let btc = vec![
            LoanEvent::received(
                LoanKind::Quote,
                at("2023-01-02 00:00:00"),
                amt("100"),
                Currency::new("USDC"),
            ),
            LoanEvent::sent(
                LoanKind::Quote,
                at("2023-01-04 00:00:00"),
                amt("100"),
                Currency::new("USDC"),
            ),
        ];
        let eth = vec![
            LoanEvent::received(
                LoanKind::Quote,
                at("2023-01-01 00:00:00"),
                amt("50"),
                Currency::new("USDC"),
            ),
            LoanEvent::sent(
                LoanKind::Quote,
                at("2023-01-03 00:00:00"),
                amt("50"),
                Currency::new("USDC"),
            ),
            LoanEvent::received(
                LoanKind::Asset,
                at("2023-01-05 00:00:00"),
                amt("2"),
                Currency::new("ETH"),
            ),
        ];

        let ledgers = LoanMerger::new().merge([btc.as_slice(), eth.as_slice()]);

        let dates: Vec<String> = ledgers
            .quote_loans
            .iter()
            .map(|e| e.date.to_ledger_string())
            .collect();
        assert_eq!(
            dates,
            vec![
                "2023-01-01 00:00:00",
                "2023-01-02 00:00:00",
                "2023-01-03 00:00:00",
                "2023-01-04 00:00:00"
            ]
        );
        assert_eq!(ledgers.asset_loans.len(), 1);
        assert_eq!(ledgers.asset_loans[0].currency().unwrap().as_str(), "ETH");
    }

    #[test]
    fn test_ties_keep_pair_then_open_close_order() {
        let t = at("2023-01-01 00:00:00");
        let first = vec![
            LoanEvent::received(LoanKind::Quote, t, amt("1"), Currency::new("USDC")),
            LoanEvent::sent(LoanKind::Quote, t, amt("1"), Currency::new("USDC")),
        ];
        let second = vec![LoanEvent::received(LoanKind::Quote, t, amt("2"), Currency::new("USDC"))];

        let ledgers = LoanMerger::new().merge([first.as_slice(), second.as_slice()]);

        let seq: Vec<(LoanLabel, String)> = ledgers
            .quote_loans
            .iter()
            .map(|e| (e.label, e.amount().unwrap().to_string()))
            .collect();
        assert_eq!(
            seq,
            vec![
                (LoanLabel::MarginLoan, "1".to_string()),
                (LoanLabel::MarginRepayment, "1".to_string()),
                (LoanLabel::MarginLoan, "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_sell_side_loan_in_quote_symbol_goes_to_asset_ledger() {
        // A USDC-EUR short borrows USDC as the base asset.
        let short = vec![
            LoanEvent::received(
                LoanKind::Asset,
                at("2023-01-01 00:00:00"),
                amt("10"),
                Currency::new("USDC"),
            ),
            LoanEvent::sent(
                LoanKind::Asset,
                at("2023-01-02 00:00:00"),
                amt("10"),
                Currency::new("USDC"),
            ),
        ];
        let ledgers = LoanMerger::new().merge([short.as_slice()]);
        assert!(ledgers.quote_loans.is_empty());
        assert_eq!(ledgers.asset_loans.len(), 2);
    }

    #[test]
    fn test_empty_input_yields_empty_ledgers() {
        let ledgers = LoanMerger::new().merge(Vec::<&[LoanEvent]>::new());
        assert!(ledgers.quote_loans.is_empty());
        assert!(ledgers.asset_loans.is_empty());
    }
}
