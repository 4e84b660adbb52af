use crate::domain::{LoanEvent, LoanSummary};

/// Minutes the synthetic loan events sit outside their block, so the loan sorts
/// strictly before the block's first trade and the repayment strictly after its last.
pub const LOAN_EVENT_OFFSET_MINUTES: i64 = 1;

/// Expand a loan into its ledger events: a "Margin Loan" received one minute before the
/// block opens and, for closed loans only, a "Margin Repayment" sent one minute after it
/// closes.
pub fn format_loan(summary: &LoanSummary) -> Vec<LoanEvent> {
    let open = LoanEvent::received(
        summary.kind(),
        summary.start_time.minus_minutes(LOAN_EVENT_OFFSET_MINUTES),
        summary.amount,
        summary.currency.clone(),
    )
    .with_origin(summary.pair.clone(), summary.block_id);

    if summary.is_open() {
        return vec![open];
    }

    let close = LoanEvent::sent(
        summary.kind(),
        summary.end_time.plus_minutes(LOAN_EVENT_OFFSET_MINUTES),
        summary.amount,
        summary.currency.clone(),
    )
    .with_origin(summary.pair.clone(), summary.block_id);

    vec![open, close]
}

/// Events for a pair's loans, each loan's open event before its close.
pub fn format_loans(summaries: &[LoanSummary]) -> Vec<LoanEvent> {
    summaries.iter().flat_map(format_loan).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, Decimal, LoanKind, LoanLabel, LoanStatus, Pair, Side, Timestamp};

    fn summary(status: LoanStatus) -> LoanSummary {
        LoanSummary {
            pair: Pair::new("BTC-USDC"),
            block_id: 3,
            side: Side::Buy,
            start_time: Timestamp::parse("2023-01-01 10:00:00").unwrap(),
            end_time: Timestamp::parse("2023-01-02 10:00:00").unwrap(),
            amount: Decimal::from_str_canonical("1000").unwrap(),
            currency: Currency::new("USDC"),
            status,
        }
    }

    #[test]
    fn test_closed_loan_yields_loan_and_repayment() {
        let events = format_loan(&summary(LoanStatus::Closed));
        assert_eq!(events.len(), 2);

        let open = &events[0];
        assert_eq!(open.label, LoanLabel::MarginLoan);
        assert_eq!(open.date.to_ledger_string(), "2023-01-01 09:59:00");
        assert_eq!(open.received_amount.unwrap().to_string(), "1000");
        assert_eq!(open.received_currency.as_ref().unwrap().as_str(), "USDC");
        assert!(open.sent_amount.is_none());

        let close = &events[1];
        assert_eq!(close.label, LoanLabel::MarginRepayment);
        assert_eq!(close.date.to_ledger_string(), "2023-01-02 10:01:00");
        assert_eq!(close.sent_amount.unwrap().to_string(), "1000");
        assert!(close.received_amount.is_none());
        assert_eq!(close.origin, Some((Pair::new("BTC-USDC"), 3)));
        assert_eq!(close.kind, LoanKind::Quote);
    }

    #[test]
    fn test_open_loan_has_no_repayment() {
        let events = format_loan(&summary(LoanStatus::Open));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, LoanLabel::MarginLoan);
    }
}
