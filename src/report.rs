//! Machine-readable summary of what a run skipped, warned about, and left open.

use crate::domain::{LoanSummary, Pair};
use crate::engine::{DataIssue, PairError};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub pairs_processed: Vec<Pair>,
    pub skipped_pairs: Vec<PairError>,
    pub issues: Vec<DataIssue>,
    /// Loans whose block never returned to zero; they have no repayment event.
    pub open_loans: Vec<LoanSummary>,
    pub quote_loan_events: usize,
    pub asset_loan_events: usize,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_pairs.is_empty() && self.issues.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Log the report: one info line, then a warning per skipped pair.
    pub fn log_summary(&self) {
        info!(
            pairs = self.pairs_processed.len(),
            skipped = self.skipped_pairs.len(),
            issues = self.issues.len(),
            open_loans = self.open_loans.len(),
            "Run complete"
        );
        for skipped in &self.skipped_pairs {
            warn!(pair = %skipped.pair(), reason = %skipped, "Pair skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_tags_skipped_pairs() {
        let report = RunReport {
            skipped_pairs: vec![PairError::MalformedSide {
                pair: Pair::new("ETH-USDC"),
                value: "hold".to_string(),
            }],
            ..Default::default()
        };
        assert!(!report.is_clean());

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["skipped_pairs"][0]["kind"], "malformed_side");
        assert_eq!(json["skipped_pairs"][0]["pair"], "ETH-USDC");
        assert_eq!(json["skipped_pairs"][0]["value"], "hold");
    }

    #[test]
    fn test_default_report_is_clean() {
        assert!(RunReport::default().is_clean());
    }
}
