//! Per-pair loan pipelines and the join barrier in front of the merger.

use crate::domain::{Currency, LoanEvent, LoanKind, LoanSummary, Pair};
use crate::report::RunReport;
use tracing::{debug, info, warn};

use super::formatter::format_loans;
use super::merger::{Ledgers, LoanMerger};
use super::normalizer::{NormalizedTrades, PairTrades};
use super::segmenter::{segment, Segmentation};
use super::summarizer::summarize;
use super::{DataIssue, EngineError, PairError};

/// Everything derived for one pair. Owned by the run, never shared between pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairPipelineResult {
    pub pair: Pair,
    pub segmentation: Segmentation,
    pub summaries: Vec<LoanSummary>,
    pub events: Vec<LoanEvent>,
    pub issues: Vec<DataIssue>,
}

impl PairPipelineResult {
    pub fn summaries_for(&self, kind: LoanKind) -> impl Iterator<Item = &LoanSummary> {
        self.summaries.iter().filter(move |s| s.kind() == kind)
    }
}

/// Result of a full engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Processed pairs in export order.
    pub pairs: Vec<PairPipelineResult>,
    pub ledgers: Ledgers,
    pub report: RunReport,
}

impl PipelineOutput {
    pub fn pair(&self, pair: &Pair) -> Option<&PairPipelineResult> {
        self.pairs.iter().find(|p| &p.pair == pair)
    }
}

/// Segment, summarize and format one pair.
pub fn run_pair(pair_trades: PairTrades, quote: &Currency) -> Result<PairPipelineResult, PairError> {
    let PairTrades { pair, trades } = pair_trades;
    let segmentation = segment(&pair, &trades)?;
    let (summaries, issues) = summarize(&segmentation, quote)?;
    let events = format_loans(&summaries);

    debug!(
        pair = %pair,
        trades = trades.len(),
        blocks = summaries.len(),
        events = events.len(),
        "Pair pipeline complete"
    );

    Ok(PairPipelineResult {
        pair,
        segmentation,
        summaries,
        events,
        issues,
    })
}

/// Drives the engine over a normalized export.
#[derive(Debug, Clone)]
pub struct LoanPipeline {
    quote: Currency,
}

impl LoanPipeline {
    pub fn new(quote: Currency) -> Self {
        Self { quote }
    }

    pub fn quote(&self) -> &Currency {
        &self.quote
    }

    /// Run every pair on the blocking pool, then merge once all have finished.
    pub async fn run(&self, normalized: NormalizedTrades) -> Result<PipelineOutput, EngineError> {
        ensure_trades(&normalized)?;
        let NormalizedTrades {
            pairs,
            mut rejected,
            issues,
            ..
        } = normalized;

        let handles = pairs.into_iter().map(|pair_trades| {
            let quote = self.quote.clone();
            tokio::task::spawn_blocking(move || run_pair(pair_trades, &quote))
        });
        let results = futures::future::join_all(handles)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EngineError::Join(e.to_string()))?;
        let results = split_failed(results, &mut rejected);

        Ok(self.assemble(results, rejected, issues))
    }

    /// Same as [`LoanPipeline::run`] without leaving the current thread.
    pub fn run_sequential(&self, normalized: NormalizedTrades) -> Result<PipelineOutput, EngineError> {
        ensure_trades(&normalized)?;
        let NormalizedTrades {
            pairs,
            mut rejected,
            issues,
            ..
        } = normalized;

        let results = pairs
            .into_iter()
            .map(|pair_trades| run_pair(pair_trades, &self.quote))
            .collect::<Vec<_>>();
        let results = split_failed(results, &mut rejected);

        Ok(self.assemble(results, rejected, issues))
    }

    fn assemble(
        &self,
        pairs: Vec<PairPipelineResult>,
        rejected: Vec<PairError>,
        mut issues: Vec<DataIssue>,
    ) -> PipelineOutput {
        let ledgers = LoanMerger::new()
            .merge(pairs.iter().map(|p| p.events.as_slice()));

        issues.extend(pairs.iter().flat_map(|p| p.issues.iter().cloned()));
        let open_loans = pairs
            .iter()
            .flat_map(|p| p.summaries.iter().filter(|s| s.is_open()).cloned())
            .collect();

        let report = RunReport {
            pairs_processed: pairs.iter().map(|p| p.pair.clone()).collect(),
            skipped_pairs: rejected,
            issues,
            open_loans,
            quote_loan_events: ledgers.quote_loans.len(),
            asset_loan_events: ledgers.asset_loans.len(),
        };

        info!(
            pairs = report.pairs_processed.len(),
            skipped = report.skipped_pairs.len(),
            quote_loan_events = report.quote_loan_events,
            asset_loan_events = report.asset_loan_events,
            "Loan ledgers merged"
        );

        PipelineOutput {
            pairs,
            ledgers,
            report,
        }
    }
}

/// Keep successful pairs in order and move failed ones to `rejected`.
fn split_failed(
    results: Vec<Result<PairPipelineResult, PairError>>,
    rejected: &mut Vec<PairError>,
) -> Vec<PairPipelineResult> {
    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(pair) => Some(pair),
            Err(err) => {
                warn!(error = %err, "Excluding pair from the run");
                rejected.push(err);
                None
            }
        })
        .collect()
}

fn ensure_trades(normalized: &NormalizedTrades) -> Result<(), EngineError> {
    if normalized.trade_count() == 0 {
        return Err(EngineError::NoTrades {
            skipped: normalized.rejected.len(),
        });
    }
    Ok(())
}
