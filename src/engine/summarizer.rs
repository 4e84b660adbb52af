//! Per-block loan classification and principal extraction.

use crate::domain::{Currency, Decimal, LoanStatus, LoanSummary, Side, Trade};
use tracing::warn;

use super::segmenter::{Block, Segmentation};
use super::{DataIssue, PairError};

/// Column summed within a block to measure what is owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatingColumn {
    /// Quote-currency notional; a buy is financed by borrowing quote currency.
    Total,
    /// Base-asset quantity; a sell is financed by borrowing the asset.
    Amount,
}

impl AccumulatingColumn {
    pub fn for_side(side: Side) -> Self {
        match side {
            Side::Buy => AccumulatingColumn::Total,
            Side::Sell => AccumulatingColumn::Amount,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccumulatingColumn::Total => "total",
            AccumulatingColumn::Amount => "amount",
        }
    }

    pub fn value(&self, trade: &Trade) -> Decimal {
        match self {
            AccumulatingColumn::Total => trade.total,
            AccumulatingColumn::Amount => trade.amount,
        }
    }
}

/// Summarize one block into a loan, or `None` for a block without trades.
///
/// The principal is the peak of the block-local running sum of the accumulating column:
/// the maximum for buy-opened blocks, the minimum (most negative) for sell-opened ones,
/// reported as an absolute value. Fails when that running sum overflows.
pub fn summarize_block(block: &Block<'_>, quote: &Currency) -> Result<Option<LoanSummary>, PairError> {
    let (Some(side), Some(start_time), Some(end_time)) =
        (block.side(), block.start_time(), block.end_time())
    else {
        return Ok(None);
    };

    let column = AccumulatingColumn::for_side(side);
    let mut sum = Decimal::zero();
    let mut extremum: Option<Decimal> = None;
    for t in &block.trades {
        sum = sum
            .checked_add(column.value(&t.trade))
            .ok_or_else(|| PairError::Overflow {
                pair: block.pair.clone(),
                column: column.name().to_string(),
            })?;
        extremum = Some(match (extremum, side) {
            (None, _) => sum,
            (Some(peak), Side::Buy) => peak.max(sum),
            (Some(trough), Side::Sell) => trough.min(sum),
        });
    }
    let Some(extremum) = extremum else {
        return Ok(None);
    };

    let currency = match side {
        Side::Buy => quote.clone(),
        Side::Sell => block.pair.base_asset(quote),
    };
    let status = if block.closed {
        LoanStatus::Closed
    } else {
        LoanStatus::Open
    };

    Ok(Some(LoanSummary {
        pair: block.pair.clone(),
        block_id: block.block_id,
        side,
        start_time,
        end_time,
        amount: extremum.abs(),
        currency,
        status,
    }))
}

/// Summarize every block of a pair.
///
/// Empty blocks are skipped and an open final block is kept as an open loan; both are
/// logged and returned as issues.
pub fn summarize(
    segmentation: &Segmentation,
    quote: &Currency,
) -> Result<(Vec<LoanSummary>, Vec<DataIssue>), PairError> {
    let mut summaries = Vec::new();
    let mut issues = Vec::new();

    for block in segmentation.blocks() {
        match summarize_block(&block, quote)? {
            Some(summary) => {
                if summary.is_open() {
                    warn!(
                        pair = %summary.pair,
                        block_id = summary.block_id,
                        amount = %summary.amount,
                        currency = %summary.currency,
                        "Block never returns to zero, reporting open loan"
                    );
                    issues.push(DataIssue::UnterminatedBlock {
                        pair: summary.pair.clone(),
                        block_id: summary.block_id,
                    });
                }
                summaries.push(summary);
            }
            None => {
                warn!(pair = %block.pair, block_id = block.block_id, "Skipping empty block");
                issues.push(DataIssue::EmptyBlock {
                    pair: block.pair.clone(),
                    block_id: block.block_id,
                });
            }
        }
    }

    Ok((summaries, issues))
}
