//! Stable chronological ordering for deterministic processing.

use crate::domain::{Timestamp, Trade};

/// Stable ordering key for trades of one pair.
///
/// Ordering: timestamp -> position in the chronologically reversed export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TradeOrderingKey {
    pub timestamp: Timestamp,
    pub seq: usize,
}

/// Put an export-ordered (newest first) sequence into ascending chronological order.
///
/// The export is reversed first so trades sharing a timestamp keep their true relative
/// order; the sort then only moves rows that were out of place in the export.
pub fn sort_chronological(trades: Vec<Trade>) -> Vec<Trade> {
    let mut keyed: Vec<(TradeOrderingKey, Trade)> = trades
        .into_iter()
        .rev()
        .enumerate()
        .map(|(seq, trade)| {
            (
                TradeOrderingKey {
                    timestamp: trade.timestamp,
                    seq,
                },
                trade,
            )
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, trade)| trade).collect()
}
