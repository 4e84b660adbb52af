use crate::domain::{sort_chronological, Pair, RawTrade, Side, Trade};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{DataIssue, PairError};

/// One pair's trades in ascending chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTrades {
    pub pair: Pair,
    pub trades: Vec<Trade>,
}

/// Output of the normalizer for one export session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTrades {
    /// Processable pairs, in order of first appearance in the export.
    pub pairs: Vec<PairTrades>,
    /// Pairs excluded from the run.
    pub rejected: Vec<PairError>,
    pub issues: Vec<DataIssue>,
    /// Every normalized trade of the processable pairs, in export order.
    pub table: Vec<Trade>,
}

impl NormalizedTrades {
    pub fn trade_count(&self) -> usize {
        self.pairs.iter().map(|p| p.trades.len()).sum()
    }
}

enum PairSlot {
    Accepted(Vec<Trade>),
    Rejected(PairError),
}

/// Convert export rows into canonical signed trades, partitioned per pair.
///
/// A pair with any unrecognised side label is rejected as a whole, along with any
/// issues already raised for it. Rows with an unparsable number or timestamp, or whose
/// notional overflows, are dropped with a warning so they never reach a running balance.
pub fn normalize_trades(raw: Vec<RawTrade>) -> NormalizedTrades {
    let mut order: Vec<Pair> = Vec::new();
    let mut slots: HashMap<Pair, PairSlot> = HashMap::new();
    let mut issues: Vec<(Pair, DataIssue)> = Vec::new();
    let mut table = Vec::new();

    for row in raw {
        let slot = slots.entry(row.pair.clone()).or_insert_with(|| {
            order.push(row.pair.clone());
            PairSlot::Accepted(Vec::new())
        });
        if matches!(slot, PairSlot::Rejected(_)) {
            continue;
        }

        let Some(side) = Side::parse(&row.side) else {
            warn!(pair = %row.pair, side = %row.side, "Malformed side, excluding pair");
            *slot = PairSlot::Rejected(PairError::MalformedSide {
                pair: row.pair.clone(),
                value: row.side.clone(),
            });
            continue;
        };

        let fields = [
            ("amount", row.amount),
            ("price", row.price),
            ("fee_amount", row.fee_amount),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, value)| value.is_none()) {
            warn!(pair = %row.pair, field = %field, "Unparsable numeric field, excluding trade");
            issues.push((
                row.pair.clone(),
                DataIssue::NumericCoercionFailure {
                    context: format!("pair {}", row.pair),
                    field: field.to_string(),
                },
            ));
            continue;
        }
        let Some(timestamp) = row.timestamp else {
            warn!(pair = %row.pair, "Unparsable timestamp, excluding trade");
            issues.push((
                row.pair.clone(),
                DataIssue::UnparsableTimestamp {
                    context: format!("pair {}", row.pair),
                },
            ));
            continue;
        };
        let (Some(amount), Some(price), Some(fee_amount)) = (row.amount, row.price, row.fee_amount)
        else {
            continue;
        };

        let Some(trade) = Trade::from_unsigned(
            row.pair.clone(),
            side,
            amount,
            price,
            fee_amount,
            row.fee_currency,
            timestamp,
        ) else {
            warn!(pair = %row.pair, %amount, %price, "Trade total overflows, excluding trade");
            issues.push((
                row.pair.clone(),
                DataIssue::NumericCoercionFailure {
                    context: format!("pair {}", row.pair),
                    field: "total".to_string(),
                },
            ));
            continue;
        };
        if let PairSlot::Accepted(trades) = slot {
            trades.push(trade.clone());
        }
        table.push(trade);
    }

    let mut pairs = Vec::new();
    let mut rejected = Vec::new();
    for pair in order {
        match slots.remove(&pair) {
            Some(PairSlot::Accepted(trades)) if !trades.is_empty() => {
                debug!(pair = %pair, trades = trades.len(), "Normalized pair");
                pairs.push(PairTrades {
                    pair,
                    trades: sort_chronological(trades),
                });
            }
            Some(PairSlot::Rejected(err)) => rejected.push(err),
            _ => debug!(pair = %pair, "Pair has no usable trades"),
        }
    }

    let rejected_pairs: Vec<&Pair> = rejected.iter().map(PairError::pair).collect();
    table.retain(|t| !rejected_pairs.contains(&&t.pair));
    let issues = issues
        .into_iter()
        .filter(|(pair, _)| !rejected_pairs.contains(&pair))
        .map(|(_, issue)| issue)
        .collect();

    NormalizedTrades {
        pairs,
        rejected,
        issues,
        table,
    }
}
