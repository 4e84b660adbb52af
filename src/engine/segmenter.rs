//! Running-balance segmentation of one pair's trades into loan blocks.

use crate::domain::{Decimal, Pair, Side, Timestamp, Trade};

use super::PairError;

/// A trade annotated with the pair's running balance after it and its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedTrade {
    pub block_id: u32,
    pub running_balance: Decimal,
    pub trade: Trade,
}

/// One element of a segmented sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockElement {
    Trade(SegmentedTrade),
    /// Inserted right after a trade that flattens the balance. Carries no trade data.
    Marker { block_id: u32 },
}

impl BlockElement {
    pub fn block_id(&self) -> u32 {
        match self {
            BlockElement::Trade(t) => t.block_id,
            BlockElement::Marker { block_id } => *block_id,
        }
    }

    pub fn as_trade(&self) -> Option<&SegmentedTrade> {
        match self {
            BlockElement::Trade(t) => Some(t),
            BlockElement::Marker { .. } => None,
        }
    }
}

/// A pair's trades interleaved with boundary markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub pair: Pair,
    pub elements: Vec<BlockElement>,
}

/// A maximal run of trades between two markers (or the sequence ends).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    pub pair: &'a Pair,
    pub block_id: u32,
    pub trades: Vec<&'a SegmentedTrade>,
    /// True when a marker follows the block's last trade.
    pub closed: bool,
}

impl Block<'_> {
    /// Side of the opening trade.
    pub fn side(&self) -> Option<Side> {
        self.trades.first().map(|t| t.trade.side)
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.trades.first().map(|t| t.trade.timestamp)
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.trades.last().map(|t| t.trade.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Walk `trades` (chronological) keeping a running balance of `amount`, and emit a
/// marker after every trade whose balance rounds to zero at eight decimals.
///
/// An element's block id is the number of markers at or before it. Fails only when the
/// running balance overflows.
pub fn segment(pair: &Pair, trades: &[Trade]) -> Result<Segmentation, PairError> {
    let (elements, _, _) = trades.iter().try_fold(
        (Vec::with_capacity(trades.len() + 1), Decimal::zero(), 0u32),
        |(mut elements, balance, block_id), trade| {
            let balance = balance
                .checked_add(trade.amount)
                .ok_or_else(|| PairError::Overflow {
                    pair: pair.clone(),
                    column: "running balance".to_string(),
                })?;
            elements.push(BlockElement::Trade(SegmentedTrade {
                block_id,
                running_balance: balance,
                trade: trade.clone(),
            }));
            if !balance.is_flat() {
                return Ok((elements, balance, block_id));
            }
            let block_id = block_id + 1;
            elements.push(BlockElement::Marker { block_id });
            Ok((elements, balance, block_id))
        },
    )?;

    Ok(Segmentation {
        pair: pair.clone(),
        elements,
    })
}

impl Segmentation {
    /// Real trades, markers excluded, in walk order.
    pub fn trades(&self) -> impl Iterator<Item = &SegmentedTrade> {
        self.elements.iter().filter_map(BlockElement::as_trade)
    }

    pub fn marker_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, BlockElement::Marker { .. }))
            .count()
    }

    /// Group the sequence into blocks.
    ///
    /// Every run closed by a marker is returned, even if it holds no trades. The run after
    /// the final marker is returned only when it holds trades, as an open block.
    pub fn blocks(&self) -> Vec<Block<'_>> {
        let mut blocks = Vec::new();
        let mut current = Block {
            pair: &self.pair,
            block_id: 0,
            trades: Vec::new(),
            closed: false,
        };

        for element in &self.elements {
            match element {
                BlockElement::Trade(t) => current.trades.push(t),
                BlockElement::Marker { block_id } => {
                    let next = Block {
                        pair: &self.pair,
                        block_id: *block_id,
                        trades: Vec::new(),
                        closed: false,
                    };
                    let mut done = std::mem::replace(&mut current, next);
                    done.closed = true;
                    blocks.push(done);
                }
            }
        }

        if !current.trades.is_empty() {
            blocks.push(current);
        }
        blocks
    }

    /// True when the last trade left a non-zero balance.
    pub fn is_open(&self) -> bool {
        matches!(self.elements.last(), Some(BlockElement::Trade(_)))
    }
}
