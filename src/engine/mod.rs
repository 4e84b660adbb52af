//! Pure computation engine for margin-loan detection.
//!
//! Data flows strictly normalizer -> segmenter -> summarizer -> formatter -> merger.
//! Each pair is processed in isolation until the merger.

use crate::domain::Pair;
use serde::Serialize;
use thiserror::Error;

pub mod formatter;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod segmenter;
pub mod summarizer;

pub use formatter::{format_loan, format_loans, LOAN_EVENT_OFFSET_MINUTES};
pub use merger::{LoanMerger, Ledgers};
pub use normalizer::{normalize_trades, NormalizedTrades, PairTrades};
pub use pipeline::{run_pair, LoanPipeline, PairPipelineResult, PipelineOutput};
pub use segmenter::{segment, Block, BlockElement, SegmentedTrade, Segmentation};
pub use summarizer::{summarize, summarize_block, AccumulatingColumn};

/// Failures that stop the whole engine run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no usable trades in the export ({skipped} pairs skipped)")]
    NoTrades { skipped: usize },
    #[error("pair pipeline task failed: {0}")]
    Join(String),
}

/// A failure that removes one pair from the run without affecting the others.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairError {
    #[error("pair {pair}: side {value:?} is neither Buy nor Sell")]
    MalformedSide { pair: Pair, value: String },
    #[error("pair {pair}: {column} overflowed the decimal range")]
    Overflow { pair: Pair, column: String },
}

impl PairError {
    pub fn pair(&self) -> &Pair {
        match self {
            PairError::MalformedSide { pair, .. } | PairError::Overflow { pair, .. } => pair,
        }
    }
}

/// A non-fatal data-quality finding. Logged when raised and collected for the run report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIssue {
    #[error("{context}: {field} is not numeric, record excluded")]
    NumericCoercionFailure { context: String, field: String },
    #[error("{context}: timestamp is missing or unparsable, record excluded")]
    UnparsableTimestamp { context: String },
    #[error("pair {pair}: block {block_id} never returns to zero, reported as an open loan")]
    UnterminatedBlock { pair: Pair, block_id: u32 },
    #[error("pair {pair}: block {block_id} holds no trades, skipped")]
    EmptyBlock { pair: Pair, block_id: u32 },
}
