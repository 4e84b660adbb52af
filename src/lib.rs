pub mod compile;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod filter;
pub mod orchestration;
pub mod output;
pub mod report;

pub use config::Config;
pub use datasource::{CsvExportSource, ExportSource, MockExportSource, SourceError};
pub use domain::{
    Currency, Decimal, LoanEvent, LoanKind, LoanLabel, LoanStatus, LoanSummary, Pair, RawTrade,
    Side, Timestamp, Trade,
};
pub use engine::{DataIssue, EngineError, Ledgers, LoanPipeline, PairError, PipelineOutput};
pub use error::AppError;
pub use filter::DateRange;
pub use orchestration::{Orchestrator, RunOutcome};
pub use output::{OutputWriter, SinkError};
pub use report::RunReport;
