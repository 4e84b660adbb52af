use crate::config::ConfigError;
use crate::datasource::SourceError;
use crate::engine::EngineError;
use crate::output::SinkError;
use thiserror::Error;

/// Errors that end a run. Data-quality problems never surface here; they are
/// collected in the run report instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Reading exports failed: {0}")]
    Source(#[from] SourceError),
    #[error("Loan engine failed: {0}")]
    Engine(#[from] EngineError),
    #[error("Writing outputs failed: {0}")]
    Sink(#[from] SinkError),
}
