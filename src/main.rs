use anyhow::Context;
use marginledger::{Config, CsvExportSource, ExportSource, Orchestrator};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("Run failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let source: Arc<dyn ExportSource> = Arc::new(CsvExportSource::new(
        config.input_dir.clone(),
        config.quote_currency.clone(),
    ));
    let input_dir = config.input_dir.display().to_string();

    tracing::info!(
        input = %input_dir,
        output = %config.output_dir.display(),
        quote = %config.quote_currency,
        "Starting margin ledger run"
    );

    let outcome = Orchestrator::new(source, config)
        .run()
        .await
        .with_context(|| format!("processing exports in {}", input_dir))?;

    for path in &outcome.written {
        tracing::info!(path = %path.display(), "Wrote");
    }
    Ok(())
}
