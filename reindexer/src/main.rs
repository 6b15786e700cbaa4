//! Entry point for the reindexer binary.

use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use reindexer::{Dependencies, IndexingError};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "reindex failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), IndexingError> {
    let deps = Dependencies::new().await?;

    // A shutdown signal stops the producer; in-flight chunks still drain.
    let cancel = deps.orchestrator.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("shutdown signal received, finishing in-flight chunks");
            cancel.set();
        }
    });

    let totals = deps.orchestrator.run().await?;

    info!(
        total_success = totals.success,
        total_failed = totals.failed,
        "indexing process completed"
    );
    Ok(())
}
