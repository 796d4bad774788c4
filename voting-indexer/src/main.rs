//! Voting Indexer Main Entry Point
//!
//! Reads vote events from a JSON-lines file and recomputes the scores of
//! every document they touch.

use dotenv::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voting_indexer::{Dependencies, IndexingError};

/// Initialize tracing/logging.
///
/// Logs are printed for humans unless `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("voting_indexer=info,voting_engine=info"));
    let json_output = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let json_layer = json_output.then(|| fmt::layer().json().with_target(true));
    let console_layer = (!json_output).then(|| fmt::layer().with_target(true).pretty());
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(console_layer)
        .init();

    info!(
        service_name = "voting-indexer",
        service_version = env!("CARGO_PKG_VERSION"),
        json_output,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv().ok();

    init_tracing();

    info!("Starting voting indexer");

    let mut deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.orchestrator.run().await {
        Ok(summary) => {
            info!(
                events_read = summary.events_read,
                documents_recomputed = summary.documents_recomputed,
                "Voting indexer completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Voting indexer failed");
            Err(e.into())
        }
    }
}
