//! Handler for the `run` command.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::logging::LogFormat;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::run_with_shutdown;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;
    config.init_logging();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, flushing pending trades");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "Unable to listen for Ctrl-C");
                // Keep the sender alive so the pipeline is not stopped.
                std::future::pending::<()>().await;
            }
        }
    });

    let result = run_with_shutdown(&config, shutdown_rx).await;
    signal.abort();

    let snapshot = result?;
    output::run_summary(&snapshot);
    Ok(())
}

/// Load the config file (or defaults) and apply command-line overrides.
fn load_config(args: &RunArgs) -> Result<Config> {
    let mut config = Config::load_or_default(&args.config)?;
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(database) = &args.database {
        config.database = database.to_string_lossy().to_string();
    }
    if let Some(symbol) = &args.symbol {
        config.feed.symbol.clone_from(symbol);
    }
    if let Some(threshold) = args.flush_threshold {
        config.ingest.flush_threshold = threshold;
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs {
        config.logging.format = LogFormat::Json;
    }
}
