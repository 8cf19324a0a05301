//! Handler for the `config` command group.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    output::success("Configuration is valid");
    output::field("Path", path.display());
    output::field("Database", &config.database);
    output::field("Endpoint", config.feed.endpoint());
    output::field("Flush threshold", config.ingest.flush_threshold);
    if let Some(interval) = config.ingest.flush_interval_ms {
        output::field("Flush interval", format!("{interval} ms"));
    }
    Ok(())
}
