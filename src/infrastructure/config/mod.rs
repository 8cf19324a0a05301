//! Infrastructure configuration modules.

pub mod feed;
pub mod ingest;
pub mod logging;
pub mod reconnection;
pub mod settings;
