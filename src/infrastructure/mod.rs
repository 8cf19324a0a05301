//! Infrastructure layer.
//!
//! Configuration, feed connection management and runtime wiring. No ingest
//! logic lives here.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for storage and feed construction
//! - [`config`] - Configuration loading and validation
//! - [`exchange`] - Reconnection policy for feeds
//! - [`orchestration`] - Runtime lifecycle

pub mod bootstrap;
pub mod config;
pub mod exchange;
pub mod orchestration;
