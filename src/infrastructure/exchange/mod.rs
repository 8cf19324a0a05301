//! Feed connection management.
//!
//! Feeds are built in [`bootstrap`](crate::infrastructure::bootstrap) and
//! always wrapped in [`ReconnectingFeed`] before they reach the pipeline.

pub mod reconnecting;

pub use reconnecting::ReconnectingFeed;
