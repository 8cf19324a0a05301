//! Streaming ingestion: buffer decoded trades and persist them in batches.
//!
//! The receive loop ([`IngestPipeline`]) owns the feed and the
//! [`IngestBuffer`]. Full buffers are swapped out and handed to a single flush
//! worker, so the loop never waits on storage and batches commit in the order
//! they were drained.

pub mod buffer;
pub mod flusher;
pub mod pipeline;

pub use buffer::IngestBuffer;
pub use flusher::{spawn_flush_worker, CommitRetry, FlushHandle};
pub use pipeline::IngestPipeline;
