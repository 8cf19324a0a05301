//! Application layer: the ingest pipeline, written against the ports only.

pub mod ingest;
