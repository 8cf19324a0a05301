//! Runtime orchestration.

pub mod runtime;

pub use runtime::run_with_shutdown;
