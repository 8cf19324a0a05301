//! CLI module graph.

pub mod command;
pub mod config;
pub mod latest;
pub mod output;
pub mod run;
