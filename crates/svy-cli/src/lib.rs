//! CLI library components for the survey analytics engine.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
