//! Shared utilities for svy crates.
//!
//! This crate provides common utilities used across the svy workspace,
//! including Polars `AnyValue` coercions for survey microdata.

pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use polars::{code_from_any, format_numeric, parse_code, parse_weight, weight_from_any};
