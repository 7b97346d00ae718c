//! Survey microdata ingestion.
//!
//! Loads the respondent-level CSV once into an immutable [`SurveyDataset`]
//! handle. Every analysis is a read-only projection over the handle, so
//! concurrent sessions can share one dataset with no coordination.

pub mod dataset;
pub mod error;

pub use dataset::{DatasetOverview, SurveyDataset};
pub use error::{IngestError, Result};
