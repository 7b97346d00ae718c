//! The immutable survey dataset handle.

use std::path::Path;

use polars::prelude::{AnyValue, CsvReadOptions, DataFrame, SerReader};
use tracing::{debug, info};

use svy_common::{code_from_any, weight_from_any};
use svy_model::VariableRegistry;

use crate::error::{IngestError, Result};

/// A loaded survey dataset.
///
/// The frame is loaded once per session and never mutated; calculators
/// receive column projections, not the frame itself. The handle is passed
/// explicitly instead of living in process-wide cached state.
#[derive(Debug, Clone)]
pub struct SurveyDataset {
    frame: DataFrame,
    weight_column: String,
}

/// Headline figures for the dataset overview.
#[derive(Debug, Clone)]
pub struct DatasetOverview {
    pub respondents: usize,
    /// Sum of all present weights.
    pub weighted_n: f64,
    pub weight_column: String,
}

impl SurveyDataset {
    /// Load the respondent CSV named by the registry's survey metadata.
    pub fn load(path: &Path, registry: &VariableRegistry) -> Result<Self> {
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .finish()
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            path = %path.display(),
            rows = frame.height(),
            columns = frame.width(),
            "loaded survey dataset"
        );
        Self::from_frame(frame, &registry.survey().weight_column)
    }

    /// Wrap an already-loaded frame, verifying the weight column exists.
    pub fn from_frame(frame: DataFrame, weight_column: &str) -> Result<Self> {
        if frame.column(weight_column).is_err() {
            return Err(IngestError::MissingColumn {
                name: weight_column.to_string(),
            });
        }
        Ok(Self {
            frame,
            weight_column: weight_column.to_string(),
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn respondents(&self) -> usize {
        self.frame.height()
    }

    pub fn weight_column(&self) -> &str {
        &self.weight_column
    }

    /// Extract a coded column as nullable integer codes.
    ///
    /// Numeric cells coerce to whole-number codes (`99.0` reads as `99`);
    /// blanks and non-numeric cells are missing.
    pub fn coded_values(&self, name: &str) -> Result<Vec<Option<i64>>> {
        let series = self
            .frame
            .column(name)
            .map_err(|_| IngestError::MissingColumn {
                name: name.to_string(),
            })?;
        let values = (0..self.frame.height())
            .map(|idx| code_from_any(series.get(idx).unwrap_or(AnyValue::Null)))
            .collect::<Vec<_>>();
        debug!(
            column = name,
            present = values.iter().filter(|v| v.is_some()).count(),
            "extracted coded column"
        );
        Ok(values)
    }

    /// Extract the canonical weight column.
    pub fn weights(&self) -> Result<Vec<Option<f64>>> {
        let series =
            self.frame
                .column(&self.weight_column)
                .map_err(|_| IngestError::MissingColumn {
                    name: self.weight_column.clone(),
                })?;
        Ok((0..self.frame.height())
            .map(|idx| weight_from_any(series.get(idx).unwrap_or(AnyValue::Null)))
            .collect())
    }

    /// Sum of all present weights.
    pub fn total_weight(&self) -> Result<f64> {
        Ok(self.weights()?.into_iter().flatten().sum())
    }

    pub fn overview(&self) -> Result<DatasetOverview> {
        Ok(DatasetOverview {
            respondents: self.respondents(),
            weighted_n: self.total_weight()?,
            weight_column: self.weight_column.clone(),
        })
    }
}
