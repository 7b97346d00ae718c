use thiserror::Error;

/// Invalid-input failures at the calculator boundary.
///
/// Degenerate-but-defined situations (zero weighted base in a distribution,
/// too few categories for a test) are not errors; they produce zero rows or
/// `None` results instead.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("parallel inputs have mismatched lengths: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("invalid weight {value} at row {index}: weights must be finite and non-negative")]
    InvalidWeight { index: usize, value: f64 },

    #[error("weighted base is zero; standard errors are undefined")]
    ZeroWeightedBase,
}

pub type Result<T> = std::result::Result<T, StatsError>;
