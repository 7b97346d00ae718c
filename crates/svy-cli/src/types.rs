use svy_stats::{EffectBand, SignificanceBand};

/// One row of the chi-square scan table.
#[derive(Debug)]
pub struct ScanRow {
    pub question: String,
    pub demographic: String,
    pub chi2: f64,
    pub dof: usize,
    pub p_display: String,
    pub cramers_v: f64,
    pub effect: EffectBand,
    pub significance: SignificanceBand,
}
