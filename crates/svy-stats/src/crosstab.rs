//! Weighted cross-tabulations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use svy_model::CodedVariable;

use crate::error::Result;
use crate::format::round1;
use crate::mask::{RefusedPolicy, ensure_parallel, include, validate_weights};

/// One cell of the flat cross-tabulation relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosstabCell {
    pub demo_code: i64,
    pub demo_label: String,
    pub q_code: i64,
    pub q_label: String,
    /// Weighted percentage within the demographic category, rounded to 1
    /// decimal.
    pub percent: f64,
}

/// Cross-tabulate a question against a demographic variable.
///
/// The mask requires both responses present and non-refused plus a present
/// weight. Percentages are normalized *independently per demographic
/// category*: within each demographic group the question categories sum to
/// 100 (or all report 0 when that group's weighted base is zero). The result
/// is a flat relation ordered demographic-major, both axes ascending by code
/// with refused excluded; callers pivot for display.
pub fn weighted_crosstab(
    q_values: &[Option<i64>],
    demo_values: &[Option<i64>],
    weights: &[Option<f64>],
    question: &CodedVariable,
    demographic: &CodedVariable,
) -> Result<Vec<CrosstabCell>> {
    ensure_parallel(q_values.len(), demo_values.len())?;
    ensure_parallel(q_values.len(), weights.len())?;
    validate_weights(weights)?;

    let mut demo_totals: BTreeMap<i64, f64> = BTreeMap::new();
    let mut cells: BTreeMap<(i64, i64), f64> = BTreeMap::new();
    for ((q, d), w) in q_values.iter().zip(demo_values).zip(weights) {
        let Some((q_code, weight)) = include(*q, *w, question.refused_code, RefusedPolicy::Exclude)
        else {
            continue;
        };
        let Some((d_code, _)) = include(*d, *w, demographic.refused_code, RefusedPolicy::Exclude)
        else {
            continue;
        };
        *demo_totals.entry(d_code).or_insert(0.0) += weight;
        *cells.entry((d_code, q_code)).or_insert(0.0) += weight;
    }

    let mut rows = Vec::new();
    for (d_code, d_label) in demographic.answer_categories() {
        let total = demo_totals.get(&d_code).copied().unwrap_or(0.0);
        for (q_code, q_label) in question.answer_categories() {
            let weighted_n = cells.get(&(d_code, q_code)).copied().unwrap_or(0.0);
            let percent = if total > 0.0 {
                weighted_n / total * 100.0
            } else {
                0.0
            };
            rows.push(CrosstabCell {
                demo_code: d_code,
                demo_label: d_label.to_string(),
                q_code,
                q_label: q_label.to_string(),
                percent: round1(percent),
            });
        }
    }
    Ok(rows)
}
