//! Weighted univariate distributions.

use serde::{Deserialize, Serialize};

use svy_model::CodedVariable;

use crate::error::Result;
use crate::format::round1;
use crate::mask::{RefusedPolicy, ensure_parallel, include, validate_weights};

/// One category row of a weighted distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub code: i64,
    pub label: String,
    /// Weighted percentage of the base, rounded to 1 decimal.
    pub percent: f64,
    /// Weighted respondent count, rounded to 1 decimal.
    pub weighted_count: f64,
}

/// Compute a variable's survey-weighted percentage distribution.
///
/// `values` and `weights` are parallel per-respondent slices. The base is
/// every record with a present response, a present weight, and (under
/// [`RefusedPolicy::Exclude`]) a non-refused response. Categories come from
/// the variable's code map in ascending code order.
///
/// A zero weighted base is not an error: every category reports 0.
pub fn weighted_distribution(
    values: &[Option<i64>],
    weights: &[Option<f64>],
    variable: &CodedVariable,
    refused: RefusedPolicy,
) -> Result<Vec<CategoryShare>> {
    ensure_parallel(values.len(), weights.len())?;
    validate_weights(weights)?;

    let mut by_code = std::collections::BTreeMap::new();
    let mut total = 0.0;
    for (value, weight) in values.iter().zip(weights) {
        let Some((code, w)) = include(*value, *weight, variable.refused_code, refused) else {
            continue;
        };
        total += w;
        *by_code.entry(code).or_insert(0.0) += w;
    }

    let categories: Vec<(i64, &str)> = match refused {
        RefusedPolicy::Exclude => variable.answer_categories().collect(),
        RefusedPolicy::Include => variable.categories().collect(),
    };

    Ok(categories
        .into_iter()
        .map(|(code, label)| {
            let weighted_count = by_code.get(&code).copied().unwrap_or(0.0);
            let percent = if total > 0.0 {
                weighted_count / total * 100.0
            } else {
                0.0
            };
            CategoryShare {
                code,
                label: label.to_string(),
                percent: round1(percent),
                weighted_count: round1(weighted_count),
            }
        })
        .collect())
}
