//! Weighted proportions with design-effect-adjusted confidence intervals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use svy_model::CodedVariable;

use crate::error::{Result, StatsError};
use crate::format::round2;
use crate::mask::{RefusedPolicy, ensure_parallel, include, validate_weights};

/// z-score for a two-sided 95% Wald interval.
const Z_95: f64 = 1.96;

/// One category's weighted proportion with its 95% interval.
///
/// All values are percentages rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionCi {
    pub code: i64,
    pub label: String,
    pub percent: f64,
    pub se: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// CI rows plus the shared effective sample size.
///
/// `effective_n` depends only on the weight distribution within the mask,
/// not on any category, so it is carried once for the whole table, rounded
/// to the nearest integer for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CiTable {
    pub rows: Vec<ProportionCi>,
    pub effective_n: f64,
}

/// Weighted proportions with Wald 95% confidence intervals.
///
/// Standard errors use the effective sample size
/// `n_eff = total_w² / Σ w²` (Kish design-effect correction): unequal
/// weights shrink the effective N below the raw count and widen the
/// intervals. With uniform weights `n_eff` equals the raw count of included
/// records.
///
/// A zero weighted base is an invalid input here (the SE is undefined), in
/// contrast to the distribution calculators where it degrades to zero rows.
pub fn weighted_proportion_ci(
    values: &[Option<i64>],
    weights: &[Option<f64>],
    variable: &CodedVariable,
) -> Result<CiTable> {
    ensure_parallel(values.len(), weights.len())?;
    validate_weights(weights)?;

    let mut by_code: BTreeMap<i64, f64> = BTreeMap::new();
    let mut total = 0.0;
    let mut sum_sq = 0.0;
    for (value, weight) in values.iter().zip(weights) {
        let Some((code, w)) =
            include(*value, *weight, variable.refused_code, RefusedPolicy::Exclude)
        else {
            continue;
        };
        total += w;
        sum_sq += w * w;
        *by_code.entry(code).or_insert(0.0) += w;
    }
    if total <= 0.0 {
        return Err(StatsError::ZeroWeightedBase);
    }

    let effective_n = total * total / sum_sq;
    let rows = variable
        .answer_categories()
        .map(|(code, label)| {
            let p_hat = by_code.get(&code).copied().unwrap_or(0.0) / total;
            let se = (p_hat * (1.0 - p_hat) / effective_n).sqrt();
            let ci_lower = (p_hat - Z_95 * se).max(0.0);
            let ci_upper = (p_hat + Z_95 * se).min(1.0);
            ProportionCi {
                code,
                label: label.to_string(),
                percent: round2(p_hat * 100.0),
                se: round2(se * 100.0),
                ci_lower: round2(ci_lower * 100.0),
                ci_upper: round2(ci_upper * 100.0),
            }
        })
        .collect();

    Ok(CiTable {
        rows,
        effective_n: effective_n.round(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use svy_model::VariableRole;

    fn variable() -> CodedVariable {
        CodedVariable::new(
            "Q",
            "A question",
            VariableRole::Question,
            99,
            [
                (1, "Yes".to_string()),
                (2, "No".to_string()),
                (99, "Refused".to_string()),
            ],
        )
    }

    #[test]
    fn uniform_weights_reduce_to_raw_count() {
        let values = [Some(1), Some(1), Some(2), Some(2), Some(99), None];
        let weights = [Some(1.0); 6];
        let table = weighted_proportion_ci(&values, &weights, &variable()).expect("table");
        // 4 included records (refused and missing drop out).
        assert_eq!(table.effective_n, 4.0);
        assert_eq!(table.rows[0].percent, 50.0);
        assert_eq!(table.rows[1].percent, 50.0);
    }

    #[test]
    fn unequal_weights_shrink_effective_n() {
        let values = [Some(1), Some(2), Some(1), Some(2)];
        let weights = [Some(4.0), Some(1.0), Some(1.0), Some(1.0)];
        let table = weighted_proportion_ci(&values, &weights, &variable()).expect("table");
        // n_eff = 49 / 19 ≈ 2.58, rounded to 3 — well below the raw 4.
        assert_eq!(table.effective_n, 3.0);
    }

    #[test]
    fn interval_contains_the_point_estimate_and_stays_in_range() {
        let values = [Some(1), Some(1), Some(1), Some(2)];
        let weights = [Some(0.5), Some(1.5), Some(2.0), Some(1.0)];
        let table = weighted_proportion_ci(&values, &weights, &variable()).expect("table");
        for row in &table.rows {
            assert!(row.ci_lower <= row.percent + 0.011);
            assert!(row.ci_upper >= row.percent - 0.011);
            assert!(row.ci_lower >= 0.0 && row.ci_upper <= 100.0);
        }
    }

    #[test]
    fn certain_proportion_has_zero_se() {
        let values = [Some(1), Some(1)];
        let weights = [Some(2.0), Some(3.0)];
        let table = weighted_proportion_ci(&values, &weights, &variable()).expect("table");
        assert_eq!(table.rows[0].percent, 100.0);
        assert_eq!(table.rows[0].se, 0.0);
        assert_eq!(table.rows[0].ci_lower, 100.0);
        assert_eq!(table.rows[0].ci_upper, 100.0);
        assert_eq!(table.rows[1].percent, 0.0);
    }

    #[test]
    fn zero_weighted_base_is_invalid_input() {
        let values = [Some(99), None];
        let weights = [Some(1.0), Some(1.0)];
        let err = weighted_proportion_ci(&values, &weights, &variable()).unwrap_err();
        assert!(matches!(err, StatsError::ZeroWeightedBase));
    }

    #[test]
    fn wald_interval_matches_hand_computation() {
        // 3 of 4 unit-weight records answer Yes: p = 0.75, n_eff = 4,
        // se = sqrt(0.75 * 0.25 / 4) ≈ 0.2165.
        let values = [Some(1), Some(1), Some(1), Some(2)];
        let weights = [Some(1.0); 4];
        let table = weighted_proportion_ci(&values, &weights, &variable()).expect("table");
        let yes = &table.rows[0];
        assert_eq!(yes.percent, 75.0);
        assert_eq!(yes.se, 21.65);
        assert_eq!(yes.ci_lower, 32.56);
        assert_eq!(yes.ci_upper, 100.0);
    }

    #[test]
    fn ci_table_serializes() {
        let values = [Some(1), Some(2)];
        let weights = [Some(1.0), Some(1.0)];
        let table = weighted_proportion_ci(&values, &weights, &variable()).expect("table");
        let json = serde_json::to_string(&table).expect("serialize table");
        let round: CiTable = serde_json::from_str(&json).expect("deserialize table");
        assert_eq!(round, table);
    }
}
