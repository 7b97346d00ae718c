//! Property-based checks of the engine's invariants.

use proptest::prelude::*;

use svy_model::{CodedVariable, VariableRole};
use svy_stats::{
    EffectBand, RefusedPolicy, SignificanceBand, weighted_distribution, weighted_proportion_ci,
};
use svy_stats::association::{ContingencyTable, test_table};

fn four_point_variable() -> CodedVariable {
    CodedVariable::new(
        "Q",
        "A question",
        VariableRole::Question,
        99,
        [
            (1, "Strongly agree".to_string()),
            (2, "Agree".to_string()),
            (3, "Disagree".to_string()),
            (4, "Strongly disagree".to_string()),
            (99, "Refused".to_string()),
        ],
    )
}

/// A respondent: possibly-missing response drawn from the code map (or the
/// refused sentinel), possibly-missing non-negative weight.
fn respondents() -> impl Strategy<Value = Vec<(Option<i64>, Option<f64>)>> {
    let value = prop::option::of(prop_oneof![1..=4i64, Just(99i64)]);
    let weight = prop::option::of(0.01f64..10.0);
    prop::collection::vec((value, weight), 0..200)
}

fn split(records: &[(Option<i64>, Option<f64>)]) -> (Vec<Option<i64>>, Vec<Option<f64>>) {
    records.iter().copied().unzip()
}

proptest! {
    #[test]
    fn distribution_percentages_sum_to_one_hundred(records in respondents()) {
        let (values, weights) = split(&records);
        let variable = four_point_variable();
        let shares = weighted_distribution(&values, &weights, &variable, RefusedPolicy::Exclude)
            .expect("valid inputs");
        let included: f64 = records
            .iter()
            .filter_map(|(v, w)| match (v, w) {
                (Some(code), Some(weight)) if *code != 99 => Some(*weight),
                _ => None,
            })
            .sum();
        let sum: f64 = shares.iter().map(|s| s.percent).sum();
        if included > 0.0 {
            // Each category is rounded to 1 decimal, so the sum may drift by
            // up to 0.05 per category.
            let tolerance = 0.05 * shares.len() as f64 + 1e-9;
            prop_assert!((sum - 100.0).abs() <= tolerance, "sum was {sum}");
        } else {
            prop_assert_eq!(sum, 0.0);
            prop_assert!(shares.iter().all(|s| s.weighted_count == 0.0));
        }
    }

    #[test]
    fn ci_bounds_contain_the_estimate(records in respondents()) {
        let (values, weights) = split(&records);
        let variable = four_point_variable();
        match weighted_proportion_ci(&values, &weights, &variable) {
            Ok(table) => {
                prop_assert!(table.effective_n >= 0.0);
                for row in &table.rows {
                    // Rounding to 2 decimals can move each side by 0.005.
                    prop_assert!(row.ci_lower <= row.percent + 0.011);
                    prop_assert!(row.ci_upper >= row.percent - 0.011);
                    prop_assert!(row.ci_lower >= 0.0);
                    prop_assert!(row.ci_upper <= 100.0);
                    prop_assert!(row.se >= 0.0);
                }
            }
            Err(_) => {
                // Zero weighted base: the estimator must refuse, not panic.
                let included: f64 = records
                    .iter()
                    .filter_map(|(v, w)| match (v, w) {
                        (Some(code), Some(weight)) if *code != 99 => Some(*weight),
                        _ => None,
                    })
                    .sum();
                prop_assert!(included <= 0.0);
            }
        }
    }

    #[test]
    fn cramers_v_is_bounded(
        observed in prop::collection::vec(prop::collection::vec(0u64..30, 2..5), 2..5)
    ) {
        let cols = observed[0].len();
        let observed: Vec<Vec<u64>> = observed
            .into_iter()
            .map(|mut row| { row.resize(cols, 0); row })
            .collect();
        let rows = observed.len();
        let table = ContingencyTable::from_counts(
            (0..rows as i64).collect(),
            (0..cols as i64).collect(),
            observed,
        );
        if let Some(result) = test_table(table) {
            prop_assert!(result.cramers_v >= 0.0);
            prop_assert!(result.cramers_v <= 1.0);
            prop_assert!((0.0..=1.0).contains(&result.p_value));
            if result.chi2 == 0.0 {
                prop_assert_eq!(result.cramers_v, 0.0);
            }
        }
    }

    #[test]
    fn significance_bands_are_exhaustive_and_monotone(p in 0.0f64..=1.0, q in 0.0f64..=1.0) {
        fn rank(band: SignificanceBand) -> u8 {
            match band {
                SignificanceBand::ThreeStars => 3,
                SignificanceBand::TwoStars => 2,
                SignificanceBand::OneStar => 1,
                SignificanceBand::NotSignificant => 0,
            }
        }
        let stars = ["★★★", "★★", "★", "n.s."];
        prop_assert!(stars.contains(&SignificanceBand::from_p(p).as_str()));
        if p <= q {
            prop_assert!(rank(SignificanceBand::from_p(p)) >= rank(SignificanceBand::from_p(q)));
        }
    }

    #[test]
    fn effect_bands_are_exhaustive_and_monotone(v in 0.0f64..=1.0, w in 0.0f64..=1.0) {
        fn rank(band: EffectBand) -> u8 {
            match band {
                EffectBand::Large => 3,
                EffectBand::Medium => 2,
                EffectBand::Small => 1,
                EffectBand::Negligible => 0,
            }
        }
        let names = ["Large", "Medium", "Small", "Negligible"];
        prop_assert!(names.contains(&EffectBand::from_v(v).as_str()));
        if v >= w {
            prop_assert!(rank(EffectBand::from_v(v)) >= rank(EffectBand::from_v(w)));
        }
    }
}
