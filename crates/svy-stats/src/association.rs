//! Chi-square tests of independence with Cramér's V.
//!
//! These tests run on *unweighted* co-occurrence counts. That is a deliberate
//! departure from the weighted calculators, kept from the original
//! methodology as an illustrative test rather than a survey-design-adjusted
//! one; presentation layers are expected to label it as such.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use svy_model::CodedVariable;

use crate::error::Result;
use crate::mask::ensure_parallel;
use crate::special::chi_square_sf;

/// An observed contingency table over the codes present in the masked data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    row_codes: Vec<i64>,
    col_codes: Vec<i64>,
    observed: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Build a table from (row code, column code) observation pairs.
    ///
    /// Axes are the distinct codes present, ascending; cells are unweighted
    /// co-occurrence counts.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, i64)>) -> Self {
        let pairs: Vec<(i64, i64)> = pairs.into_iter().collect();
        let rows: BTreeSet<i64> = pairs.iter().map(|(r, _)| *r).collect();
        let cols: BTreeSet<i64> = pairs.iter().map(|(_, c)| *c).collect();
        let row_index: BTreeMap<i64, usize> =
            rows.iter().enumerate().map(|(i, code)| (*code, i)).collect();
        let col_index: BTreeMap<i64, usize> =
            cols.iter().enumerate().map(|(i, code)| (*code, i)).collect();
        let mut observed = vec![vec![0u64; cols.len()]; rows.len()];
        for (r, c) in pairs {
            if let (Some(&ri), Some(&ci)) = (row_index.get(&r), col_index.get(&c)) {
                observed[ri][ci] += 1;
            }
        }
        Self {
            row_codes: rows.into_iter().collect(),
            col_codes: cols.into_iter().collect(),
            observed,
        }
    }

    /// Build a table directly from counts (rows × columns).
    pub fn from_counts(row_codes: Vec<i64>, col_codes: Vec<i64>, observed: Vec<Vec<u64>>) -> Self {
        Self {
            row_codes,
            col_codes,
            observed,
        }
    }

    pub fn row_codes(&self) -> &[i64] {
        &self.row_codes
    }

    pub fn col_codes(&self) -> &[i64] {
        &self.col_codes
    }

    pub fn observed(&self) -> &[Vec<u64>] {
        &self.observed
    }

    pub fn rows(&self) -> usize {
        self.row_codes.len()
    }

    pub fn cols(&self) -> usize {
        self.col_codes.len()
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.observed.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        (0..self.cols())
            .map(|c| self.observed.iter().map(|row| row[c]).sum())
            .collect()
    }

    pub fn grand_total(&self) -> u64 {
        self.observed.iter().flatten().sum()
    }

    /// Expected frequencies under independence:
    /// row_total × col_total / grand_total per cell.
    pub fn expected(&self) -> Vec<Vec<f64>> {
        let row_totals = self.row_totals();
        let col_totals = self.col_totals();
        let n = self.grand_total() as f64;
        self.observed
            .iter()
            .enumerate()
            .map(|(r, row)| {
                (0..row.len())
                    .map(|c| {
                        if n > 0.0 {
                            row_totals[r] as f64 * col_totals[c] as f64 / n
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Qualitative effect-size band for Cramér's V.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectBand {
    Large,
    Medium,
    Small,
    Negligible,
}

impl EffectBand {
    /// Band thresholds are strict and evaluated top-down.
    pub fn from_v(v: f64) -> Self {
        if v > 0.5 {
            Self::Large
        } else if v > 0.3 {
            Self::Medium
        } else if v > 0.1 {
            Self::Small
        } else {
            Self::Negligible
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Large => "Large",
            Self::Medium => "Medium",
            Self::Small => "Small",
            Self::Negligible => "Negligible",
        }
    }
}

impl std::fmt::Display for EffectBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative significance band for the p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignificanceBand {
    ThreeStars,
    TwoStars,
    OneStar,
    NotSignificant,
}

impl SignificanceBand {
    /// Band thresholds are strict and evaluated top-down.
    pub fn from_p(p: f64) -> Self {
        if p < 0.001 {
            Self::ThreeStars
        } else if p < 0.01 {
            Self::TwoStars
        } else if p < 0.05 {
            Self::OneStar
        } else {
            Self::NotSignificant
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeStars => "★★★",
            Self::TwoStars => "★★",
            Self::OneStar => "★",
            Self::NotSignificant => "n.s.",
        }
    }
}

impl std::fmt::Display for SignificanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result bundle of a chi-square independence test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationTest {
    pub chi2: f64,
    pub dof: usize,
    pub p_value: f64,
    pub cramers_v: f64,
    pub effect: EffectBand,
    pub significance: SignificanceBand,
    pub observed: ContingencyTable,
    pub expected: Vec<Vec<f64>>,
}

/// Run a chi-square test of independence between a question and a
/// demographic variable, on unweighted counts.
///
/// Records where either response is missing or refused are dropped. Returns
/// `Ok(None)` when fewer than 2 distinct categories remain on either axis:
/// that is a recognized "no result available" outcome callers must branch
/// on, not an error.
pub fn association_test(
    q_values: &[Option<i64>],
    demo_values: &[Option<i64>],
    question: &CodedVariable,
    demographic: &CodedVariable,
) -> Result<Option<AssociationTest>> {
    ensure_parallel(q_values.len(), demo_values.len())?;

    let pairs = q_values.iter().zip(demo_values).filter_map(|(q, d)| {
        let q = (*q)?;
        let d = (*d)?;
        if question.is_refused(q) || demographic.is_refused(d) {
            None
        } else {
            Some((q, d))
        }
    });
    let observed = ContingencyTable::from_pairs(pairs);
    Ok(test_table(observed))
}

/// Test an already-built contingency table.
///
/// Returns `None` for tables with fewer than 2 rows or 2 columns.
pub fn test_table(observed: ContingencyTable) -> Option<AssociationTest> {
    if observed.rows() < 2 || observed.cols() < 2 {
        return None;
    }
    let expected = observed.expected();
    let mut chi2 = 0.0;
    for (r, row) in observed.observed().iter().enumerate() {
        for (c, &count) in row.iter().enumerate() {
            let e = expected[r][c];
            if e > 0.0 {
                let delta = count as f64 - e;
                chi2 += delta * delta / e;
            }
        }
    }
    let dof = (observed.rows() - 1) * (observed.cols() - 1);
    let p_value = chi_square_sf(chi2, dof);
    let cramers_v = cramers_v(chi2, observed.grand_total(), observed.rows(), observed.cols());
    Some(AssociationTest {
        chi2,
        dof,
        p_value,
        cramers_v,
        effect: EffectBand::from_v(cramers_v),
        significance: SignificanceBand::from_p(p_value),
        observed,
        expected,
    })
}

/// Cramér's V = sqrt(chi2 / (n × min(rows−1, cols−1))).
///
/// Degenerate tables (single row/column or empty) yield 0, not an error.
pub fn cramers_v(chi2: f64, n: u64, rows: usize, cols: usize) -> f64 {
    let min_dim = rows.min(cols).saturating_sub(1);
    if min_dim == 0 || n == 0 {
        return 0.0;
    }
    (chi2 / (n as f64 * min_dim as f64)).sqrt().min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use svy_model::VariableRole;

    fn coded(name: &str, codes: &[i64]) -> CodedVariable {
        CodedVariable::new(
            name,
            name,
            VariableRole::Question,
            99,
            codes.iter().map(|c| (*c, format!("c{c}"))),
        )
    }

    #[test]
    fn two_by_two_matches_pearson_reference() {
        // Observed [[50, 30], [20, 40]]: chi2 = 11.6667, df = 1,
        // p ≈ 6.36e-4, V ≈ 0.2887 (Small).
        let table = ContingencyTable::from_counts(
            vec![1, 2],
            vec![1, 2],
            vec![vec![50, 30], vec![20, 40]],
        );
        let result = test_table(table).expect("valid table");
        assert!((result.chi2 - 11.666_666_7).abs() < 1e-6);
        assert_eq!(result.dof, 1);
        assert!((result.p_value - 6.36e-4).abs() < 1e-5);
        assert!((result.cramers_v - 0.288_675).abs() < 1e-6);
        assert_eq!(result.effect, EffectBand::Small);
        assert_eq!(result.significance, SignificanceBand::ThreeStars);
    }

    #[test]
    fn expected_frequencies_follow_margins() {
        let table = ContingencyTable::from_counts(
            vec![1, 2],
            vec![1, 2],
            vec![vec![50, 30], vec![20, 40]],
        );
        let expected = table.expected();
        assert!((expected[0][0] - 40.0).abs() < 1e-12);
        assert!((expected[0][1] - 40.0).abs() < 1e-12);
        assert!((expected[1][0] - 30.0).abs() < 1e-12);
        assert!((expected[1][1] - 30.0).abs() < 1e-12);
    }

    #[test]
    fn table_built_from_pairs_masks_refused_and_missing() {
        let q = coded("Q", &[1, 2, 99]);
        let d = coded("D", &[1, 2, 99]);
        let q_values = [Some(1), Some(1), Some(2), Some(99), None, Some(2)];
        let d_values = [Some(1), Some(2), Some(1), Some(1), Some(2), Some(99)];
        let result = association_test(&q_values, &d_values, &q, &d).expect("inputs ok");
        let result = result.expect("enough categories");
        assert_eq!(result.observed.grand_total(), 3);
        assert_eq!(result.observed.row_codes(), &[1, 2]);
        assert_eq!(result.observed.col_codes(), &[1, 2]);
    }

    #[test]
    fn single_category_axis_yields_no_result() {
        let q = coded("Q", &[1, 2, 99]);
        let d = coded("D", &[1, 2, 99]);
        let q_values = [Some(1), Some(1), Some(1)];
        let d_values = [Some(1), Some(2), Some(1)];
        let result = association_test(&q_values, &d_values, &q, &d).expect("inputs ok");
        assert!(result.is_none());
    }

    #[test]
    fn independent_table_has_zero_chi2_and_negligible_effect() {
        let table = ContingencyTable::from_counts(
            vec![1, 2],
            vec![1, 2],
            vec![vec![10, 20], vec![20, 40]],
        );
        let result = test_table(table).expect("valid table");
        assert!(result.chi2.abs() < 1e-9);
        assert!((result.p_value - 1.0).abs() < 1e-9);
        assert_eq!(result.cramers_v, 0.0);
        assert_eq!(result.effect, EffectBand::Negligible);
        assert_eq!(result.significance, SignificanceBand::NotSignificant);
    }

    #[test]
    fn cramers_v_degenerate_cases() {
        assert_eq!(cramers_v(5.0, 0, 2, 2), 0.0);
        assert_eq!(cramers_v(5.0, 100, 1, 4), 0.0);
    }

    #[test]
    fn effect_band_thresholds_are_strict() {
        assert_eq!(EffectBand::from_v(0.5), EffectBand::Medium);
        assert_eq!(EffectBand::from_v(0.500_001), EffectBand::Large);
        assert_eq!(EffectBand::from_v(0.3), EffectBand::Small);
        assert_eq!(EffectBand::from_v(0.1), EffectBand::Negligible);
        assert_eq!(EffectBand::from_v(0.0), EffectBand::Negligible);
    }

    #[test]
    fn significance_band_thresholds_are_strict() {
        assert_eq!(SignificanceBand::from_p(0.000_999), SignificanceBand::ThreeStars);
        assert_eq!(SignificanceBand::from_p(0.001), SignificanceBand::TwoStars);
        assert_eq!(SignificanceBand::from_p(0.01), SignificanceBand::OneStar);
        assert_eq!(SignificanceBand::from_p(0.05), SignificanceBand::NotSignificant);
        assert_eq!(SignificanceBand::from_p(1.0), SignificanceBand::NotSignificant);
    }

    #[test]
    fn association_test_serializes() {
        let table = ContingencyTable::from_counts(
            vec![1, 2],
            vec![1, 2],
            vec![vec![50, 30], vec![20, 40]],
        );
        let result = test_table(table).expect("valid table");
        let json = serde_json::to_string(&result).expect("serialize result");
        let round: AssociationTest = serde_json::from_str(&json).expect("deserialize result");
        assert_eq!(round.dof, 1);
        assert_eq!(round.observed.grand_total(), 140);
    }
}
