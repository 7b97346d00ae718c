//! Inclusion masks and input validation shared by the calculators.
//!
//! A record enters a weighted base only when its response is present, its
//! weight is present, and (under [`RefusedPolicy::Exclude`]) the response is
//! not the reserved refused code. Weights themselves are never filtered by
//! refused-code logic; they ride along with the responses they are paired
//! with.

use crate::error::{Result, StatsError};

/// Whether the reserved refused code participates in a percentage base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefusedPolicy {
    /// Refused answers are excluded from the base (the standard treatment).
    #[default]
    Exclude,
    /// Refused answers are retained as a category of their own.
    Include,
}

/// Fails unless two parallel inputs have the same length.
pub(crate) fn ensure_parallel(left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(StatsError::LengthMismatch { left, right });
    }
    Ok(())
}

/// Fails on the first negative or non-finite weight.
///
/// Missing weights are fine (the mask excludes those records); a present but
/// invalid weight is a caller error and must not silently poison the sums.
pub(crate) fn validate_weights(weights: &[Option<f64>]) -> Result<()> {
    for (index, weight) in weights.iter().enumerate() {
        if let Some(value) = *weight
            && (!value.is_finite() || value < 0.0)
        {
            return Err(StatsError::InvalidWeight { index, value });
        }
    }
    Ok(())
}

/// Applies the inclusion mask to one record, yielding its code and weight.
pub(crate) fn include(
    value: Option<i64>,
    weight: Option<f64>,
    refused_code: i64,
    policy: RefusedPolicy,
) -> Option<(i64, f64)> {
    let code = value?;
    let weight = weight?;
    if policy == RefusedPolicy::Exclude && code == refused_code {
        return None;
    }
    Some((code, weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_or_weight_excluded() {
        assert_eq!(include(None, Some(1.0), 99, RefusedPolicy::Exclude), None);
        assert_eq!(include(Some(1), None, 99, RefusedPolicy::Exclude), None);
    }

    #[test]
    fn refused_policy_controls_sentinel() {
        assert_eq!(include(Some(99), Some(2.0), 99, RefusedPolicy::Exclude), None);
        assert_eq!(
            include(Some(99), Some(2.0), 99, RefusedPolicy::Include),
            Some((99, 2.0))
        );
        assert_eq!(
            include(Some(1), Some(2.0), 99, RefusedPolicy::Exclude),
            Some((1, 2.0))
        );
    }

    #[test]
    fn negative_weight_rejected() {
        let err = validate_weights(&[Some(1.0), Some(-0.5)]).unwrap_err();
        assert!(matches!(err, StatsError::InvalidWeight { index: 1, .. }));
    }

    #[test]
    fn non_finite_weight_rejected() {
        assert!(validate_weights(&[Some(f64::NAN)]).is_err());
        assert!(validate_weights(&[Some(f64::INFINITY)]).is_err());
        assert!(validate_weights(&[None, Some(0.0)]).is_ok());
    }

    #[test]
    fn length_mismatch_rejected() {
        assert!(matches!(
            ensure_parallel(3, 4),
            Err(StatsError::LengthMismatch { left: 3, right: 4 })
        ));
        assert!(ensure_parallel(4, 4).is_ok());
    }
}
