//! Result-formatting rules owned by the engine.
//!
//! The presentation layer renders whatever it gets; the precision rules
//! (1 decimal for distribution percentages, 2 for CI columns, and the
//! p-value notation switch at 0.001) live here.

/// Round to 1 decimal place (distribution and cross-tab percentages).
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to 2 decimal places (CI percentages and standard errors).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a p-value for display.
///
/// Values below 0.001 use scientific notation with 2 decimal digits;
/// everything else is fixed with 4 decimals.
pub fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        format!("{p:.2e}")
    } else {
        format!("{p:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.65), 66.7);
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn p_value_fixed_notation() {
        insta::assert_snapshot!(format_p_value(0.25), @"0.2500");
        insta::assert_snapshot!(format_p_value(0.0234), @"0.0234");
        // The switch to scientific notation is strictly below 0.001
        insta::assert_snapshot!(format_p_value(0.001), @"0.0010");
    }

    #[test]
    fn p_value_scientific_notation() {
        insta::assert_snapshot!(format_p_value(0.0005), @"5.00e-4");
        insta::assert_snapshot!(format_p_value(0.000_012_3), @"1.23e-5");
    }
}
