//! Survey-weighted statistical aggregation engine.
//!
//! Four calculators over parallel response/weight slices:
//!
//! - [`weighted_distribution`] — one variable's weighted percentage
//!   distribution.
//! - [`weighted_crosstab`] — a question's distribution conditioned on each
//!   category of a demographic variable, normalized independently per
//!   demographic category.
//! - [`association_test`] — chi-square test of independence on *unweighted*
//!   counts with Cramér's V and qualitative bands. The unweighted basis is a
//!   deliberate, labeled simplification; it is not a design-based test.
//! - [`weighted_proportion_ci`] — weighted proportions with Wald 95%
//!   intervals using a design-effect-corrected effective sample size.
//!
//! All functions are pure and synchronous: they never touch I/O, never log,
//! and detected precondition violations fail loudly instead of producing
//! substituted numbers. Degenerate-but-defined cases (a zero weighted base)
//! return zero-valued rows rather than dividing by zero.

pub mod association;
pub mod ci;
pub mod crosstab;
pub mod distribution;
pub mod error;
pub mod format;
pub mod mask;
pub mod special;

pub use association::{
    AssociationTest, ContingencyTable, EffectBand, SignificanceBand, association_test,
};
pub use ci::{CiTable, ProportionCi, weighted_proportion_ci};
pub use crosstab::{CrosstabCell, weighted_crosstab};
pub use distribution::{CategoryShare, weighted_distribution};
pub use error::{Result, StatsError};
pub use format::format_p_value;
pub use mask::RefusedPolicy;
