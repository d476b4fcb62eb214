//! Change statistics for directed ERGMs.
//!
//! Every statistic computes the change in its value caused by *adding* arc
//! `i -> j` to the current graph. Delete moves are scored by removing the
//! arc first and negating the total, which is algebraically the true
//! delete delta; the statistic functions themselves never need to know.
//!
//! Statistics are grouped into four registries with uniform signatures per
//! group: structural effects (taking a decay parameter lambda), nodal
//! attribute effects (taking an attribute column index), dyadic covariates
//! (taking nothing) and attribute interactions (taking a column pair). An
//! ordered selection of statistics forms a [`ChangeStatsModel`], whose
//! length fixes the dimension of the parameter vector theta.

/// Structural change statistics (Arc, stars, triads, alternating effects)
pub mod structural;

/// Nodal attribute change statistics (binary, categorical, continuous, set)
pub mod attribute;

/// Dyadic covariate change statistics (distances)
pub mod dyadic;

/// Attribute interaction change statistics
pub mod interaction;

/// The configured statistic list and `calc_change_stats`
pub mod evaluator;

pub use attribute::{AttrStat, AttrTable};
pub use dyadic::DyadicStat;
pub use evaluator::{ChangeStatsModel, DEFAULT_LAMBDA};
pub use interaction::AttrInteractionStat;
pub use structural::StructuralStat;
