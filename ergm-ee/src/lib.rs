//! Equilibrium-expectation (EE) estimation of ERGM parameters.
//!
//! Two stochastic-approximation algorithms share a move sampler:
//! Algorithm S calibrates starting parameters and derivative estimates
//! without committing moves to the network, then Algorithm EE runs the
//! sampler on the live graph and nudges each parameter against its
//! accumulated observed-minus-sampled statistic difference until the
//! model's expectation matches the observed network.
//!
//! References:
//!
//! - Byshkin M, Stivala A, Mira A, Robins G, Lomi A (2018). "Fast
//!   maximum likelihood estimation via equilibrium expectation for
//!   large network data". Scientific Reports 8:11509.
//! - Borisenko A, Byshkin M, Lomi A (2019). "A simple algorithm for
//!   scalable Monte Carlo inference". arXiv:1901.00533.
//! - Stivala A, Robins G, Lomi A (2020). "Exponential random graph model
//!   parameter estimation for very large directed networks". PLoS ONE
//!   15(1):e0227804.

/// Run configuration with defaults
pub mod options;

/// Theta and dzA trajectory output files
pub mod trajectory;

/// Algorithm S: starting parameters and derivative estimates
pub mod algorithm_s;

/// Algorithm EE: the main estimation loop
pub mod algorithm_ee;

/// Validation, orchestration and degeneracy detection
pub mod estimate;

/// Drawing networks from a fitted or supplied model
pub mod simulate;

pub use estimate::{ee_estimate, EstimationOutcome};
pub use options::{EstimationOptions, SamplerKind};
pub use simulate::simulate_ergm;
pub use trajectory::TrajectoryFiles;
