//! MCMC move samplers for ERGM estimation.
//!
//! Two interchangeable strategies over the same proposal/accept loop:
//!
//! - [`BasicSampler`] draws a uniformly random dyad from the applicable
//!   candidate space and toggles it, so delete proposals arrive in
//!   proportion to the current arc count;
//! - [`IfdSampler`] alternates add and delete moves (a persistent flag,
//!   flipped on every acceptance) and self-tunes an auxiliary parameter to
//!   hold the chain near the observed density.
//!
//! Both support snowball-conditional and citation-conditional move
//! restrictions, reciprocity forbidding and (unrestricted only) self-loops.
//! A move is accepted with probability `min(1, exp(total))`; a delete is
//! applied tentatively before scoring and rolled back exactly on rejection.

use ergm_graph::{Digraph, NodeId};
use ergm_stats::ChangeStatsModel;
use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::Rng;

/// Basic dyad-toggle sampler
pub mod basic;

/// Improved Fixed Density sampler with auxiliary parameter
pub mod ifd;

/// Candidate selection for all move restriction regimes
pub mod proposal;

pub use basic::BasicSampler;
pub use ifd::{arc_correction, IfdSampler};

/// Which part of the graph the sampler may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveRestriction {
    /// Any dyad
    #[default]
    None,
    /// Snowball conditional estimation: only arcs between inner-wave nodes,
    /// no wave skipping, no deleting a last link to the preceding wave
    Snowball,
    /// Citation ERGM: only arcs sent from the most recent term
    Citation,
}

/// Move-generation options shared by both samplers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SamplerOptions {
    pub restriction: MoveRestriction,
    /// Never propose an add that would create a reciprocated dyad
    pub forbid_reciprocity: bool,
    /// Allow self-loop candidates (unrestricted sampling only)
    pub allow_loops: bool,
}

/// Accumulated results of one sampler invocation over `m` proposals.
#[derive(Debug, Clone)]
pub struct SamplerStats {
    /// Summed change statistics of accepted add moves
    pub add: Array1<f64>,
    /// Summed change statistics of accepted delete moves
    pub del: Array1<f64>,
    /// Accepted proposals / m
    pub acceptance_rate: f64,
    /// Delete proposals minus add proposals (the Arc statistic difference
    /// reported by the IFD sampler)
    pub dz_arc: f64,
}

/// A Metropolis-style ERGM move sampler.
pub trait Sampler {
    /// Run `m` proposals against the graph, accumulating add- and
    /// delete-move statistics. With `perform_move` false the graph is
    /// returned to its entry state (accepted moves are rolled back after
    /// accumulation), which is how Algorithm S runs.
    fn run(
        &mut self,
        g: &mut Digraph,
        model: &ChangeStatsModel,
        theta: &Array1<f64>,
        m: usize,
        perform_move: bool,
    ) -> SamplerStats;

    /// The IFD auxiliary parameter, if this sampler carries one.
    fn aux_param(&self) -> Option<f64> {
        None
    }
}

/// Contract checks shared by both samplers; violations are programming
/// errors, not user-recoverable conditions.
pub(crate) fn check_restriction(g: &Digraph, opts: &SamplerOptions) {
    match opts.restriction {
        MoveRestriction::None => {}
        MoveRestriction::Snowball => {
            assert!(
                g.snowball().is_some(),
                "snowball restriction without zone data"
            );
            assert!(!opts.forbid_reciprocity && !opts.allow_loops);
        }
        MoveRestriction::Citation => {
            assert!(g.citation().is_some(), "citation restriction without terms");
            assert!(!opts.forbid_reciprocity && !opts.allow_loops);
        }
    }
}

/// Score one candidate toggle and resolve it.
///
/// A delete candidate is removed before scoring so the evaluator always
/// sees an add; on rejection (or when the caller is not committing moves)
/// the removal token restores the graph exactly. Accepted moves have their
/// statistic vector added to the matching accumulator.
#[allow(clippy::too_many_arguments)]
pub(crate) fn metropolis_step(
    g: &mut Digraph,
    model: &ChangeStatsModel,
    theta: &Array1<f64>,
    i: NodeId,
    j: NodeId,
    is_delete: bool,
    aux_term: f64,
    perform_move: bool,
    rng: &mut SmallRng,
    changestats: &mut Array1<f64>,
    add_stats: &mut Array1<f64>,
    del_stats: &mut Array1<f64>,
) -> bool {
    let removal = if is_delete {
        Some(g.remove_arc(i, j))
    } else {
        None
    };
    let total = model.calc_change_stats(g, i, j, theta, is_delete, changestats) + aux_term;

    if rng.random::<f64>() < total.exp() {
        match removal {
            // Algorithm S scores moves without keeping them
            Some(removal) if !perform_move => g.undo_removal(removal),
            Some(_) => {}
            None if perform_move => g.insert_arc(i, j),
            None => {}
        }
        if is_delete {
            *del_stats += &*changestats;
        } else {
            *add_stats += &*changestats;
        }
        true
    } else {
        if let Some(removal) = removal {
            g.undo_removal(removal);
        }
        false
    }
}
