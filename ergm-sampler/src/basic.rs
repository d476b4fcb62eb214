//! Basic dyad-toggle Metropolis sampler.

use crate::proposal::propose_toggle;
use crate::{check_restriction, metropolis_step, Sampler, SamplerOptions, SamplerStats};
use ergm_graph::Digraph;
use ergm_stats::ChangeStatsModel;
use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Metropolis sampler proposing uniformly random dyad toggles.
///
/// Because the move type follows the state of the drawn dyad, delete
/// proposals arrive with probability proportional to the arc count, which
/// is what lets the equilibrium-expectation update drive a density (Arc)
/// parameter to the logit of the observed density.
pub struct BasicSampler {
    opts: SamplerOptions,
    rng: SmallRng,
}

impl BasicSampler {
    pub fn new(opts: SamplerOptions, seed: u64) -> Self {
        BasicSampler {
            opts,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Sampler for BasicSampler {
    fn run(
        &mut self,
        g: &mut Digraph,
        model: &ChangeStatsModel,
        theta: &Array1<f64>,
        m: usize,
        perform_move: bool,
    ) -> SamplerStats {
        check_restriction(g, &self.opts);
        let npar = model.num_params();
        let mut add = Array1::zeros(npar);
        let mut del = Array1::zeros(npar);
        let mut changestats = Array1::zeros(npar);
        let mut accepted = 0usize;
        let mut nadd = 0i64;
        let mut ndel = 0i64;

        for _ in 0..m {
            let (i, j, is_delete) = propose_toggle(g, &self.opts, &mut self.rng);
            if is_delete {
                ndel += 1;
            } else {
                nadd += 1;
            }
            if metropolis_step(
                g,
                model,
                theta,
                i,
                j,
                is_delete,
                0.0,
                perform_move,
                &mut self.rng,
                &mut changestats,
                &mut add,
                &mut del,
            ) {
                accepted += 1;
            }
        }

        SamplerStats {
            add,
            del,
            acceptance_rate: accepted as f64 / m as f64,
            dz_arc: (ndel - nadd) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergm_graph::NodeId;
    use ergm_stats::StructuralStat;

    fn arc_only_model() -> ChangeStatsModel {
        let mut model = ChangeStatsModel::new();
        model.add_structural(StructuralStat::Arc, 0.0);
        model
    }

    /// Four nodes, Arc statistic, theta = 0: with `exp(0) = 1` every toggle
    /// is accepted, and the arc count must stay within [0, 12].
    #[test]
    fn test_four_node_scenario() {
        let mut g = Digraph::new(4);
        let model = arc_only_model();
        let theta = Array1::zeros(1);
        let mut sampler = BasicSampler::new(SamplerOptions::default(), 42);

        for _ in 0..20 {
            let stats = sampler.run(&mut g, &model, &theta, 100, true);
            assert!(stats.acceptance_rate >= 0.5 && stats.acceptance_rate <= 1.0);
            assert!(g.num_arcs() <= 12, "arc count {} out of range", g.num_arcs());
        }
    }

    #[test]
    fn test_acceptance_rate_bounds() {
        let mut g = Digraph::new(12);
        let model = arc_only_model();
        let mut sampler = BasicSampler::new(SamplerOptions::default(), 7);
        for theta_val in [-2.0, -0.5, 0.0, 0.5] {
            let theta = Array1::from(vec![theta_val]);
            let stats = sampler.run(&mut g, &model, &theta, 500, true);
            assert!(stats.acceptance_rate >= 0.0 && stats.acceptance_rate <= 1.0);
        }
    }

    /// With theta strongly negative the graph drains and every further add
    /// is rejected: the graph, matrices and pools must be left untouched.
    #[test]
    fn test_rejected_proposals_conserve_graph() {
        let mut g = Digraph::new(8);
        let model = arc_only_model();
        let theta = Array1::from(vec![-60.0]);
        let mut sampler = BasicSampler::new(SamplerOptions::default(), 3);
        // drain to the empty graph: deletes score +60, adds score -60
        g.insert_arc(0, 1);
        g.insert_arc(2, 3);
        sampler.run(&mut g, &model, &theta, 200, true);
        assert_eq!(g.num_arcs(), 0);

        let snapshot = g.clone();
        let stats = sampler.run(&mut g, &model, &theta, 200, true);
        assert_eq!(stats.acceptance_rate, 0.0);
        assert_eq!(g, snapshot);
    }

    /// Algorithm S leaves the observed network untouched: with
    /// `perform_move` false even accepted moves must be rolled back.
    #[test]
    fn test_perform_move_false_restores_graph() {
        let mut g = Digraph::new(10);
        for v in 1..6 {
            g.insert_arc(0, v as NodeId);
            g.insert_arc(v as NodeId, (v + 1) as NodeId);
        }
        let model = arc_only_model();
        let theta = Array1::zeros(1);
        let snapshot = g.clone();
        let mut sampler = BasicSampler::new(SamplerOptions::default(), 11);
        let stats = sampler.run(&mut g, &model, &theta, 400, false);
        assert!(stats.acceptance_rate > 0.0);
        // every delete is rolled back through its removal token, so the
        // graph is restored exactly, pool order included
        assert_eq!(g, snapshot);
    }
}
