//! Algorithm S: starting parameters and derivative estimates.
//!
//! Runs the sampler without committing moves (the observed network is
//! left untouched), so each iteration samples change statistics around
//! the same graph. Per iteration, for each parameter l:
//!
//! ```text
//! dzA      = delStats - addStats
//! sumStats = delStats + addStats
//! theta   += sign(dzA) * (ACA / sumStats^2) * dzA^2      (if sumStats != 0)
//! D0      += dzA^2
//! ```
//!
//! The expectation of the squared statistic change approximates the
//! derivative with respect to the parameter; `Dmean = sampler_m / D0` is
//! handed to Algorithm EE as its per-parameter step scale. A non-finite
//! `Dmean` entry (a statistic that never moved) flags model degeneracy.

use crate::trajectory::TrajectoryFiles;
use ergm_graph::Digraph;
use ergm_sampler::Sampler;
use ergm_stats::ChangeStatsModel;
use ndarray::Array1;

/// Outputs of Algorithm S.
pub struct AlgorithmSResult {
    /// Starting parameter values for Algorithm EE
    pub theta: Array1<f64>,
    /// Derivative estimates `sampler_m / D0`; non-finite entries signal a
    /// possibly degenerate model
    pub d_mean: Array1<f64>,
}

#[allow(clippy::too_many_arguments)]
pub fn algorithm_s(
    g: &mut Digraph,
    model: &ChangeStatsModel,
    sampler: &mut dyn Sampler,
    m1: usize,
    sampler_m: usize,
    aca: f64,
    arc_correction: Option<f64>,
    traj: &mut TrajectoryFiles,
) -> anyhow::Result<AlgorithmSResult> {
    let npar = model.num_params();
    let mut theta = Array1::zeros(npar);
    let mut d0 = Array1::<f64>::zeros(npar);

    for t in 0..m1 {
        let stats = sampler.run(g, model, &theta, sampler_m, false);
        for l in 0..npar {
            let dza = stats.del[l] - stats.add[l];
            let sum_stats = stats.del[l] + stats.add[l];
            d0[l] += dza * dza;
            if sum_stats != 0.0 {
                let da = aca / (sum_stats * sum_stats);
                let sign = if dza < 0.0 { -1.0 } else { 1.0 };
                theta[l] += sign * da * dza * dza;
            }
        }
        // iteration indices ramp up to 0, where Algorithm EE takes over
        let ifd_arc = arc_correction.map(|c| sampler.aux_param().unwrap_or(0.0) - c);
        traj.theta_row(
            t as i64 - m1 as i64,
            ifd_arc,
            &theta,
            stats.acceptance_rate,
        )?;
    }

    let d_mean = d0.mapv(|v| sampler_m as f64 / v);
    Ok(AlgorithmSResult { theta, d_mean })
}
