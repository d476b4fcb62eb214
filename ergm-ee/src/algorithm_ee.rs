//! Algorithm EE: the main estimation loop.
//!
//! The sampler now commits moves to the live graph, and `dzA` accumulates
//! `addStats - delStats` across the entire run (it is never reset). Per
//! inner step, for each parameter l, theta moves *against* the sign of the
//! accumulated difference:
//!
//! ```text
//! default:   theta -= sign(dzA) * (D0 * ACA) * dzA^2
//! Borisenko: theta -= sign(dzA) * learningRate * max(|theta|, minTheta)
//! ```
//!
//! Under the default update, after each outer iteration the per-parameter
//! derivative estimates D0 are rescaled from the spread of theta over the
//! inner trajectory, which bounds the parameter variance across outer
//! iterations.

use crate::trajectory::TrajectoryFiles;
use ergm_graph::Digraph;
use ergm_sampler::Sampler;
use ergm_stats::ChangeStatsModel;
use ndarray::{Array1, Array2};

/// Minimum |mean(theta)| used in the variance adjustment, so a parameter
/// hovering at zero cannot zero the rescale denominator. Not the same
/// constant as the configurable Borisenko `min_theta`.
pub const THETA_MEAN_CLAMP: f64 = 0.1;

/// sd(theta) below which the derivative estimate is left alone.
pub const SD_ADJUST_THRESHOLD: f64 = 1e-10;

#[allow(clippy::too_many_arguments)]
pub fn algorithm_ee(
    g: &mut Digraph,
    model: &ChangeStatsModel,
    sampler: &mut dyn Sampler,
    theta: &mut Array1<f64>,
    d0: &mut Array1<f64>,
    mouter: usize,
    minner: usize,
    sampler_m: usize,
    aca: f64,
    comp_c: f64,
    borisenko: Option<(f64, f64)>,
    output_all_steps: bool,
    arc_correction: Option<f64>,
    traj: &mut TrajectoryFiles,
) -> anyhow::Result<()> {
    let npar = model.num_params();
    let mut dza = Array1::<f64>::zeros(npar);
    let mut theta_matrix = Array2::<f64>::zeros((npar, minner));
    let mut t: i64 = 0;

    for _touter in 0..mouter {
        for tinner in 0..minner {
            let stats = sampler.run(g, model, theta, sampler_m, true);
            for l in 0..npar {
                dza[l] += stats.add[l] - stats.del[l];
                let step = match borisenko {
                    Some((learning_rate, min_theta)) => {
                        let sign = if dza[l] < 0.0 { 1.0 } else { -1.0 };
                        sign * learning_rate * theta[l].abs().max(min_theta)
                    }
                    None => {
                        let da = d0[l] * aca;
                        let sign = if dza[l] < 0.0 { 1.0 } else { -1.0 };
                        sign * da * dza[l] * dza[l]
                    }
                };
                theta[l] += step;
                theta_matrix[[l, tinner]] = theta[l];
            }
            if output_all_steps || tinner == 0 {
                let ifd_arc = arc_correction.map(|c| sampler.aux_param().unwrap_or(0.0) - c);
                // the Arc statistic difference under IFD is just Ndel - Nadd
                let dz_arc = arc_correction.map(|_| stats.dz_arc);
                traj.theta_row(t, ifd_arc, theta, stats.acceptance_rate)?;
                traj.dza_row(t, dz_arc, &dza)?;
            }
            t += 1;
        }

        if borisenko.is_none() {
            // rescale the derivative estimates from the spread of theta
            // over the inner iterations, bounding its variance
            for l in 0..npar {
                let row = theta_matrix.row(l);
                let (mean, sd) = mean_and_sd(row.as_slice().expect("row is contiguous"));
                let mean_abs = mean.abs().max(THETA_MEAN_CLAMP);
                debug_assert!(sd >= 0.0);
                if sd > SD_ADJUST_THRESHOLD {
                    d0[l] *= (comp_c / (sd / mean_abs)).sqrt();
                }
            }
        }
        traj.flush()?;
    }
    Ok(())
}

/// Mean and sample standard deviation.
fn mean_and_sd(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1) as f64;
    (mean, var.sqrt())
}
