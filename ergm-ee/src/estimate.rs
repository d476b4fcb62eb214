//! Validation, orchestration and degeneracy detection for one estimation
//! task: Algorithm S, the degeneracy gate, then Algorithm EE.

use crate::algorithm_ee::algorithm_ee;
use crate::algorithm_s::{algorithm_s, AlgorithmSResult};
use crate::options::{EstimationOptions, SamplerKind};
use crate::trajectory::TrajectoryFiles;
use anyhow::bail;
use ergm_graph::Digraph;
use ergm_sampler::{arc_correction, BasicSampler, IfdSampler, MoveRestriction, Sampler, SamplerOptions};
use ergm_stats::ChangeStatsModel;
use log::{info, warn};
use ndarray::Array1;
use std::time::Instant;

/// Result of one estimation task.
pub enum EstimationOutcome {
    /// Final parameter estimates from Algorithm EE
    Converged(Array1<f64>),
    /// A derivative estimate was non-finite after Algorithm S; Algorithm EE
    /// was skipped for this task (other tasks are unaffected)
    Degenerate,
}

/// Reject invalid option combinations before any sampling, and warn about
/// configured values the selected algorithm variant will never read.
pub fn validate(
    g: &Digraph,
    model: &ChangeStatsModel,
    opts: &EstimationOptions,
) -> anyhow::Result<()> {
    if model.num_params() == 0 {
        bail!("no statistics configured");
    }
    if opts.sampler == SamplerKind::Ifd && model.has_arc_param() {
        bail!(
            "cannot include the Arc parameter when using the IFD sampler; \
             it is computed from the auxiliary parameter"
        );
    }
    if opts.use_conditional_estimation && opts.citation_ergm {
        bail!("conditional estimation and citation ERGM cannot be combined");
    }
    if opts.use_conditional_estimation {
        let Some(sb) = g.snowball() else {
            bail!("conditional estimation requested but no zones specified");
        };
        if sb.max_zone < 1 {
            bail!("conditional estimation requested but only one zone");
        }
    }
    if opts.citation_ergm && g.citation().is_none() {
        bail!("citation ERGM requested but no terms specified");
    }
    if (opts.use_conditional_estimation || opts.citation_ergm)
        && (opts.forbid_reciprocity || opts.allow_loops)
    {
        bail!("reciprocity/loop options are not supported under conditional sampling");
    }

    let defaults = EstimationOptions::default();
    if opts.sampler != SamplerKind::Ifd && opts.ifd_k != defaults.ifd_k {
        warn!(
            "ifd_K is set to {} but the IFD sampler is not used",
            opts.ifd_k
        );
    }
    if opts.use_borisenko_update {
        if opts.aca_ee != defaults.aca_ee {
            warn!(
                "ACA_EE is set to {} but the Borisenko update ignores it",
                opts.aca_ee
            );
        }
        if opts.comp_c != defaults.comp_c {
            warn!(
                "compC is set to {} but the Borisenko update ignores it",
                opts.comp_c
            );
        }
    } else {
        if opts.learning_rate != defaults.learning_rate {
            warn!(
                "learningRate is set to {} but the Borisenko update is not used",
                opts.learning_rate
            );
        }
        if opts.min_theta != defaults.min_theta {
            warn!(
                "minTheta is set to {} but the Borisenko update is not used",
                opts.min_theta
            );
        }
    }
    Ok(())
}

pub(crate) fn sampler_options(opts: &EstimationOptions) -> SamplerOptions {
    let restriction = if opts.use_conditional_estimation {
        MoveRestriction::Snowball
    } else if opts.citation_ergm {
        MoveRestriction::Citation
    } else {
        MoveRestriction::None
    };
    SamplerOptions {
        restriction,
        forbid_reciprocity: opts.forbid_reciprocity,
        allow_loops: opts.allow_loops,
    }
}

pub(crate) fn build_sampler(opts: &EstimationOptions, tasknum: u32) -> Box<dyn Sampler> {
    let seed = opts.seed.wrapping_add(tasknum as u64);
    let sampler_opts = sampler_options(opts);
    match opts.sampler {
        SamplerKind::Basic => Box::new(BasicSampler::new(sampler_opts, seed)),
        SamplerKind::Ifd => Box::new(IfdSampler::new(sampler_opts, opts.ifd_k, seed)),
    }
}

/// Estimate ERGM parameters with Algorithm S followed by Algorithm EE.
///
/// The graph is mutated in place by Algorithm EE; after a successful run
/// it holds the final state of the chain (writable as a simulated
/// network). Trajectory headers must already have been written.
pub fn ee_estimate(
    g: &mut Digraph,
    model: &ChangeStatsModel,
    opts: &EstimationOptions,
    tasknum: u32,
    traj: &mut TrajectoryFiles,
) -> anyhow::Result<EstimationOutcome> {
    validate(g, model, opts)?;

    let mut sampler = build_sampler(opts, tasknum);
    let sampler_opts = sampler_options(opts);
    let arc_corr = match opts.sampler {
        SamplerKind::Ifd => Some(arc_correction(g, &sampler_opts)),
        SamplerKind::Basic => None,
    };

    if opts.use_borisenko_update {
        info!(
            "task {}: ACA_S = {}, Borisenko update learningRate = {}, minTheta = {}, \
             samplerSteps = {}, Ssteps = {}, EEsteps = {}, EEinnerSteps = {}",
            tasknum,
            opts.aca_s,
            opts.learning_rate,
            opts.min_theta,
            opts.sampler_steps,
            opts.s_steps,
            opts.ee_steps,
            opts.ee_inner_steps
        );
    } else {
        info!(
            "task {}: ACA_S = {}, ACA_EE = {}, compC = {}, samplerSteps = {}, \
             Ssteps = {}, EEsteps = {}, EEinnerSteps = {}",
            tasknum,
            opts.aca_s,
            opts.aca_ee,
            opts.comp_c,
            opts.sampler_steps,
            opts.s_steps,
            opts.ee_steps,
            opts.ee_inner_steps
        );
    }
    if let Some(corr) = arc_corr {
        info!(
            "task {}: IFD sampler ifd_K = {}, arcCorrection = {}",
            tasknum, opts.ifd_k, corr
        );
    }
    if opts.use_conditional_estimation {
        info!(
            "task {}: doing conditional estimation of snowball sample",
            tasknum
        );
    }
    if opts.citation_ergm {
        info!("task {}: citation ERGM estimation conditional on term", tasknum);
    }
    if opts.forbid_reciprocity {
        info!(
            "task {}: estimation is conditional on no reciprocated arcs",
            tasknum
        );
    }

    info!("task {}: running Algorithm S...", tasknum);
    let start = Instant::now();
    let AlgorithmSResult { mut theta, d_mean } = algorithm_s(
        g,
        model,
        sampler.as_mut(),
        opts.s_steps,
        opts.sampler_steps,
        opts.aca_s,
        arc_corr,
        traj,
    )?;
    traj.flush()?;
    info!(
        "task {}: Algorithm S took {:.2} s",
        tasknum,
        start.elapsed().as_secs_f64()
    );
    info!("task {}: theta = {:?}", tasknum, theta.as_slice().unwrap_or(&[]));
    info!(
        "task {}: Dmean = {:?}",
        tasknum,
        d_mean.as_slice().unwrap_or(&[])
    );

    // degeneracy gate: a statistic whose squared change never accumulated
    // gives an infinite derivative estimate
    let mut degenerate = false;
    for (l, v) in d_mean.iter().enumerate() {
        if !v.is_finite() {
            warn!(
                "task {}: D0 is not finite for parameter {}, model may be degenerate, \
                 not continuing this run",
                tasknum, l
            );
            degenerate = true;
        }
    }
    if degenerate {
        return Ok(EstimationOutcome::Degenerate);
    }

    let mut d0 = d_mean;
    let borisenko = if opts.use_borisenko_update {
        Some((opts.learning_rate, opts.min_theta))
    } else {
        None
    };

    info!("task {}: running Algorithm EE...", tasknum);
    let start = Instant::now();
    algorithm_ee(
        g,
        model,
        sampler.as_mut(),
        &mut theta,
        &mut d0,
        opts.ee_steps,
        opts.ee_inner_steps,
        opts.sampler_steps,
        opts.aca_ee,
        opts.comp_c,
        borisenko,
        opts.output_all_steps,
        arc_corr,
        traj,
    )?;
    info!(
        "task {}: Algorithm EE took {:.2} s",
        tasknum,
        start.elapsed().as_secs_f64()
    );

    Ok(EstimationOutcome::Converged(theta))
}
