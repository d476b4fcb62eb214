//! Estimation run configuration.

/// Which move sampler drives the estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerKind {
    /// Dyad-toggle Metropolis sampler
    #[default]
    Basic,
    /// Improved Fixed Density sampler (derives the Arc parameter from its
    /// auxiliary parameter; an explicit Arc statistic is then disallowed)
    Ifd,
}

/// Scalar configuration for one estimation task.
#[derive(Debug, Clone)]
pub struct EstimationOptions {
    /// Sampler proposals per algorithm step. Default: 1000
    pub sampler_steps: usize,
    /// Iterations of Algorithm S. Default: 100
    pub s_steps: usize,
    /// Outer iterations of Algorithm EE. Default: 500
    pub ee_steps: usize,
    /// Inner iterations per outer iteration of Algorithm EE. Default: 100
    pub ee_inner_steps: usize,
    /// Step-size multiplier in Algorithm S. Default: 0.1
    pub aca_s: f64,
    /// Step-size multiplier in Algorithm EE (default update). Default: 1e-9
    pub aca_ee: f64,
    /// Bound on sd(theta)/mean(theta) used to rescale the derivative
    /// estimates each outer iteration (default update). Default: 0.01
    pub comp_c: f64,
    /// Sampler choice. Default: Basic
    pub sampler: SamplerKind,
    /// Auxiliary-parameter step constant for the IFD sampler. Default: 0.1
    pub ifd_k: f64,
    /// Use the Borisenko fixed-learning-rate update in Algorithm EE
    pub use_borisenko_update: bool,
    /// Learning rate for the Borisenko update. Default: 0.001
    pub learning_rate: f64,
    /// Minimum |theta| magnitude in the Borisenko step, so a parameter at
    /// zero still moves. Default: 0.01
    pub min_theta: f64,
    /// Conditional estimation of a snowball sample (requires zone data)
    pub use_conditional_estimation: bool,
    /// Citation-ERGM estimation conditional on terms (requires term data)
    pub citation_ergm: bool,
    /// Never sample reciprocated arcs
    pub forbid_reciprocity: bool,
    /// Allow self-loop candidates
    pub allow_loops: bool,
    /// Write trajectory rows every inner iteration, not just per outer
    pub output_all_steps: bool,
    /// RNG seed; each task offsets it by its task number
    pub seed: u64,
}

impl Default for EstimationOptions {
    fn default() -> Self {
        EstimationOptions {
            sampler_steps: 1000,
            s_steps: 100,
            ee_steps: 500,
            ee_inner_steps: 100,
            aca_s: 0.1,
            aca_ee: 1e-9,
            comp_c: 1e-2,
            sampler: SamplerKind::Basic,
            ifd_k: 0.1,
            use_borisenko_update: false,
            learning_rate: 0.001,
            min_theta: 0.01,
            use_conditional_estimation: false,
            citation_ergm: false,
            forbid_reciprocity: false,
            allow_loops: false,
            output_all_steps: false,
            seed: 42,
        }
    }
}
