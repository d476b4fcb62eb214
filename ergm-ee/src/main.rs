//! Command-line driver for ERGM estimation and simulation.
//!
//! Output files get a `_<task>` suffix so independent tasks (separate
//! processes, e.g. repeated chains) never collide; the task number is an
//! opaque label.

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use ergm_ee::{
    ee_estimate, simulate_ergm, EstimationOptions, EstimationOutcome, SamplerKind, TrajectoryFiles,
};
use ergm_graph::{io, Digraph};
use ergm_stats::ChangeStatsModel;
use log::info;
use ndarray::Array1;

/// Equilibrium-expectation estimation of exponential random graph models
#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate ERGM parameters for an observed network
    Estimate(EstimateArgs),

    /// Draw a network from an ERGM with supplied parameters
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Clone)]
struct InputFiles {
    /// binary node attribute file (header row of names, `NA` for missing)
    #[arg(long)]
    binattr_file: Option<String>,

    /// categorical node attribute file
    #[arg(long)]
    catattr_file: Option<String>,

    /// continuous node attribute file (`latitude`/`longitude` and `x`/`y`
    /// columns feed the distance covariates)
    #[arg(long)]
    contattr_file: Option<String>,

    /// set-valued node attribute file (comma-separated codes, `none`, `NA`)
    #[arg(long)]
    setattr_file: Option<String>,

    /// snowball sampling zone file (one wave number per node)
    #[arg(long)]
    zone_file: Option<String>,

    /// citation term file (one time period per node)
    #[arg(long)]
    term_file: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct StatSpecs {
    /// structural statistic, e.g. `Arc` or `AltInStars(2.0)`; repeatable
    #[arg(long = "struct-param")]
    struct_params: Vec<String>,

    /// attribute statistic with its column, e.g. `Sender(gender)`; repeatable
    #[arg(long = "attr-param")]
    attr_params: Vec<String>,

    /// dyadic covariate statistic, e.g. `GeoDistance`; repeatable
    #[arg(long = "dyadic-param")]
    dyadic_params: Vec<String>,

    /// attribute interaction, e.g. `MatchingInteraction(dept,city)`; repeatable
    #[arg(long = "attr-interaction-param")]
    attr_interaction_params: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct AlgorithmArgs {
    /// sampler proposals per algorithm step
    #[arg(long, default_value_t = 1000)]
    sampler_steps: usize,

    /// iterations of Algorithm S
    #[arg(long, default_value_t = 100)]
    s_steps: usize,

    /// outer iterations of Algorithm EE
    #[arg(long, default_value_t = 500)]
    ee_steps: usize,

    /// inner iterations per outer iteration of Algorithm EE
    #[arg(long, default_value_t = 100)]
    ee_inner_steps: usize,

    /// step-size multiplier in Algorithm S
    #[arg(long, default_value_t = 0.1)]
    aca_s: f64,

    /// step-size multiplier in Algorithm EE
    #[arg(long, default_value_t = 1e-9)]
    aca_ee: f64,

    /// bound on sd(theta)/mean(theta) for the variance adjustment
    #[arg(long, default_value_t = 1e-2)]
    comp_c: f64,

    /// use the IFD sampler instead of the basic sampler
    #[arg(long)]
    ifd: bool,

    /// auxiliary-parameter step constant for the IFD sampler
    #[arg(long, default_value_t = 0.1)]
    ifd_k: f64,

    /// use the Borisenko fixed-learning-rate update in Algorithm EE
    #[arg(long)]
    borisenko: bool,

    /// learning rate for the Borisenko update
    #[arg(long, default_value_t = 0.001)]
    learning_rate: f64,

    /// minimum |theta| magnitude in the Borisenko step
    #[arg(long, default_value_t = 0.01)]
    min_theta: f64,

    /// conditional estimation of a snowball sample (needs --zone-file)
    #[arg(long)]
    conditional: bool,

    /// citation ERGM conditional on terms (needs --term-file)
    #[arg(long)]
    citation: bool,

    /// forbid reciprocated arcs in the sampler
    #[arg(long)]
    forbid_reciprocity: bool,

    /// allow self-loops in the sampler
    #[arg(long)]
    allow_loops: bool,

    /// RNG seed (offset by the task number)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// opaque task label used in output file naming
    #[arg(long, default_value_t = 0)]
    task: u32,
}

#[derive(Args, Debug, Clone)]
struct EstimateArgs {
    /// Pajek-style arc list of the observed network
    arclist_file: String,

    #[command(flatten)]
    inputs: InputFiles,

    #[command(flatten)]
    stats: StatSpecs,

    #[command(flatten)]
    algorithm: AlgorithmArgs,

    /// write theta/dzA rows every inner iteration, not just per outer
    #[arg(long)]
    output_all_steps: bool,

    /// theta trajectory file prefix
    #[arg(long, default_value = "theta_values")]
    theta_prefix: String,

    /// dzA trajectory file prefix
    #[arg(long, default_value = "dzA_values")]
    dza_prefix: String,

    /// write the final sampled network as an arc list
    #[arg(long)]
    output_simulated_network: bool,

    /// simulated network file prefix
    #[arg(long, default_value = "sim")]
    sim_prefix: String,
}

#[derive(Args, Debug, Clone)]
struct SimulateArgs {
    /// number of nodes in the simulated network
    num_nodes: usize,

    /// theta value per configured statistic, in order; repeatable
    #[arg(long = "theta", allow_hyphen_values = true)]
    theta: Vec<f64>,

    /// arc list to start the chain from (defaults to the empty graph)
    #[arg(long)]
    start_arclist_file: Option<String>,

    #[command(flatten)]
    inputs: InputFiles,

    #[command(flatten)]
    stats: StatSpecs,

    #[command(flatten)]
    algorithm: AlgorithmArgs,

    /// simulated network file prefix
    #[arg(long, default_value = "sim")]
    sim_prefix: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let status = match &cli.commands {
        Commands::Estimate(args) => run_estimate(args.clone())?,
        Commands::Simulate(args) => run_simulate(args.clone())?,
    };
    if status != 0 {
        std::process::exit(status);
    }
    Ok(())
}

fn estimation_options(a: &AlgorithmArgs, output_all_steps: bool) -> EstimationOptions {
    EstimationOptions {
        sampler_steps: a.sampler_steps,
        s_steps: a.s_steps,
        ee_steps: a.ee_steps,
        ee_inner_steps: a.ee_inner_steps,
        aca_s: a.aca_s,
        aca_ee: a.aca_ee,
        comp_c: a.comp_c,
        sampler: if a.ifd {
            SamplerKind::Ifd
        } else {
            SamplerKind::Basic
        },
        ifd_k: a.ifd_k,
        use_borisenko_update: a.borisenko,
        learning_rate: a.learning_rate,
        min_theta: a.min_theta,
        use_conditional_estimation: a.conditional,
        citation_ergm: a.citation,
        forbid_reciprocity: a.forbid_reciprocity,
        allow_loops: a.allow_loops,
        output_all_steps,
        seed: a.seed,
    }
}

fn load_inputs(g: &mut Digraph, inputs: &InputFiles) -> anyhow::Result<()> {
    if let Some(f) = &inputs.binattr_file {
        io::load_binary_attributes(g, f)?;
    }
    if let Some(f) = &inputs.catattr_file {
        io::load_categorical_attributes(g, f)?;
    }
    if let Some(f) = &inputs.contattr_file {
        io::load_continuous_attributes(g, f)?;
    }
    if let Some(f) = &inputs.setattr_file {
        io::load_set_attributes(g, f)?;
    }
    if let Some(f) = &inputs.zone_file {
        io::load_zones(g, f)?;
    }
    if let Some(f) = &inputs.term_file {
        io::load_terms(g, f)?;
    }
    Ok(())
}

fn build_model(g: &Digraph, stats: &StatSpecs) -> anyhow::Result<ChangeStatsModel> {
    ChangeStatsModel::from_specs(
        g,
        &stats.struct_params,
        &stats.attr_params,
        &stats.dyadic_params,
        &stats.attr_interaction_params,
    )
}

fn run_estimate(args: EstimateArgs) -> anyhow::Result<i32> {
    let task = args.algorithm.task;
    info!(
        "task {}: loading arc list from {} and building two-path matrices...",
        task, args.arclist_file
    );
    let mut g = io::load_arclist(&args.arclist_file)?;
    load_inputs(&mut g, &args.inputs)?;
    info!(
        "task {}: {} nodes, {} arcs, density {}",
        task,
        g.num_nodes(),
        g.num_arcs(),
        g.density()
    );

    let model = build_model(&g, &args.stats)?;
    let opts = estimation_options(&args.algorithm, args.output_all_steps);

    let theta_file = format!("{}_{}.txt", args.theta_prefix, task);
    let dza_file = format!("{}_{}.txt", args.dza_prefix, task);
    let mut traj = TrajectoryFiles::create(&theta_file, &dza_file)?;
    traj.write_headers(&model.param_names(), opts.sampler == SamplerKind::Ifd)?;

    let outcome = ee_estimate(&mut g, &model, &opts, task, &mut traj)?;
    traj.flush()?;

    if args.output_simulated_network {
        let sim_file = format!("{}_{}.net", args.sim_prefix, task);
        io::write_arclist(&g, &sim_file)?;
        info!("task {}: wrote sampled network to {}", task, sim_file);
    }

    match outcome {
        EstimationOutcome::Converged(theta) => {
            let names = model.param_names();
            for (name, value) in names.iter().zip(theta.iter()) {
                info!("task {}: {} = {}", task, name, value);
            }
            Ok(0)
        }
        // other tasks, if any, are independent processes and proceed
        EstimationOutcome::Degenerate => Ok(2),
    }
}

fn run_simulate(args: SimulateArgs) -> anyhow::Result<i32> {
    let task = args.algorithm.task;
    let mut g = match &args.start_arclist_file {
        Some(f) => {
            let g = io::load_arclist(f)?;
            if g.num_nodes() != args.num_nodes {
                bail!(
                    "start network has {} nodes, expected {}",
                    g.num_nodes(),
                    args.num_nodes
                );
            }
            g
        }
        None => Digraph::new(args.num_nodes),
    };
    load_inputs(&mut g, &args.inputs)?;

    let model = build_model(&g, &args.stats)?;
    let theta = Array1::from(args.theta.clone());
    for (name, value) in model.param_names().iter().zip(theta.iter()) {
        info!("task {}: {} = {}", task, name, value);
    }

    let opts = estimation_options(&args.algorithm, false);
    simulate_ergm(&mut g, &model, &theta, &opts, task)?;

    let sim_file = format!("{}_{}.net", args.sim_prefix, task);
    io::write_arclist(&g, &sim_file)?;
    info!("task {}: wrote simulated network to {}", task, sim_file);
    Ok(0)
}
