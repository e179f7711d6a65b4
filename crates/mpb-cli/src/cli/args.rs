use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "mpb",
    version,
    about = "Benchmark orchestrator for the motion-planning benchmark binary — \
             parameter sweeps, parallel supervised runs, result merging and plots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one benchmark configuration through the binary
    Run(RunArgs),
    /// Run a cost-function x sampler sweep from a YAML setup file
    Sweep(SweepArgs),
    /// Merge result files into one document
    Merge(MergeArgs),
    /// Fold per-folder result grids into combined.json
    Combine(CombineArgs),
    /// Print the plan names of a results file
    Plans(PlansArgs),
    /// Print per-run planner stats of a results file
    Info(InfoArgs),
    /// Render statistics charts from result files
    Plot(PlotArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Config template or a previously written config file
    /// (default: benchmark_template.json next to the binary)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory containing the benchmark binary
    #[arg(long, default_value = "../bin", env = "MPB_BINARY_DIR")]
    pub bin_dir: PathBuf,

    /// Benchmark binary name inside --bin-dir
    #[arg(long, default_value = "benchmark", env = "MPB_BINARY")]
    pub bin: String,

    /// Planners to run (aliases like rrt_star, "RRT*", anytime)
    #[arg(long, num_args = 1..)]
    pub planners: Vec<String>,

    /// Steer functions to plan with (reeds_shepp, dubins, car, ...)
    #[arg(long, num_args = 1..)]
    pub steering: Vec<String>,

    /// Smoothers to run on found paths (exact toggle names)
    #[arg(long, num_args = 1..)]
    pub smoothers: Vec<String>,

    /// Forward-propagation robot models; switches to control planners
    #[arg(long, num_args = 1..)]
    pub robot_models: Vec<String>,

    /// Dotted-path config overrides, e.g. --set max_planning_time=5
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Repetitions per planner (overrides benchmark.runs)
    #[arg(long)]
    pub runs: Option<u64>,

    /// Benchmark id; a timestamp when omitted
    #[arg(long)]
    pub id: Option<String>,

    /// Subfolder receiving config, results and log files
    #[arg(
        long,
        default_value = "",
        value_parser = clap::builder::OsStringValueParser::new().map(PathBuf::from)
    )]
    pub subfolder: PathBuf,

    /// Do not kill invocations that exceed the planning-time budget
    #[arg(long)]
    pub no_kill: bool,

    /// Grace period between SIGTERM and SIGKILL on timeout (e.g. 5s);
    /// gives the binary a chance to flush its results file
    #[arg(long, value_parser = humantime::parse_duration)]
    pub grace: Option<Duration>,

    /// Keep the configured planner order instead of shuffling
    #[arg(long)]
    pub no_shuffle: bool,

    /// No progress bar
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SweepArgs {
    /// Sweep setup YAML (start-goal pairs, cost functions, map files)
    pub setup: PathBuf,

    /// Directory containing the benchmark binary
    #[arg(long, default_value = "../bin", env = "MPB_BINARY_DIR")]
    pub bin_dir: PathBuf,

    /// Benchmark binary name inside --bin-dir
    #[arg(long, default_value = "benchmark", env = "MPB_BINARY")]
    pub bin: String,

    /// Worker processes (0 = one per cpu)
    #[arg(long, short, default_value_t = 0)]
    pub processes: usize,

    /// Override the setup's repeat count
    #[arg(long)]
    pub runs: Option<u64>,

    /// Sampling functions to include (default: all of uniform, ellipse,
    /// intensity, dijkstra, hybrid)
    #[arg(long = "sampling-fns", num_args = 1..)]
    pub sampling_fns: Vec<String>,

    /// Do not rlimit child address space off available memory
    #[arg(long)]
    pub no_memory_limit: bool,

    /// Pool id; a timestamp when omitted
    #[arg(long)]
    pub id: Option<String>,

    /// Write a chart of the sweep's success counters (.svg or .png)
    #[arg(long)]
    pub summary_plot: Option<PathBuf>,

    /// Grace period between SIGTERM and SIGKILL on timeout
    #[arg(long, value_parser = humantime::parse_duration)]
    pub grace: Option<Duration>,

    /// No progress bars
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct MergeArgs {
    /// Result files to merge, in order
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Merged document path
    #[arg(long, short)]
    pub output: PathBuf,

    /// Append all source runs instead of folding plans by run index
    #[arg(long)]
    pub separate_runs: bool,

    /// Positional plan names, one per contributed plan across all sources
    #[arg(long = "plan-names", num_args = 1..)]
    pub plan_names: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CombineArgs {
    /// Folders holding a <cost>-<sampler>_results.json grid
    #[arg(long = "folder", required = true, num_args = 1..)]
    pub folders: Vec<PathBuf>,

    /// Cost functions of the grid (scanned from filenames when omitted)
    #[arg(long = "cost-fn", num_args = 1..)]
    pub cost_fns: Vec<String>,

    /// Sampling functions of the grid (scanned from filenames when omitted)
    #[arg(long = "sampling-fn", num_args = 1..)]
    pub sampling_fns: Vec<String>,

    /// Rewrite plan keys to <cost>-<sampler> first and combine the
    /// _renamed.json files
    #[arg(long)]
    pub renamed: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PlansArgs {
    /// Results file to inspect
    pub results_file: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InfoArgs {
    /// Results file to inspect
    pub results_file: PathBuf,
}

#[derive(clap::Args)]
pub struct PlotArgs {
    #[command(subcommand)]
    pub cmd: PlotCmd,
}

#[derive(Subcommand)]
pub enum PlotCmd {
    /// Metric vs planning time from intermediary solutions (log-x)
    Convergence(ConvergenceArgs),
    /// Per-planner planning/steering/collision time bars for one run
    Timings(TimingsArgs),
    /// Found / collision-free / exact counters over result files
    Aggregate(AggregateArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConvergenceArgs {
    /// Results file of a benchmarking run
    pub json_file: PathBuf,

    /// Stat keys to plot; "cost" plots the intermediary solution cost
    #[arg(long, num_args = 1.., default_value = "cost")]
    pub metrics: Vec<String>,

    /// Runs to include: "all" or comma-separated indices
    #[arg(long, default_value = "all")]
    pub run_id: String,

    /// Output file (.svg or .png); opens a gnuplot window when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Split planners into one figure per name substring (e.g. gmmt cliff dtc)
    #[arg(long = "per-map", num_args = 1..)]
    pub per_map: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct TimingsArgs {
    /// Results file of a benchmarking run
    pub json_file: PathBuf,

    /// Run to plot
    #[arg(long, default_value_t = 0)]
    pub run_id: usize,

    /// Output file (.svg or .png); opens a gnuplot window when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AggregateArgs {
    /// Result files to count over
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Output file (.svg or .png); opens a gnuplot window when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}
