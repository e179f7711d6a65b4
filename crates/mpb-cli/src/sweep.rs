//! Sweep setup: a YAML file describing start-goal pairs, cost functions and
//! map files, expanded into the full cost-function x sampler benchmark grid.
//!
//! Sampler presets wire up the binary's sampling-bias knobs: `uniform` is
//! plain RRT* with iid sampling, `ellipse` is Informed RRT*'s unit-ball
//! sampling, and `intensity` / `dijkstra` / `hybrid` bias sampling with a
//! map of dynamics. Cost functions pick the optimization objective and the
//! matching map file.

use anyhow::{bail, Context};
use mpb_core::fs::absolutize;
use mpb_core::{Benchmark, BinaryLocation, Settings};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SAMPLING_FNS: &[&str] = &["uniform", "ellipse", "intensity", "dijkstra", "hybrid"];
pub const COST_FNS: &[&str] = &["cliff", "dtc", "gmmt", "intensity"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepSetup {
    /// Config template; benchmark_template.json next to the binary if unset.
    #[serde(default)]
    pub template: Option<PathBuf>,
    pub max_planning_time: f64,
    #[serde(default = "default_repeats")]
    pub repeats: u64,
    /// Occupancy map (YAML sidecar format).
    pub occmap_file: PathBuf,
    pub cliff_map_file: PathBuf,
    pub intensity_map_file: PathBuf,
    pub gmmt_map_file: PathBuf,
    #[serde(default)]
    pub robot_shape_file: Option<PathBuf>,
    #[serde(default = "default_cost_fns")]
    pub cost_fns: Vec<String>,
    /// Start-goal pairs; each gets its own output folder.
    pub sg: Vec<StartGoal>,
    /// Extra dotted-path overrides applied to every benchmark.
    #[serde(default)]
    pub base: BTreeMap<String, Value>,
}

fn default_repeats() -> u64 {
    1
}

fn default_cost_fns() -> Vec<String> {
    COST_FNS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Deserialize)]
pub struct StartGoal {
    pub name: String,
    /// x, y, theta
    pub start: [f64; 3],
    pub goal: [f64; 3],
}

impl SweepSetup {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading sweep setup {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing sweep setup {}", path.display()))
    }
}

fn abs_str(path: &Path) -> String {
    absolutize(path).to_string_lossy().into_owned()
}

fn cost_map_file<'a>(setup: &'a SweepSetup, cost_fn: &str) -> anyhow::Result<&'a Path> {
    Ok(match cost_fn {
        "dtc" | "cliff" => &setup.cliff_map_file,
        "intensity" => &setup.intensity_map_file,
        "gmmt" => &setup.gmmt_map_file,
        other => bail!("unknown cost function `{other}` (expected one of {COST_FNS:?})"),
    })
}

/// Shared settings of every grid cell before sampler/cost specialization.
fn base_settings(setup: &SweepSetup, template: Settings) -> anyhow::Result<Settings> {
    let mut s = template;
    s.set("ompl.seed", -1)?;
    s.set_planners(&["informed_rrt_star"])?;
    s.set_steer_functions(&["car"])?;
    s.set("steer.car_turning_radius", 1.0)?;
    s.set("steer.sampling_resolution", 0.001)?;
    s.set("max_planning_time", setup.max_planning_time)?;
    s.set(
        "ompl.geometric_planner_settings.RRTstar.delay_collision_checking",
        "0",
    )?;
    s.set("ompl.geometric_planner_settings.RRTstar.goal_bias", "0.01")?;
    s.set(
        "ompl.geometric_planner_settings.InformedRRTstar.delay_collision_checking",
        "0",
    )?;
    s.set(
        "ompl.geometric_planner_settings.InformedRRTstar.goal_bias",
        "0.01",
    )?;
    if let Some(shape) = &setup.robot_shape_file {
        s.set("env.collision.robot_shape_source", abs_str(shape))?;
    }
    s.set_image_yaml_env(&abs_str(&setup.occmap_file))?;
    s.set("mod.weight_dtc", 0.02)?;
    s.set("mod.weight_cliff", 0.1)?;
    s.set("mod.weight_gmmt", 0.1)?;
    s.set("mod.weight_intensity", 0.2)?;
    for (path, value) in &setup.base {
        s.set(path, value.clone())?;
    }
    Ok(s)
}

fn apply_sampler(s: &mut Settings, sampler: &str) -> anyhow::Result<()> {
    match sampler {
        "uniform" => {
            s.set_planners(&["rrt_star"])?;
            s.set("ompl.sampler", "")?;
        }
        "ellipse" => {
            s.set("ompl.sampler", "ellipse")?;
        }
        "intensity" => {
            s.set("ompl.sampler", "intensity")?;
            s.set("mod.sampling_bias", 0.1)?;
        }
        "dijkstra" => {
            s.set("ompl.sampler", "dijkstra")?;
            s.set("mod.dijkstra_cell_size", 0.5)?;
            s.set("mod.sampling_bias", 0.05)?;
        }
        "hybrid" => {
            s.set("ompl.sampler", "hybrid")?;
            s.set("mod.dijkstra_cell_size", 0.5)?;
            s.set("mod.sampling_bias", 0.05)?;
        }
        other => bail!("unknown sampling function `{other}` (expected one of {SAMPLING_FNS:?})"),
    }
    Ok(())
}

/// Expand the setup into one [`Benchmark`] per (pair, cost function, sampler),
/// id `<cost>-<sampler>` under a subfolder named after the pair.
pub fn build_benchmarks(
    setup: &SweepSetup,
    template: Settings,
    binary: &BinaryLocation,
    sampling_fns: &[String],
) -> anyhow::Result<Vec<Benchmark>> {
    for name in sampling_fns {
        if !SAMPLING_FNS.contains(&name.as_str()) {
            bail!("unknown sampling function `{name}` (expected one of {SAMPLING_FNS:?})");
        }
    }
    let samplers: Vec<&str> = if sampling_fns.is_empty() {
        SAMPLING_FNS.to_vec()
    } else {
        SAMPLING_FNS
            .iter()
            .copied()
            .filter(|s| sampling_fns.iter().any(|f| f == s))
            .collect()
    };

    let base = base_settings(setup, template)?;
    let mut benchmarks = Vec::new();
    for sg in &setup.sg {
        for cost_fn in &setup.cost_fns {
            let map_file = abs_str(cost_map_file(setup, cost_fn)?);
            for sampler in &samplers {
                let mut s = base.clone();
                s.set_start(sg.start[0], sg.start[1], sg.start[2])?;
                s.set_goal(sg.goal[0], sg.goal[1], sg.goal[2])?;
                s.set(
                    "ompl.intensity_map_file_name",
                    abs_str(&setup.intensity_map_file),
                )?;
                s.set("ompl.optimization_objective", cost_fn.as_str())?;
                s.set("mod.mod_file_name", map_file.as_str())?;
                apply_sampler(&mut s, sampler)?;

                let mut benchmark = Benchmark::new(s, binary.clone());
                benchmark.set_id(format!("{cost_fn}-{sampler}"));
                benchmark.set_subfolder(&sg.name);
                benchmarks.push(benchmark);
            }
        }
    }
    Ok(benchmarks)
}
