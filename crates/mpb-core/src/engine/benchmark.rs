//! One configured benchmark: a settings document plus the supervision loop
//! that runs its enabled planners through the binary one at a time.
//!
//! Planners run in separate invocations so that a crash or timeout in one
//! costs only that planner's results. The first planner writes straight to
//! the benchmark's results file; every later one writes a fragment that is
//! merged in after a clean exit and deleted at the end.

use super::child::{self, ChildOptions, KillMode, STATS_MARKER};
use super::memory::MemoryLimit;
use crate::errors::{MpbError, Result};
use crate::fs::absolutize;
use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::results::merge::{merge_files, MergeOptions};
use crate::settings::{planners, Settings};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_BINARY_NAME: &str = "benchmark";

/// Where the benchmark binary lives. The binary resolves its own data files
/// relative to its directory, so that directory doubles as the working
/// directory of every invocation.
#[derive(Debug, Clone)]
pub struct BinaryLocation {
    pub dir: PathBuf,
    pub name: String,
}

impl BinaryLocation {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            name: DEFAULT_BINARY_NAME.to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> PathBuf {
        absolutize(&self.dir.join(&self.name))
    }

    pub fn template_path(&self) -> PathBuf {
        absolutize(&self.dir.join("benchmark_template.json"))
    }

    pub fn ensure_exists(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            Ok(())
        } else {
            Err(MpbError::BinaryNotFound { path })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Binary exited with the given nonzero code (negated signal number for a
    /// signal death).
    Error(i32),
    /// Killed by the orchestrator after exceeding its deadline.
    Timeout,
    SpawnFailed,
}

impl ExitOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error(code) => write!(f, "error {code}"),
            Self::Timeout => write!(f, "timeout"),
            Self::SpawnFailed => write!(f, "spawn failed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerOutcome {
    pub planner: String,
    pub outcome: ExitOutcome,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub id: String,
    pub results_path: PathBuf,
    pub log_path: PathBuf,
    pub planners: Vec<PlannerOutcome>,
}

impl RunOutcome {
    /// First failure, or success if every planner finished cleanly.
    pub fn overall(&self) -> ExitOutcome {
        self.planners
            .iter()
            .map(|p| p.outcome)
            .find(|o| !o.is_success())
            .unwrap_or(ExitOutcome::Success)
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Override for `benchmark.runs` (repetitions per planner).
    pub runs: Option<u64>,
    /// Shuffle the planner order so parallel instances do not all start on
    /// the heavy planners at the same time.
    pub shuffle_planners: bool,
    /// Fixed shuffle seed; entropy when unset.
    pub shuffle_seed: Option<u64>,
    /// Kill an invocation after `max_planning_time * runs * 2` seconds.
    pub kill_after_timeout: bool,
    pub kill_mode: KillMode,
    pub memory_limit: Option<MemoryLimit>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            runs: None,
            shuffle_planners: true,
            shuffle_seed: None,
            kill_after_timeout: true,
            kill_mode: KillMode::Immediate,
            memory_limit: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Benchmark {
    pub settings: Settings,
    pub binary: BinaryLocation,
    pub id: Option<String>,
    /// Directory receiving config, results and log files. Empty means the
    /// current directory.
    pub subfolder: PathBuf,
}

pub(crate) fn timestamp_id() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

impl Benchmark {
    pub fn new(settings: Settings, binary: BinaryLocation) -> Self {
        Self {
            settings,
            binary,
            id: None,
            subfolder: PathBuf::new(),
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn set_subfolder(&mut self, subfolder: impl Into<PathBuf>) {
        self.subfolder = subfolder.into();
    }

    fn file_in_subfolder(&self, name: String) -> PathBuf {
        self.subfolder.join(name)
    }

    pub fn config_path(&self, id: &str) -> PathBuf {
        self.file_in_subfolder(format!("{id}_config.json"))
    }

    pub fn results_path(&self, id: &str) -> PathBuf {
        self.file_in_subfolder(format!("{id}_results.json"))
    }

    pub fn log_path(&self, id: &str) -> PathBuf {
        self.file_in_subfolder(format!("{id}.log"))
    }

    /// Results file of this benchmark, once an id is assigned.
    pub fn results_file(&self) -> Option<PathBuf> {
        self.id.as_ref().map(|id| self.results_path(id))
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.id.as_ref().map(|id| self.log_path(id))
    }

    /// Run every enabled planner through the binary, one invocation each.
    pub async fn run(
        &mut self,
        opts: &RunOptions,
        progress: Option<ProgressSink>,
    ) -> Result<RunOutcome> {
        self.binary.ensure_exists()?;
        if let Some(runs) = opts.runs {
            self.settings.set("benchmark.runs", runs)?;
        }
        let runs = self.settings.get_u64("benchmark.runs")?.max(1);

        let id = self.id.clone().unwrap_or_else(timestamp_id);
        self.id = Some(id.clone());
        if !self.subfolder.as_os_str().is_empty() {
            std::fs::create_dir_all(&self.subfolder)
                .map_err(|e| MpbError::io("creating benchmark subfolder", &self.subfolder, e))?;
        }
        let config_path = self.config_path(&id);
        let results_path = self.results_path(&id);
        let log_path = self.log_path(&id);
        let mut log = std::fs::File::create(&log_path)
            .map_err(|e| MpbError::io("creating benchmark log", &log_path, e))?;

        let mut planner_order = self.settings.enabled_planners()?;
        if planner_order.is_empty() {
            warn!(id = %id, "no planners enabled, nothing to run");
            return Ok(RunOutcome {
                id,
                results_path,
                log_path,
                planners: Vec::new(),
            });
        }
        if opts.shuffle_planners {
            let mut rng = match opts.shuffle_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            planner_order.shuffle(&mut rng);
        }

        let planner_count = planner_order.len();
        let total = planner_count * self.settings.steer_function_count() * runs as usize;
        let max_planning_time = self.settings.get_f64("max_planning_time")?;
        let deadline = opts
            .kill_after_timeout
            .then(|| Duration::from_secs_f64(max_planning_time * runs as f64 * 2.0));

        info!(id = %id, log = %log_path.display(), "running benchmark");

        let mut outcomes: Vec<PlannerOutcome> = Vec::new();
        let mut fragments: Vec<PathBuf> = Vec::new();
        let mut completed = 0usize;

        for (ip, planner) in planner_order.iter().enumerate() {
            let fragment = if ip == 0 {
                results_path.clone()
            } else {
                self.file_in_subfolder(format!("{id}_results_{planner}.json"))
            };
            self.settings.set(
                "benchmark.log_file",
                absolutize(&fragment).to_string_lossy().as_ref(),
            )?;
            self.settings.isolate_planner(planner)?;
            self.settings.save(&config_path)?;

            let planner_name = planners::display_name(planner).to_string();
            let base = completed;
            if let Some(sink) = &progress {
                sink(ProgressEvent {
                    benchmark: id.clone(),
                    planner: planner_name.clone(),
                    planner_index: ip,
                    planner_count,
                    completed: base,
                    total,
                });
            }

            let child_opts = ChildOptions {
                binary: self.binary.path(),
                config: absolutize(&config_path),
                cwd: absolutize(&self.binary.dir),
                deadline,
                kill_mode: opts.kill_mode,
                memory_limit: opts.memory_limit,
            };
            let started = std::time::Instant::now();
            let mut markers = 0usize;
            let result = child::supervise(&child_opts, |line| {
                let _ = writeln!(log, "{line}");
                if line.contains(STATS_MARKER) {
                    markers += 1;
                    if let Some(sink) = &progress {
                        sink(ProgressEvent {
                            benchmark: id.clone(),
                            planner: planner_name.clone(),
                            planner_index: ip,
                            planner_count,
                            completed: base + markers,
                            total,
                        });
                    }
                }
            })
            .await;
            completed = base + markers;

            let outcome = match result {
                Ok(out) if out.timed_out => {
                    warn!(
                        id = %id,
                        planner = %planner_name,
                        elapsed_s = started.elapsed().as_secs_f64(),
                        "killed benchmark after exceeding timeout"
                    );
                    ExitOutcome::Timeout
                }
                Ok(out) => match out.exit_code {
                    Some(0) => ExitOutcome::Success,
                    Some(code) => {
                        warn!(id = %id, planner = %planner_name, code, "benchmark invocation failed");
                        ExitOutcome::Error(code)
                    }
                    None => {
                        warn!(id = %id, planner = %planner_name, "benchmark exited without a status");
                        ExitOutcome::Error(-1)
                    }
                },
                Err(e) => {
                    error!(id = %id, planner = %planner_name, error = %e, "failed to launch benchmark binary");
                    ExitOutcome::SpawnFailed
                }
            };
            outcomes.push(PlannerOutcome {
                planner: planner.clone(),
                outcome,
            });

            if outcome.is_success() && ip > 0 {
                match merge_files(
                    &[results_path.clone(), fragment.clone()],
                    &results_path,
                    &MergeOptions::default(),
                ) {
                    Ok(_) => fragments.push(fragment),
                    Err(e) => {
                        warn!(id = %id, planner = %planner_name, error = %e, "could not merge results fragment")
                    }
                }
            }
        }

        for fragment in &fragments {
            if let Err(e) = std::fs::remove_file(fragment) {
                warn!(path = %fragment.display(), error = %e, "could not remove results fragment");
            }
        }

        let outcome = RunOutcome {
            id,
            results_path,
            log_path,
            planners: outcomes,
        };
        match outcome.overall() {
            ExitOutcome::Success => info!(id = %outcome.id, "benchmark finished"),
            other => warn!(
                id = %outcome.id,
                outcome = %other,
                log = %outcome.log_path.display(),
                "benchmark finished with failures"
            ),
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_reports_first_failure() {
        let outcome = RunOutcome {
            id: "x".into(),
            results_path: PathBuf::new(),
            log_path: PathBuf::new(),
            planners: vec![
                PlannerOutcome {
                    planner: "rrt".into(),
                    outcome: ExitOutcome::Success,
                },
                PlannerOutcome {
                    planner: "rrt_star".into(),
                    outcome: ExitOutcome::Timeout,
                },
                PlannerOutcome {
                    planner: "prm".into(),
                    outcome: ExitOutcome::Error(2),
                },
            ],
        };
        assert_eq!(outcome.overall(), ExitOutcome::Timeout);
    }

    #[test]
    fn outcome_labels_match_the_summary_contract() {
        assert_eq!(ExitOutcome::Success.to_string(), "success");
        assert_eq!(ExitOutcome::Timeout.to_string(), "timeout");
        assert_eq!(ExitOutcome::Error(-9).to_string(), "error -9");
        assert_eq!(ExitOutcome::SpawnFailed.to_string(), "spawn failed");
    }

    #[test]
    fn paths_derive_from_id_and_subfolder() {
        let settings = Settings::from_value(serde_json::json!({})).unwrap();
        let mut b = Benchmark::new(settings, BinaryLocation::new("bin"));
        b.set_subfolder("sweep");
        assert_eq!(b.config_path("a"), PathBuf::from("sweep/a_config.json"));
        assert_eq!(b.results_path("a"), PathBuf::from("sweep/a_results.json"));
        assert_eq!(b.log_path("a"), PathBuf::from("sweep/a.log"));
        assert_eq!(b.results_file(), None);
        b.set_id("a");
        assert_eq!(b.results_file(), Some(PathBuf::from("sweep/a_results.json")));
    }
}
