//! Parallel execution of many configured benchmarks.
//!
//! A bounded worker pool (semaphore over a join set) runs each [`Benchmark`]
//! to completion. Outcomes come back in member order regardless of completion
//! order, and a failed or panicked worker records its outcome instead of
//! taking the pool down.

use super::benchmark::{timestamp_id, Benchmark, ExitOutcome, RunOptions};
use super::memory::MemoryLimit;
use crate::errors::{MpbError, Result};
use crate::report::progress::ProgressSink;
use crate::results::aggregate::{aggregate_files, AggregateStats};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Pool id; also the subfolder name when `use_subfolder` is set. Defaults
    /// to a timestamp.
    pub id: Option<String>,
    /// Worker count; 0 means one per cpu. Always capped at the member count.
    pub processes: usize,
    /// Override for every member's repetition count.
    pub runs: Option<u64>,
    /// Give each child an address-space rlimit sized off available memory.
    pub limit_memory: bool,
    /// Collect member output under a subfolder named after the pool id
    /// (members with an explicit subfolder keep theirs).
    pub use_subfolder: bool,
    /// Per-benchmark options applied to every member.
    pub run: RunOptions,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            id: None,
            processes: 0,
            runs: None,
            limit_memory: true,
            use_subfolder: true,
            run: RunOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolEntry {
    pub index: usize,
    pub id: String,
    pub outcome: ExitOutcome,
    pub results_path: PathBuf,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PoolSummary {
    pub id: String,
    pub entries: Vec<PoolEntry>,
}

impl PoolSummary {
    pub fn all_ok(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_success())
    }

    /// Outcome labels with their counts, in first-seen order.
    pub fn outcome_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for entry in &self.entries {
            let label = entry.outcome.to_string();
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label, 1)),
            }
        }
        counts
    }

    pub fn results_files(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.results_path.clone()).collect()
    }

    /// Success counters over every member's results file.
    pub fn aggregate(&self) -> AggregateStats {
        aggregate_files(&self.results_files())
    }
}

#[derive(Debug, Default)]
pub struct Pool {
    pub benchmarks: Vec<Benchmark>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, benchmark: Benchmark) {
        self.benchmarks.push(benchmark);
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Broadcast a dotted-path assignment to every member's settings.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        for benchmark in &mut self.benchmarks {
            benchmark.settings.set(path, value.clone())?;
        }
        Ok(())
    }

    /// Run every member through a bounded worker pool.
    pub async fn run_parallel(
        &mut self,
        opts: &PoolOptions,
        progress: Option<ProgressSink>,
    ) -> Result<PoolSummary> {
        let pool_id = opts.id.clone().unwrap_or_else(timestamp_id);
        if self.benchmarks.is_empty() {
            warn!(pool = %pool_id, "pool has no benchmarks");
            return Ok(PoolSummary {
                id: pool_id,
                entries: Vec::new(),
            });
        }

        let mut run_opts = opts.run.clone();
        if let Some(runs) = opts.runs {
            run_opts.runs = Some(runs);
        }
        if opts.limit_memory {
            let fraction = MemoryLimit::default_fraction();
            let limit = MemoryLimit::fraction_of_available(fraction);
            info!(
                available_gb = format!("{:.2}", super::memory::available_memory_bytes() as f64 / 1e9),
                limit_pct = format!("{:.1}", fraction * 100.0),
                limit_gb = format!("{:.2}", limit.gigabytes()),
                "limiting each benchmark process"
            );
            run_opts.memory_limit = Some(limit);
        }

        if opts.use_subfolder {
            std::fs::create_dir_all(&pool_id)
                .map_err(|e| MpbError::io("creating pool subfolder", PathBuf::from(&pool_id), e))?;
        }
        for (index, benchmark) in self.benchmarks.iter_mut().enumerate() {
            if benchmark.id.is_none() {
                benchmark.set_id(format!("{pool_id}_{index}"));
            }
            if opts.use_subfolder && benchmark.subfolder.as_os_str().is_empty() {
                benchmark.set_subfolder(&pool_id);
            }
        }

        let processes = if opts.processes == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            opts.processes
        }
        .min(self.benchmarks.len())
        .max(1);
        info!(processes, benchmarks = self.benchmarks.len(), pool = %pool_id, "creating worker pool");

        let sem = Arc::new(Semaphore::new(processes));
        let mut join_set = JoinSet::new();
        for (index, benchmark) in self.benchmarks.iter().enumerate() {
            let permit = sem
                .clone()
                .acquire_owned()
                .await
                .expect("pool semaphore closed");
            let mut benchmark = benchmark.clone();
            let run_opts = run_opts.clone();
            let progress = progress.clone();
            join_set.spawn(async move {
                let _permit = permit;
                let result = benchmark.run(&run_opts, progress).await;
                (index, benchmark, result)
            });
        }

        let mut entries: Vec<Option<PoolEntry>> = vec![None; self.benchmarks.len()];
        while let Some(joined) = join_set.join_next().await {
            let (index, benchmark, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    error!(error = %e, "benchmark worker panicked");
                    continue;
                }
            };
            let id = benchmark.id.clone().unwrap_or_default();
            let entry = match result {
                Ok(outcome) => PoolEntry {
                    index,
                    id: outcome.id.clone(),
                    outcome: outcome.overall(),
                    results_path: outcome.results_path,
                    log_path: outcome.log_path,
                },
                Err(e) => {
                    error!(index, id = %id, error = %e, "benchmark could not be run");
                    PoolEntry {
                        index,
                        id: id.clone(),
                        outcome: ExitOutcome::SpawnFailed,
                        results_path: benchmark.results_file().unwrap_or_default(),
                        log_path: benchmark.log_file().unwrap_or_default(),
                    }
                }
            };
            // Ids and settings mutated by the run (assigned ids, log_file
            // rewrites) belong back in the pool for later merging.
            self.benchmarks[index] = benchmark;
            entries[index] = Some(entry);
        }

        let entries: Vec<PoolEntry> = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.unwrap_or_else(|| {
                    let benchmark = &self.benchmarks[index];
                    PoolEntry {
                        index,
                        id: benchmark.id.clone().unwrap_or_default(),
                        outcome: ExitOutcome::SpawnFailed,
                        results_path: benchmark.results_file().unwrap_or_default(),
                        log_path: benchmark.log_file().unwrap_or_default(),
                    }
                })
            })
            .collect();

        let summary = PoolSummary {
            id: pool_id,
            entries,
        };
        if summary.all_ok() {
            info!(pool = %summary.id, "all benchmarks succeeded");
        } else {
            for entry in summary.entries.iter().filter(|e| !e.outcome.is_success()) {
                warn!(
                    index = entry.index,
                    id = %entry.id,
                    outcome = %entry.outcome,
                    log = %entry.log_path.display(),
                    "benchmark failed"
                );
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, outcome: ExitOutcome) -> PoolEntry {
        PoolEntry {
            index,
            id: format!("b_{index}"),
            outcome,
            results_path: PathBuf::from(format!("b_{index}_results.json")),
            log_path: PathBuf::from(format!("b_{index}.log")),
        }
    }

    #[test]
    fn outcome_counts_group_by_label() {
        let summary = PoolSummary {
            id: "pool".into(),
            entries: vec![
                entry(0, ExitOutcome::Success),
                entry(1, ExitOutcome::Timeout),
                entry(2, ExitOutcome::Success),
                entry(3, ExitOutcome::Error(-9)),
            ],
        };
        assert!(!summary.all_ok());
        assert_eq!(
            summary.outcome_counts(),
            vec![
                ("success".to_string(), 2),
                ("timeout".to_string(), 1),
                ("error -9".to_string(), 1),
            ]
        );
    }

    #[test]
    fn empty_pool_is_trivially_ok() {
        let summary = PoolSummary {
            id: "pool".into(),
            entries: Vec::new(),
        };
        assert!(summary.all_ok());
        assert!(summary.outcome_counts().is_empty());
    }
}
