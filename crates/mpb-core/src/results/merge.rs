//! Merging per-planner result fragments into one document.
//!
//! The engine runs one binary invocation per planner, each writing its own
//! results file; those fragments share run indices (run 0 of every fragment
//! is repetition 0) and are folded together by run. Unreadable sources are
//! never fatal: a crashed or killed invocation leaves a missing or truncated
//! file behind, and the surviving planners still deserve a merged document.

use super::ResultsDoc;
use crate::errors::{MpbError, Result};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Append every source run to the target instead of folding plans
    /// together by run index. Used to stack independent benchmarks into one
    /// document, one run per source repetition.
    pub separate_runs: bool,
    /// Positional plan renaming: the i-th plan contributed (counting across
    /// all sources in order) is stored under `plan_names[i]`. Collision
    /// checking is bypassed, which is the point: fragments that all call
    /// their planner "rrt_star" become distinguishable entries.
    pub plan_names: Option<Vec<String>>,
}

/// Merge `sources` into a single document written to `target`.
///
/// The first readable source with a non-empty `runs` seeds the target's
/// settings and per-run metadata. Later sources contribute plans into the
/// matching run; a plan name already present wins over a newcomer.
pub fn merge_files<P: AsRef<Path>>(
    sources: &[P],
    target: &Path,
    opts: &MergeOptions,
) -> Result<ResultsDoc> {
    let mut merged: Option<ResultsDoc> = None;
    // Position of the next contributed plan within `plan_names`. Advances for
    // every source, including pure file inputs.
    let mut name_cursor = 0usize;

    for source in sources {
        let source = source.as_ref();
        let doc = match ResultsDoc::load(source) {
            Ok(doc) => doc,
            Err(MpbError::Io { source: ref e, .. })
                if e.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!(path = %source.display(), "no results file exists, skipping");
                continue;
            }
            Err(MpbError::Json { .. }) => {
                warn!(path = %source.display(), "error while decoding results file, skipping");
                continue;
            }
            Err(e) => return Err(e),
        };
        if doc.runs.is_empty() {
            warn!(path = %source.display(), "results file has no runs, skipping");
            continue;
        }

        let seeding = merged.is_none();
        if seeding {
            let mut seed = doc.clone();
            seed.runs.clear();
            merged = Some(seed);
        }
        let out = merged.as_mut().expect("seeded above");

        let mut contributed = 0usize;
        for (run_id, run) in doc.runs.iter().enumerate() {
            if opts.separate_runs {
                out.runs.push(run.clone());
                continue;
            }
            if seeding {
                let mut shell = run.clone();
                shell.plans.clear();
                out.runs.push(shell);
            }
            if run_id >= out.runs.len() {
                warn!(
                    path = %source.display(),
                    run_id,
                    "run does not exist in merge target, skipping"
                );
                continue;
            }
            for (pi, (planner, plan)) in run.plans.iter().enumerate() {
                if let Some(names) = &opts.plan_names {
                    let name = match names.get(name_cursor + pi) {
                        Some(name) => name.clone(),
                        None => {
                            warn!(
                                planner = %planner,
                                position = name_cursor + pi,
                                "no plan name given for this position, keeping original"
                            );
                            planner.clone()
                        }
                    };
                    out.runs[run_id].plans.insert(name, plan.clone());
                    continue;
                }
                if out.runs[run_id].plans.contains_key(planner) {
                    warn!(
                        planner = %planner,
                        path = %source.display(),
                        "planner already present in merge target, skipping"
                    );
                } else {
                    out.runs[run_id].plans.insert(planner.clone(), plan.clone());
                }
            }
            contributed = contributed.max(run.plans.len());
        }
        name_cursor += contributed;
    }

    let merged = merged.ok_or(MpbError::NoMergeSources)?;
    merged.save(target)?;
    info!(
        sources = sources.len(),
        target = %target.display(),
        "merged result files"
    );
    Ok(merged)
}
