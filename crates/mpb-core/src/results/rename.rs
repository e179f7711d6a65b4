//! Filename-keyed renaming and per-folder combination of result grids.
//!
//! Sweep runs leave a `<cost>-<sampler>_results.json` grid behind in each
//! start-goal folder, every file carrying plans under the planner's own name
//! (usually plain "rrt_star"). To compare across the grid, the plan keys are
//! rewritten to the `<cost>-<sampler>` pair taken from the filename, and the
//! whole grid is folded into one `combined.json` per folder.

use super::merge::{merge_files, MergeOptions};
use super::ResultsDoc;
use crate::errors::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Map;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const COMBINED_FILE: &str = "combined.json";
pub const RESULTS_SUFFIX: &str = "_results.json";
pub const RENAMED_SUFFIX: &str = "_renamed.json";

static GRID_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9]+)-([A-Za-z0-9_]+)_results\.json$").expect("grid regex"));

/// `<cost>-<sampler>` pair name for a grid cell.
pub fn pair_name(cost_fn: &str, sampling_fn: &str) -> String {
    format!("{cost_fn}-{sampling_fn}")
}

fn grid_path(folder: &Path, cost_fn: &str, sampling_fn: &str, suffix: &str) -> PathBuf {
    folder.join(format!("{}{suffix}", pair_name(cost_fn, sampling_fn)))
}

/// Discover the cost-function and sampler names present in `folder` from its
/// `<cost>-<sampler>_results.json` files, each in first-seen order.
pub fn scan_grid(folder: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut cost_fns: Vec<String> = Vec::new();
    let mut sampling_fns: Vec<String> = Vec::new();
    let entries = std::fs::read_dir(folder)
        .map_err(|e| crate::errors::MpbError::io("reading results folder", folder, e))?;
    let mut names: Vec<String> = entries
        .filter_map(|entry| Some(entry.ok()?.file_name().to_string_lossy().into_owned()))
        .collect();
    names.sort();
    for name in names {
        if let Some(caps) = GRID_FILE.captures(&name) {
            let cost = caps[1].to_string();
            let samp = caps[2].to_string();
            if !cost_fns.contains(&cost) {
                cost_fns.push(cost);
            }
            if !sampling_fns.contains(&samp) {
                sampling_fns.push(samp);
            }
        }
    }
    Ok((cost_fns, sampling_fns))
}

/// Rewrite every plan key of every `<cost>-<sampler>_results.json` in
/// `folder` to the filename's pair name, writing `<cost>-<sampler>_renamed.json`
/// next to it. Returns the renamed files written.
pub fn rename_by_filename(
    folder: &Path,
    cost_fns: &[String],
    sampling_fns: &[String],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for cost_fn in cost_fns {
        for sampling_fn in sampling_fns {
            let source = grid_path(folder, cost_fn, sampling_fn, RESULTS_SUFFIX);
            let mut doc = match ResultsDoc::load(&source) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(path = %source.display(), error = %e, "skipping rename source");
                    continue;
                }
            };
            let name = pair_name(cost_fn, sampling_fn);
            for run in &mut doc.runs {
                if run.plans.len() > 1 {
                    warn!(
                        path = %source.display(),
                        plans = run.plans.len(),
                        "multiple plans collapse onto one renamed key"
                    );
                }
                let mut renamed = Map::new();
                for (_, plan) in std::mem::take(&mut run.plans) {
                    renamed.insert(name.clone(), plan);
                }
                run.plans = renamed;
            }
            let target = grid_path(folder, cost_fn, sampling_fn, RENAMED_SUFFIX);
            doc.save(&target)?;
            written.push(target);
        }
    }
    info!(folder = %folder.display(), files = written.len(), "renamed plan keys from filenames");
    Ok(written)
}

/// Fold the `<cost>-<sampler>` grid of one folder into `combined.json`,
/// renaming plans positionally to their pair names. With `use_renamed` the
/// `_renamed.json` outputs of [`rename_by_filename`] are read instead of the
/// raw results files.
pub fn combine_folder(
    folder: &Path,
    cost_fns: &[String],
    sampling_fns: &[String],
    use_renamed: bool,
) -> Result<PathBuf> {
    let suffix = if use_renamed { RENAMED_SUFFIX } else { RESULTS_SUFFIX };
    let mut files = Vec::new();
    let mut names = Vec::new();
    for cost_fn in cost_fns {
        for sampling_fn in sampling_fns {
            let path = grid_path(folder, cost_fn, sampling_fn, suffix);
            // Missing cells are dropped up front so the positional plan names
            // stay aligned with the files that actually contribute.
            if !path.exists() {
                warn!(path = %path.display(), "grid cell has no results file, skipping");
                continue;
            }
            files.push(path);
            names.push(pair_name(cost_fn, sampling_fn));
        }
    }
    let target = folder.join(COMBINED_FILE);
    merge_files(
        &files,
        &target,
        &MergeOptions {
            separate_runs: false,
            plan_names: Some(names),
        },
    )?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::test_support::{doc_with_planners, write_doc};

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scan_finds_the_grid() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "cliff-uniform_results.json",
            "cliff-dijkstra_results.json",
            "gmmt-uniform_results.json",
            "unrelated.json",
            "cliff-uniform_renamed.json",
        ] {
            write_doc(dir.path(), name, &doc_with_planners(&["rrt_star"]));
        }
        let (cost_fns, sampling_fns) = scan_grid(dir.path()).unwrap();
        assert_eq!(cost_fns, strings(&["cliff", "gmmt"]));
        assert_eq!(sampling_fns, strings(&["dijkstra", "uniform"]));
    }

    #[test]
    fn rename_rewrites_plan_keys() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(
            dir.path(),
            "cliff-uniform_results.json",
            &doc_with_planners(&["rrt_star"]),
        );
        let written =
            rename_by_filename(dir.path(), &strings(&["cliff"]), &strings(&["uniform"])).unwrap();
        assert_eq!(written.len(), 1);
        let renamed = ResultsDoc::load(&written[0]).unwrap();
        assert_eq!(renamed.planners(), vec!["cliff-uniform"]);
    }

    #[test]
    fn rename_skips_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(
            dir.path(),
            "cliff-uniform_results.json",
            &doc_with_planners(&["rrt_star"]),
        );
        let written = rename_by_filename(
            dir.path(),
            &strings(&["cliff", "gmmt"]),
            &strings(&["uniform"]),
        )
        .unwrap();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn combine_folds_the_grid_with_pair_names() {
        let dir = tempfile::tempdir().unwrap();
        for cell in ["cliff-uniform", "cliff-dijkstra", "gmmt-uniform"] {
            write_doc(
                dir.path(),
                &format!("{cell}_results.json"),
                &doc_with_planners(&["rrt_star"]),
            );
        }
        let combined = combine_folder(
            dir.path(),
            &strings(&["cliff", "gmmt"]),
            &strings(&["uniform", "dijkstra"]),
            false,
        )
        .unwrap();
        let doc = ResultsDoc::load(&combined).unwrap();
        // gmmt-dijkstra is missing from the grid; everything else lands under
        // its pair name.
        assert_eq!(
            doc.planners(),
            vec!["cliff-uniform", "cliff-dijkstra", "gmmt-uniform"]
        );
    }
}
