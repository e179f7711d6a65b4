//! Result documents written by the benchmark binary.
//!
//! Top level: `{"settings": {...}, "runs": [...]}`. The binary appends one
//! element to `runs` per repetition; each run carries a `plans` object keyed
//! by planner name whose values hold `stats` (times, path metrics, the
//! `path_found` / `path_collides` / `exact_goal_path` flags) and the
//! `intermediary_solutions` convergence trace. Everything besides `plans` is
//! carried through untouched: the merge and rename passes must not be lossy.

pub mod aggregate;
pub mod merge;
pub mod rename;

use crate::errors::{MpbError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsDoc {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// Planner name -> plan object. Insertion order is the order planners
    /// finished in; positional renaming relies on it being preserved.
    #[serde(default, deserialize_with = "plans_or_empty")]
    pub plans: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A killed binary can leave `"plans": null` behind; treat that as empty.
fn plans_or_empty<'de, D>(de: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(de)?.unwrap_or_default())
}

impl Run {
    /// A single stat value of one plan (`stats.<key>`).
    pub fn stat<'a>(&'a self, planner: &str, key: &str) -> Option<&'a Value> {
        self.plans.get(planner)?.get("stats")?.get(key)
    }
}

impl ResultsDoc {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MpbError::io("reading results file", path, e))?;
        serde_json::from_str(&raw).map_err(|source| MpbError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = serde_json::to_string_pretty(self).expect("results serialize");
        out.push('\n');
        std::fs::write(path, out).map_err(|e| MpbError::io("writing results file", path, e))
    }

    /// Plan names of each run, in document order.
    pub fn plan_names(&self) -> Vec<Vec<String>> {
        self.runs
            .iter()
            .map(|run| run.plans.keys().cloned().collect())
            .collect()
    }

    /// Distinct plan names across all runs, in first-seen order.
    pub fn planners(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for run in &self.runs {
            for name in run.plans.keys() {
                if !seen.contains(name) {
                    seen.push(name.clone());
                }
            }
        }
        seen
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use serde_json::json;

    /// A results document with one run whose plans carry the given planner
    /// names and a minimal stats block.
    pub fn doc_with_planners(planners: &[&str]) -> ResultsDoc {
        let mut run = Run::default();
        for p in planners {
            run.plans.insert(
                p.to_string(),
                json!({
                    "stats": {
                        "planning_time": 1.0,
                        "path_found": true,
                        "path_collides": false,
                        "exact_goal_path": true
                    }
                }),
            );
        }
        ResultsDoc {
            settings: json!({"max_planning_time": 3.0}),
            runs: vec![run],
            extra: Map::new(),
        }
    }

    pub fn write_doc(dir: &Path, name: &str, doc: &ResultsDoc) -> std::path::PathBuf {
        let path = dir.join(name);
        doc.save(&path).unwrap();
        path
    }
}
