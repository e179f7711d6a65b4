//! Success counters over result files, for end-of-pool summaries and the
//! aggregate chart.

use super::ResultsDoc;
use serde_json::Value;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct AggregateStats {
    /// Plans seen across all runs of all readable files.
    pub total: usize,
    /// Plans whose `stats.path_found` flag is set.
    pub found: usize,
    /// Found plans whose path additionally does not collide.
    pub collision_free: usize,
    /// Plans that reached the goal within the exact-goal radius.
    pub exact: usize,
}

impl AggregateStats {
    pub fn add_plan(&mut self, plan: &Value) {
        let stats = plan.get("stats").unwrap_or(&Value::Null);
        let flag = |key: &str| stats.get(key).and_then(Value::as_bool) == Some(true);
        self.total += 1;
        if flag("path_found") {
            self.found += 1;
            if stats.get("path_collides").and_then(Value::as_bool) == Some(false) {
                self.collision_free += 1;
            }
        }
        if flag("exact_goal_path") {
            self.exact += 1;
        }
    }

    pub fn add_doc(&mut self, doc: &ResultsDoc) {
        for run in &doc.runs {
            for plan in run.plans.values() {
                self.add_plan(plan);
            }
        }
    }
}

/// Aggregate every readable file; unreadable ones are skipped with a warning,
/// consistent with the merge pass.
pub fn aggregate_files<P: AsRef<Path>>(paths: &[P]) -> AggregateStats {
    let mut stats = AggregateStats::default();
    for path in paths {
        let path = path.as_ref();
        match ResultsDoc::load(path) {
            Ok(doc) => stats.add_doc(&doc),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable results file"),
        }
    }
    stats
}
