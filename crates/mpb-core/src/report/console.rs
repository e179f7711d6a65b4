//! Plain-text summaries for the terminal.

use crate::engine::pool::PoolSummary;
use crate::results::aggregate::AggregateStats;
use crate::results::ResultsDoc;
use crate::settings::planners::display_name;
use serde_json::Value;

fn fmt_num(value: Option<&Value>) -> String {
    match value.and_then(Value::as_f64) {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}

fn fmt_flag(value: Option<&Value>) -> &'static str {
    match value.and_then(Value::as_bool) {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

/// Per-run planner table of a results document.
pub fn print_run_info(doc: &ResultsDoc) {
    for (run_id, run) in doc.runs.iter().enumerate() {
        println!("run {run_id}:");
        for (planner, plan) in &run.plans {
            let stats = plan.get("stats");
            let stat = |key: &str| stats.and_then(|s| s.get(key));
            println!(
                "  {:<24} found: {:<4} exact: {:<4} time: {:>10}s  length: {:>10}  cost: {:>10}",
                display_name(planner),
                fmt_flag(stat("path_found")),
                fmt_flag(stat("exact_goal_path")),
                fmt_num(stat("planning_time")),
                fmt_num(stat("path_length")),
                fmt_num(stat("total_cost")),
            );
        }
    }
}

/// Plan names of every run, one line per run.
pub fn print_plan_names(doc: &ResultsDoc) {
    for (run_id, names) in doc.plan_names().iter().enumerate() {
        println!("run {run_id}: {}", names.join(", "));
    }
}

/// End-of-pool outcome counts plus pointers to the failing logs.
pub fn print_pool_summary(summary: &PoolSummary) {
    let counts = summary
        .outcome_counts()
        .iter()
        .map(|(label, n)| format!("{n} {label}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("pool {}: {}", summary.id, counts);
    for entry in summary.entries.iter().filter(|e| !e.outcome.is_success()) {
        println!(
            "  benchmark {} ({}) failed: {} (see {})",
            entry.index,
            entry.id,
            entry.outcome,
            entry.log_path.display()
        );
    }
}

/// One-line success counters.
pub fn print_aggregate(stats: &AggregateStats) {
    println!(
        "plans: {} total, {} found, {} collision-free, {} exact",
        stats.total, stats.found, stats.collision_free, stats.exact
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_flags_format_leniently() {
        assert_eq!(fmt_num(Some(&json!(1.23456))), "1.235");
        assert_eq!(fmt_num(Some(&json!("n/a"))), "-");
        assert_eq!(fmt_num(None), "-");
        assert_eq!(fmt_flag(Some(&json!(true))), "yes");
        assert_eq!(fmt_flag(None), "-");
    }
}
