//! Convergence of a metric over planning time, one line per planner, drawn
//! from the `intermediary_solutions` the anytime planners report.

use super::{parse_run_ids, save_or_show, PALETTE};
use crate::cli::args::ConvergenceArgs;
use gnuplot::{AxesCommon, Caption, Color, Figure, LineWidth};
use mpb_core::results::ResultsDoc;
use mpb_core::settings::planners::display_name;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Time/value pairs of one plan's intermediary solutions; `None` when the
/// plan has none or the metric is absent.
fn series(plan: &Value, metric: &str) -> Option<(Vec<f64>, Vec<f64>)> {
    let sols = plan.get("intermediary_solutions")?.as_array()?;
    if sols.is_empty() {
        return None;
    }
    let mut times = Vec::with_capacity(sols.len());
    let mut values = Vec::with_capacity(sols.len());
    for sol in sols {
        let time = sol.get("time")?.as_f64()?;
        let value = if metric == "cost" {
            sol.get("cost")?.as_f64()?
        } else {
            sol.get("stats")?.get(metric)?.as_f64()?
        };
        times.push(time);
        values.push(value);
    }
    Some((times, values))
}

/// Output path variant for one (metric, group) figure.
fn output_for(base: Option<&Path>, metric: &str, group: &str, multiple: bool) -> Option<PathBuf> {
    let base = base?;
    if !multiple && group.is_empty() {
        return Some(base.to_path_buf());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("plot");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("svg");
    let suffix = if group.is_empty() {
        format!("_{metric}")
    } else {
        format!("_{metric}_{group}")
    };
    Some(base.with_file_name(format!("{stem}{suffix}.{ext}")))
}

pub fn render(args: &ConvergenceArgs) -> anyhow::Result<()> {
    let doc = ResultsDoc::load(&args.json_file)?;
    let run_ids = parse_run_ids(&args.run_id, doc.runs.len())?;
    let multiple = args.metrics.len() > 1 || !args.per_map.is_empty();

    for metric in &args.metrics {
        let groups: Vec<String> = if args.per_map.is_empty() {
            vec![String::new()]
        } else {
            args.per_map.clone()
        };
        for group in &groups {
            let mut fig = Figure::new();
            let mut drawn = 0usize;
            {
                let axes = fig.axes2d();
                axes.set_title(&format!("{metric} convergence"), &[]);
                axes.set_x_label("planning time [s]", &[]);
                axes.set_y_label(metric, &[]);
                axes.set_x_log(Some(10.0));
                for run_id in &run_ids {
                    for (planner, plan) in &doc.runs[*run_id].plans {
                        if !group.is_empty() && !planner.contains(group.as_str()) {
                            continue;
                        }
                        if let Some((times, values)) = series(plan, metric) {
                            axes.lines(
                                &times,
                                &values,
                                &[
                                    Caption(display_name(planner)),
                                    Color(PALETTE[drawn % PALETTE.len()]),
                                    LineWidth(1.5),
                                ],
                            );
                            drawn += 1;
                        }
                    }
                }
            }
            if drawn == 0 {
                warn!(metric = %metric, group = %group, "no intermediary solutions to plot");
                continue;
            }
            let output = output_for(args.output.as_deref(), metric, group, multiple);
            save_or_show(&mut fig, output.as_deref())?;
        }
    }
    Ok(())
}
