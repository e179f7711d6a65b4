//! Per-planner timing breakdown of one run: total planning time with the
//! steering and collision-checking shares drawn over it.

use super::{save_or_show, PALETTE};
use crate::cli::args::TimingsArgs;
use anyhow::Context;
use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure};
use mpb_core::results::ResultsDoc;
use mpb_core::settings::planners::display_name;
use serde_json::Value;

pub fn render(args: &TimingsArgs) -> anyhow::Result<()> {
    let doc = ResultsDoc::load(&args.json_file)?;
    let run = doc.runs.get(args.run_id).with_context(|| {
        format!(
            "run id {} out of range (results file has {} runs)",
            args.run_id,
            doc.runs.len()
        )
    })?;

    let mut names: Vec<String> = Vec::new();
    let mut totals: Vec<f64> = Vec::new();
    let mut steering: Vec<f64> = Vec::new();
    let mut collision: Vec<f64> = Vec::new();
    for (planner, plan) in &run.plans {
        let stat = |key: &str| {
            plan.get("stats")
                .and_then(|s| s.get(key))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        names.push(display_name(planner).to_string());
        totals.push(stat("planning_time"));
        steering.push(stat("steering_time"));
        collision.push(stat("collision_time"));
    }

    let xs: Vec<f64> = (0..names.len()).map(|i| i as f64 + 0.5).collect();
    let steer_plus_collision: Vec<f64> = steering
        .iter()
        .zip(&collision)
        .map(|(s, c)| s + c)
        .collect();

    let mut fig = Figure::new();
    {
        let axes = fig.axes2d();
        axes.set_title(&format!("planner timings (run {})", args.run_id), &[]);
        axes.set_y_label("time [s]", &[]);
        axes.set_x_range(
            AutoOption::Fix(0.0),
            AutoOption::Fix(names.len().max(1) as f64),
        );
        axes.boxes(&xs, &totals, &[Caption("total"), Color(PALETTE[0])]);
        axes.boxes(
            &xs,
            &steer_plus_collision,
            &[Caption("steering"), Color(PALETTE[1])],
        );
        axes.boxes(&xs, &collision, &[Caption("collision"), Color(PALETTE[2])]);
    }
    // gnuplot has no per-box tick labels worth fighting; the x positions map
    // onto this listing.
    for (i, name) in names.iter().enumerate() {
        println!("{i}: {name}");
    }
    save_or_show(&mut fig, args.output.as_deref())
}
