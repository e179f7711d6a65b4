//! Success-counter bars over a set of result files.

use super::{save_or_show, PALETTE};
use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure};
use mpb_core::results::aggregate::AggregateStats;
use std::path::Path;

pub fn render(stats: &AggregateStats, output: Option<&Path>) -> anyhow::Result<()> {
    let categories = [
        ("total", stats.total),
        ("found", stats.found),
        ("collision-free", stats.collision_free),
        ("exact", stats.exact),
    ];
    let mut fig = Figure::new();
    {
        let axes = fig.axes2d();
        axes.set_title("benchmark results", &[]);
        axes.set_y_label("plans", &[]);
        axes.set_x_range(AutoOption::Fix(-0.5), AutoOption::Fix(3.5));
        for (i, (label, value)) in categories.iter().enumerate() {
            axes.boxes(
                &[i as f64],
                &[*value as f64],
                &[Caption(*label), Color(PALETTE[i % PALETTE.len()])],
            );
        }
    }
    save_or_show(&mut fig, output)
}
