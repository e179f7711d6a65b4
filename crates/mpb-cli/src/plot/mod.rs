//! gnuplot-backed statistics charts.

pub mod aggregate;
pub mod convergence;
pub mod timings;

use anyhow::{anyhow, bail, Context};
use gnuplot::Figure;
use std::path::Path;

/// Series color cycle.
pub(crate) const PALETTE: &[&str] = &[
    "#3B6FB6", "#35C788", "#DD3355", "#F2A43A", "#8E5DBA", "#22A8B8", "#808080", "#4D4D2E",
];

/// `"all"` or a comma-separated list of run indices.
pub(crate) fn parse_run_ids(spec: &str, len: usize) -> anyhow::Result<Vec<usize>> {
    if spec.trim().eq_ignore_ascii_case("all") {
        return Ok((0..len).collect());
    }
    let mut ids = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id: usize = part
            .parse()
            .with_context(|| format!("invalid run id `{part}`"))?;
        if id >= len {
            bail!("run id {id} out of range (results file has {len} runs)");
        }
        ids.push(id);
    }
    Ok(ids)
}

/// Write the figure to `output` (png by extension, svg otherwise) or open a
/// gnuplot window.
pub(crate) fn save_or_show(fig: &mut Figure, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let path_str: String = path.to_string_lossy().into_owned();
            match path.extension().and_then(|e| e.to_str()) {
                Some("png") => fig
                    .save_to_png(&path_str, 1280, 960)
                    .map_err(|e| anyhow!("saving {path_str}: {e}"))?,
                _ => fig
                    .save_to_svg(&path_str, 1280, 960)
                    .map_err(|e| anyhow!("saving {path_str}: {e}"))?,
            }
            println!("saved {path_str}");
        }
        None => {
            fig.show().map_err(|e| anyhow!("gnuplot: {e}"))?;
        }
    }
    Ok(())
}
