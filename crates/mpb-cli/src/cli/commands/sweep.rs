use super::super::args::SweepArgs;
use super::run::kill_mode;
use crate::exit_codes::{BENCHMARK_FAILED, SUCCESS};
use crate::progress::ProgressRenderer;
use crate::sweep::{build_benchmarks, SweepSetup};
use mpb_core::report::console;
use mpb_core::{BinaryLocation, Pool, PoolOptions, RunOptions, Settings};
use tracing::info;

pub async fn run(args: SweepArgs) -> anyhow::Result<i32> {
    let setup = SweepSetup::load(&args.setup)?;
    info!(
        pairs = setup.sg.len(),
        cost_fns = setup.cost_fns.len(),
        "loaded sweep setup"
    );

    let binary = BinaryLocation::new(&args.bin_dir).with_name(&args.bin);
    let template_path = setup
        .template
        .clone()
        .unwrap_or_else(|| binary.template_path());
    let template = Settings::from_template(&template_path)?;

    let mut pool = Pool::new();
    for benchmark in build_benchmarks(&setup, template, &binary, &args.sampling_fns)? {
        pool.push(benchmark);
    }
    info!(benchmarks = pool.len(), "built sweep grid");

    let renderer = (!args.quiet).then(ProgressRenderer::new);
    let sink = renderer.as_ref().map(|r| r.sink());
    let opts = PoolOptions {
        id: args.id.clone(),
        processes: args.processes,
        runs: Some(args.runs.unwrap_or(setup.repeats)),
        limit_memory: !args.no_memory_limit,
        // Sweep benchmarks carry their own per-pair subfolders.
        use_subfolder: false,
        run: RunOptions {
            kill_mode: kill_mode(args.grace),
            ..RunOptions::default()
        },
    };
    let summary = pool.run_parallel(&opts, sink).await?;
    if let Some(renderer) = &renderer {
        renderer.finish();
    }

    console::print_pool_summary(&summary);
    let aggregate = summary.aggregate();
    console::print_aggregate(&aggregate);
    if let Some(path) = &args.summary_plot {
        crate::plot::aggregate::render(&aggregate, Some(path.as_path()))?;
    }
    Ok(if summary.all_ok() {
        SUCCESS
    } else {
        BENCHMARK_FAILED
    })
}
