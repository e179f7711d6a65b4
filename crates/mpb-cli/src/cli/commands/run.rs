use super::super::args::RunArgs;
use crate::exit_codes::{BENCHMARK_FAILED, SUCCESS};
use crate::progress::ProgressRenderer;
use anyhow::Context;
use mpb_core::engine::KillMode;
use mpb_core::{Benchmark, BinaryLocation, RunOptions, Settings};
use serde_json::Value;
use std::time::Duration;

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let binary = BinaryLocation::new(&args.bin_dir).with_name(&args.bin);
    let config = args
        .config
        .clone()
        .unwrap_or_else(|| binary.template_path());
    let mut settings = Settings::from_template(&config)?;
    if !args.planners.is_empty() {
        settings.set_planners(&args.planners)?;
    }
    if !args.steering.is_empty() {
        settings.set_steer_functions(&args.steering)?;
    }
    if !args.smoothers.is_empty() {
        settings.set_smoothers(&args.smoothers)?;
    }
    if !args.robot_models.is_empty() {
        settings.set_robot_models(&args.robot_models)?;
    }
    for kv in &args.set {
        apply_override(&mut settings, kv)?;
    }

    let mut benchmark = Benchmark::new(settings, binary);
    if let Some(id) = &args.id {
        benchmark.set_id(id.clone());
    }
    benchmark.set_subfolder(&args.subfolder);

    let renderer = (!args.quiet).then(ProgressRenderer::new);
    let sink = renderer.as_ref().map(|r| r.sink());
    let opts = RunOptions {
        runs: args.runs,
        shuffle_planners: !args.no_shuffle,
        shuffle_seed: None,
        kill_after_timeout: !args.no_kill,
        kill_mode: kill_mode(args.grace),
        memory_limit: None,
    };
    let outcome = benchmark.run(&opts, sink).await?;
    if let Some(renderer) = &renderer {
        renderer.finish();
    }
    println!("results: {}", outcome.results_path.display());
    Ok(if outcome.overall().is_success() {
        SUCCESS
    } else {
        BENCHMARK_FAILED
    })
}

pub(super) fn kill_mode(grace: Option<Duration>) -> KillMode {
    match grace {
        Some(grace) => KillMode::Graceful { grace },
        None => KillMode::Immediate,
    }
}

/// `KEY=VALUE` override; the value is parsed as JSON when possible so numbers
/// and booleans keep their type, and falls back to a plain string.
fn apply_override(settings: &mut Settings, kv: &str) -> anyhow::Result<()> {
    let (key, raw) = kv
        .split_once('=')
        .with_context(|| format!("override `{kv}` must be KEY=VALUE"))?;
    let value = serde_json::from_str::<Value>(raw)
        .unwrap_or_else(|_| Value::String(raw.to_string()));
    settings.set(key, value)?;
    Ok(())
}
