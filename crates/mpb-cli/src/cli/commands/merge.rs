use super::super::args::MergeArgs;
use crate::exit_codes::SUCCESS;
use mpb_core::results::merge::{merge_files, MergeOptions};

pub fn run(args: MergeArgs) -> anyhow::Result<i32> {
    let opts = MergeOptions {
        separate_runs: args.separate_runs,
        plan_names: (!args.plan_names.is_empty()).then(|| args.plan_names.clone()),
    };
    let merged = merge_files(&args.files, &args.output, &opts)?;
    println!(
        "merged {} files into {} ({} runs)",
        args.files.len(),
        args.output.display(),
        merged.runs.len()
    );
    Ok(SUCCESS)
}
