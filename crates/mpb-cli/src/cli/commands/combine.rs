use super::super::args::CombineArgs;
use crate::exit_codes::SUCCESS;
use mpb_core::results::rename;
use tracing::warn;

pub fn run(args: CombineArgs) -> anyhow::Result<i32> {
    for folder in &args.folders {
        let mut cost_fns = args.cost_fns.clone();
        let mut sampling_fns = args.sampling_fns.clone();
        if cost_fns.is_empty() || sampling_fns.is_empty() {
            let (scanned_costs, scanned_samps) = rename::scan_grid(folder)?;
            if cost_fns.is_empty() {
                cost_fns = scanned_costs;
            }
            if sampling_fns.is_empty() {
                sampling_fns = scanned_samps;
            }
        }
        if cost_fns.is_empty() || sampling_fns.is_empty() {
            warn!(folder = %folder.display(), "no result grid found, skipping");
            continue;
        }
        if args.renamed {
            rename::rename_by_filename(folder, &cost_fns, &sampling_fns)?;
        }
        let target = rename::combine_folder(folder, &cost_fns, &sampling_fns, args.renamed)?;
        println!("combined {} into {}", folder.display(), target.display());
    }
    Ok(SUCCESS)
}
