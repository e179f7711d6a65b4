use super::super::args::{PlotArgs, PlotCmd};
use crate::exit_codes::SUCCESS;
use mpb_core::results::aggregate::aggregate_files;

pub fn run(args: PlotArgs) -> anyhow::Result<i32> {
    match args.cmd {
        PlotCmd::Convergence(args) => crate::plot::convergence::render(&args)?,
        PlotCmd::Timings(args) => crate::plot::timings::render(&args)?,
        PlotCmd::Aggregate(args) => {
            let stats = aggregate_files(&args.files);
            crate::plot::aggregate::render(&stats, args.output.as_deref())?;
        }
    }
    Ok(SUCCESS)
}
