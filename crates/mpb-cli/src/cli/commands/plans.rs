use super::super::args::PlansArgs;
use crate::exit_codes::SUCCESS;
use mpb_core::report::console;
use mpb_core::ResultsDoc;

pub fn run(args: PlansArgs) -> anyhow::Result<i32> {
    let doc = ResultsDoc::load(&args.results_file)?;
    console::print_plan_names(&doc);
    Ok(SUCCESS)
}
