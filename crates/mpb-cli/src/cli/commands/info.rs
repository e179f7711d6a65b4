use super::super::args::InfoArgs;
use crate::exit_codes::SUCCESS;
use mpb_core::report::console;
use mpb_core::ResultsDoc;

pub fn run(args: InfoArgs) -> anyhow::Result<i32> {
    let doc = ResultsDoc::load(&args.results_file)?;
    console::print_run_info(&doc);
    Ok(SUCCESS)
}
