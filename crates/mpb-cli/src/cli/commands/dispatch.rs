use super::super::args::{Cli, Command};
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => super::run::run(args).await,
        Command::Sweep(args) => super::sweep::run(args).await,
        Command::Merge(args) => super::merge::run(args),
        Command::Combine(args) => super::combine::run(args),
        Command::Plans(args) => super::plans::run(args),
        Command::Info(args) => super::info::run(args),
        Command::Plot(args) => super::plot::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
