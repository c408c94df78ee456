mod cli;
mod error;
mod logging;
mod run;
mod ui;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    let result = logging::init_logger(cli.log_level.into()).and_then(|()| {
        run::execute(run::RunArgs {
            case_id: cli.case_id,
            config_path: cli.config,
            out_dir: cli.out,
            init: cli.init,
            no_viewer: cli.no_viewer,
        })
    });

    if let Err(err) = result {
        eprintln!("{} {}", "Error:".bold().red(), err.user_message());
        process::exit(1);
    }
}
