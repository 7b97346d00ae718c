//! Survey analytics CLI.

use clap::Parser;

use svy_cli::cli::{Cli, Command, log_config_from_cli};
use svy_cli::commands::{
    run_battery, run_ci, run_crosstab, run_distribution, run_overview, run_scan, run_test,
    run_variables,
};
use svy_cli::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Variables(args) => run_variables(args),
        Command::Overview(args) => run_overview(args),
        Command::Distribution(args) => run_distribution(args),
        Command::Battery(args) => run_battery(args),
        Command::Crosstab(args) => run_crosstab(args),
        Command::Test(args) => run_test(args),
        Command::Ci(args) => run_ci(args),
        Command::Scan(args) => run_scan(args),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}
