//! Switchboard CLI entry point.

use std::process;

use clap::Parser;
use log::{debug, error, info};

use switchboard_cli::{Args, error_adapter::ErrorAdapter};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(args.log_level)
        .init();
    debug!(args:?; "Parsed arguments");

    match switchboard_cli::run(&args) {
        Ok(()) => info!("Completed successfully"),
        Err(err) => {
            let mut report = String::new();
            if miette::GraphicalReportHandler::new()
                .render_report(&mut report, &ErrorAdapter(&err))
                .is_err()
            {
                report = err.to_string();
            }
            error!("{report}");
            process::exit(1);
        }
    }
}
