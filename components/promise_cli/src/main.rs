//! Promise scenario runner
//!
//! Entry point for `promise-demo`. Parses CLI arguments, sets up logging and
//! delegates to the Runtime.

use clap::Parser as ClapParser;
use promise_cli::{Cli, CliResult, Command, Runtime, ScenarioReport, SCENARIOS};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Command::List => {
            for scenario in SCENARIOS {
                println!("{:<18} {}", scenario.name, scenario.description);
            }
        }
        Command::Run { names, all } => {
            let runtime = Runtime::new(cli.runtime_config()?);
            if *all {
                for report in runtime.run_all()? {
                    print_report(&report);
                }
            } else if names.is_empty() {
                println!("No scenario given. Run 'promise-demo list' to see them.");
            } else {
                for name in names {
                    print_report(&runtime.run(name)?);
                }
            }
        }
    }
    Ok(())
}

fn print_report(report: &ScenarioReport) {
    println!("{} ({}ms): {}", report.name, report.elapsed_ms, report.outcome);
    for reason in &report.unhandled {
        println!("  unhandled rejection: {}", reason);
    }
}
