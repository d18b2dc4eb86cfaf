//! trapmon - threshold monitor with SNMP trap notifications
//!
//! Samples metric commands on an interval and raises or clears alerts on
//! every configured trap receiver.

use clap::Parser;
use std::process::ExitCode;
use trapmon::cli::output::version_text;
use trapmon::cli::{Cli, Mode};
use trapmon::commands::{run_monitor, run_receive};
use trapmon::error::{AppError, ConfigError};

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging stays silent unless -p is given
    let mut logger = if cli.print_log {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    } else {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(log::LevelFilter::Off);
        builder
    };
    logger.format_timestamp_secs().init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    match cli.mode() {
        Mode::Version => {
            println!("{}", version_text());
            Ok(())
        }

        Mode::Receive { addr, community } => run_receive(&addr, community),

        Mode::Monitor => run_monitor(cli.config.as_deref()),
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Pass the configuration file with -c <path>.");
            eprintln!("      Without -c, config.json is looked up in the working directory,");
            eprintln!("      the user config directory and /etc/trapmon.");
        }
        AppError::Config(ConfigError::JsonError(_)) => {
            eprintln!();
            eprintln!("Hint: The file must be a JSON object with \"config\" and \"metrics\" keys.");
        }
        AppError::NoReachableTargets => {
            eprintln!();
            eprintln!("Hint: Check config.snmp.targets; every host failed to resolve or connect.");
            eprintln!("      Run with -p to see the error for each target.");
        }
        AppError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!();
            eprintln!("Hint: Binding port 162 usually requires root or CAP_NET_BIND_SERVICE.");
        }
        _ => {}
    }
}
