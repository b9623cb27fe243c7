//! printloop - cooperative scheduler driver
//!
//! Runs the single-slot event scheduler against a simulated step pin and
//! reports dispatch timing, or prints the effective configuration.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod error;
mod output;
mod pulse;
mod run;
mod settings;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "printloop")]
#[command(about = "printloop - drive and measure the single-slot event scheduler")]
#[command(version)]
#[command(long_about = "
printloop runs the cooperative event scheduler against a simulated step pin
and reports how closely each edge met its deadline.

Configuration comes from an optional YAML or JSON file; flags override it.
Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (YAML, or JSON with a .json extension)
    #[arg(long, global = true, env = "PRINTLOOP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulated pulse train and report timing
    Run(RunArgs),

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// How long to run (milliseconds)
    #[arg(long, default_value_t = 1_000)]
    duration_ms: u64,

    /// Nominal time between step edges (microseconds)
    #[arg(long)]
    step_period_us: Option<u64>,

    /// Longest single idle sleep (milliseconds)
    #[arg(long)]
    max_sleep_ms: Option<u64>,

    /// Request real-time priority for the loop thread
    #[arg(long)]
    rt: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("printloop={log_level},printloop_scheduler={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(exit_code)
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Run(args) => {
            let settings = settings.with_overrides(args.step_period_us, args.max_sleep_ms);
            let report = run::execute(
                &settings,
                Duration::from_millis(args.duration_ms),
                args.rt,
            )?;
            output::print_run_report(&report, cli.json)
        }
        Commands::Config => {
            settings.validate()?;
            output::print_settings(&settings, cli.json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_run_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["printloop", "run"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        match &cli.command {
            Commands::Run(args) => {
                assert_eq!(args.duration_ms, 1_000);
                assert!(args.step_period_us.is_none());
                assert!(args.max_sleep_ms.is_none());
                assert!(!args.rt);
            }
            Commands::Config => return Err("expected Run command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_run_flags() -> TestResult {
        let cli = Cli::try_parse_from([
            "printloop",
            "run",
            "--duration-ms",
            "250",
            "--step-period-us",
            "500",
            "--max-sleep-ms",
            "5",
            "--rt",
            "--json",
        ])?;
        assert!(cli.json);
        match &cli.command {
            Commands::Run(args) => {
                assert_eq!(args.duration_ms, 250);
                assert_eq!(args.step_period_us, Some(500));
                assert_eq!(args.max_sleep_ms, Some(5));
                assert!(args.rt);
            }
            Commands::Config => return Err("expected Run command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_config_with_path() -> TestResult {
        let cli = Cli::try_parse_from(["printloop", "config", "--config", "loop.yaml"])?;
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.config, Some(PathBuf::from("loop.yaml")));
        Ok(())
    }

    #[test]
    fn parse_verbose_levels() -> TestResult {
        let cli = Cli::try_parse_from(["printloop", "-vv", "config"])?;
        assert_eq!(cli.verbose, 2);
        Ok(())
    }

    #[test]
    fn parse_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["printloop", "device", "list"]).is_err());
    }
}
