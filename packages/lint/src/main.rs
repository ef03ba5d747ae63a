#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::{io::BufWriter, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use newsroom_lint::{ERROR_EXIT_CODE, LintOptions, OutputType, tools::LintMode};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, disable_help_subcommand = true)]
struct Args {
    #[command(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show the available commands
    Help,
    /// Format, sort imports and style-check the source tree
    Lint {
        /// Tree to lint
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Orchestrator config file [default: <ROOT>/newsroom-lint.toml]
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report formatting and import order problems without rewriting files
        #[arg(long)]
        check: bool,

        #[arg(short, long, value_enum, default_value_t = OutputType::Raw)]
        output: OutputType,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let output = match &args.cmd {
        Some(Commands::Lint { output, .. }) => *output,
        Some(Commands::Help) | None => OutputType::Raw,
    };

    if let Err(e) = newsroom_logging::init(&newsroom_lint::log_filter(output)) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    match args.cmd.unwrap_or(Commands::Help) {
        Commands::Help => {
            if let Err(e) = newsroom_lint::help(&mut std::io::stdout().lock()) {
                log::debug!("Failed to write help: {e}");
            }
            ExitCode::SUCCESS
        }
        Commands::Lint {
            root,
            config,
            check,
            output,
        } => {
            let options = LintOptions {
                root,
                config,
                mode: if check { LintMode::Check } else { LintMode::Fix },
                output,
            };

            let mut stdout = BufWriter::new(std::io::stdout().lock());
            let mut stderr = std::io::stderr().lock();

            match newsroom_lint::lint(&options, &mut stdout, &mut stderr) {
                Ok(outcome) => outcome.into(),
                Err(e) => {
                    log::error!("lint failed to run: {e}");
                    eprintln!("error: {e}");
                    ExitCode::from(ERROR_EXIT_CODE)
                }
            }
        }
    }
}
