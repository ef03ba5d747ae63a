#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Lint entry point for the newsroom Python tree.
//!
//! `lint` runs a formatter, an import-sorter and a style checker, in that
//! order, each as its own process. Every step runs even when an earlier one
//! fails; the run fails if any step failed.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::ValueEnum;
use strum::{AsRefStr, EnumIter, IntoEnumIterator as _};
use thiserror::Error;

use crate::{
    config::{ConfigError, LintConfig},
    tools::{
        AggregatedResults, LintMode, ToolInvocation, ToolRegistry, ToolRunner, print_summary,
        results_to_json,
    },
};

pub mod config;
pub mod tools;

/// Exit code for errors that stop the pipeline from starting.
pub const ERROR_EXIT_CODE: u8 = 2;

#[derive(ValueEnum, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[clap(rename_all = "kebab_case")]
pub enum OutputType {
    Json,
    #[default]
    Raw,
}

/// The commands understood by the `newsroom-lint` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Command {
    Help,
    Lint,
}

impl Command {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Help => "Show the available commands",
            Self::Lint => "Format, sort imports and style-check the source tree",
        }
    }
}

/// Writes the numbered list of commands.
///
/// # Errors
///
/// * If writing to `out` fails
pub fn help(out: &mut impl Write) -> io::Result<()> {
    let width = Command::iter()
        .map(|command| command.as_ref().len())
        .max()
        .unwrap_or(0);

    writeln!(out, "Usage: newsroom-lint <COMMAND>")?;
    writeln!(out)?;
    writeln!(out, "Commands:")?;

    for (index, command) in Command::iter().enumerate() {
        writeln!(
            out,
            "  {}. {:<width$}  {}",
            index + 1,
            command.as_ref(),
            command.description()
        )?;
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum LintError {
    #[error("Lint root '{}' is not a directory", .0.display())]
    RootNotFound(PathBuf),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Aggregate result of a command, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure,
}

impl ExitOutcome {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

impl From<&AggregatedResults> for ExitOutcome {
    fn from(results: &AggregatedResults) -> Self {
        if results.success {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

impl From<ExitOutcome> for ExitCode {
    fn from(outcome: ExitOutcome) -> Self {
        Self::from(outcome.code())
    }
}

/// Options of the `lint` command.
#[derive(Debug, Clone)]
pub struct LintOptions {
    pub root: PathBuf,
    /// Orchestrator config file; `newsroom-lint.toml` in `root` if unset
    pub config: Option<PathBuf>,
    pub mode: LintMode,
    pub output: OutputType,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            config: None,
            mode: LintMode::default(),
            output: OutputType::default(),
        }
    }
}

/// Runs the lint pipeline over one source tree.
#[derive(Debug)]
pub struct Orchestrator {
    root: PathBuf,
    registry: ToolRegistry,
    runner: ToolRunner,
}

impl Orchestrator {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: &LintConfig, mode: LintMode) -> Self {
        Self {
            root: root.into(),
            registry: ToolRegistry::new(config),
            runner: ToolRunner::new(mode),
        }
    }

    /// Builds an orchestrator from command options, loading the config file.
    ///
    /// # Errors
    ///
    /// * If the root is not a directory
    /// * If the config file cannot be read or parsed
    pub fn from_options(options: &LintOptions) -> Result<Self, LintError> {
        if !options.root.is_dir() {
            return Err(LintError::RootNotFound(options.root.clone()));
        }

        let config = LintConfig::discover(&options.root, options.config.as_deref())?;

        Ok(Self::new(&options.root, &config, options.mode))
    }

    /// The invocations a run would execute, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.registry
            .tools()
            .iter()
            .map(|tool| tool.invocation(self.runner.mode(), &self.root))
            .collect()
    }

    /// Runs every tool in order, writing tool stdout to `out` and tool
    /// stderr to `err`.
    ///
    /// Tool output is captured and replayed once the tool exits, all of its
    /// stdout before any of its stderr. In raw mode a missing tool
    /// configuration file is reported on `err` before the tool runs.
    ///
    /// # Errors
    ///
    /// * If writing the output fails
    /// * If the JSON report cannot be serialized
    pub fn lint(
        &self,
        output: OutputType,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> Result<AggregatedResults, LintError> {
        let mut results = Vec::with_capacity(self.registry.tools().len());

        for tool in self.registry.tools() {
            let invocation = tool.invocation(self.runner.mode(), &self.root);

            if output == OutputType::Raw
                && !tool.skip
                && let Some(config) = invocation.missing_config()
            {
                writeln!(
                    err,
                    "warning: config file '{}' for {} does not exist",
                    config.display(),
                    tool.name
                )?;
            }

            let result = self.runner.run(tool, &self.root);

            if output == OutputType::Raw {
                writeln!(out, "==> {}", result.command)?;
                out.write_all(result.stdout.as_bytes())?;
                out.flush()?;
                err.write_all(result.stderr.as_bytes())?;
                if result.exit_code.is_none()
                    && let Some(failure) = &result.failure
                {
                    writeln!(err, "error: {failure}")?;
                }
                err.flush()?;
            }

            results.push(result);
        }

        let results = AggregatedResults::new(self.runner.mode(), results);

        match output {
            OutputType::Raw => print_summary(&results, out)?,
            OutputType::Json => writeln!(out, "{}", results_to_json(&results)?)?,
        }
        out.flush()?;

        if !results.success {
            log::debug!(
                "lint failed: {:?}",
                results.failed().map(|r| r.name.as_str()).collect::<Vec<_>>()
            );
        }

        Ok(results)
    }
}

/// Log filter for a run producing `output`.
///
/// Logs share stdout with the program output, so JSON runs never log and raw
/// runs only log when `NEWSROOM_LOG` or `RUST_LOG` asks for it.
#[must_use]
pub fn log_filter(output: OutputType) -> String {
    match output {
        OutputType::Json => "off".to_string(),
        OutputType::Raw => newsroom_logging::env_filter_or("off"),
    }
}

/// Runs the `lint` command.
///
/// # Errors
///
/// * If the orchestrator cannot be set up from `options`
/// * If writing the output fails
pub fn lint(
    options: &LintOptions,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<ExitOutcome, LintError> {
    let orchestrator = Orchestrator::from_options(options)?;
    let results = orchestrator.lint(options.output, out, err)?;

    Ok(ExitOutcome::from(&results))
}
