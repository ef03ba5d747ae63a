//! Runs tool invocations and collects their results.

use std::{
    io::{self, Write},
    path::Path,
    process::{Command, Output, Stdio},
};

use newsroom_logging::debug_or_trace;
use serde::Serialize;

use crate::tools::{
    ToolError,
    types::{LintMode, Tool, ToolInvocation, ToolRole},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolStatus {
    Passed,
    Failed,
    Skipped,
}

/// Outcome of one pipeline step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub name: String,
    pub role: ToolRole,
    pub command: String,
    pub status: ToolStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Why the step failed, if it did
    pub failure: Option<String>,
}

impl ToolResult {
    fn skipped(invocation: &ToolInvocation) -> Self {
        Self {
            name: invocation.name.clone(),
            role: invocation.role,
            command: invocation.command_line(),
            status: ToolStatus::Skipped,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            failure: None,
        }
    }

    fn from_output(invocation: &ToolInvocation, output: &Output) -> Self {
        let exit_code = output.status.code();
        let (status, failure) = if output.status.success() {
            (ToolStatus::Passed, None)
        } else {
            let error = exit_code.map_or_else(
                || ToolError::Terminated(invocation.name.clone()),
                |code| ToolError::ExitStatus {
                    tool: invocation.name.clone(),
                    code,
                },
            );
            (ToolStatus::Failed, Some(error.to_string()))
        };

        Self {
            name: invocation.name.clone(),
            role: invocation.role,
            command: invocation.command_line(),
            status,
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            failure,
        }
    }

    fn from_error(invocation: &ToolInvocation, error: &ToolError) -> Self {
        Self {
            name: invocation.name.clone(),
            role: invocation.role,
            command: invocation.command_line(),
            status: ToolStatus::Failed,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            failure: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.status != ToolStatus::Failed
    }
}

/// Results of one lint run, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedResults {
    pub mode: LintMode,
    pub success: bool,
    pub tools: Vec<ToolResult>,
}

impl AggregatedResults {
    #[must_use]
    pub fn new(mode: LintMode, tools: Vec<ToolResult>) -> Self {
        let success = tools.iter().all(ToolResult::success);
        Self {
            mode,
            success,
            tools,
        }
    }

    /// The results of the steps that failed.
    pub fn failed(&self) -> impl Iterator<Item = &ToolResult> {
        self.tools.iter().filter(|result| !result.success())
    }
}

/// Runs tools one at a time, blocking until each process exits.
#[derive(Debug, Clone, Copy)]
pub struct ToolRunner {
    mode: LintMode,
}

impl ToolRunner {
    #[must_use]
    pub const fn new(mode: LintMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> LintMode {
        self.mode
    }

    /// Runs `tool` over the tree it is configured for.
    ///
    /// Never fails: spawn errors and non-zero exits are recorded in the
    /// returned result so the pipeline can continue.
    #[must_use]
    pub fn run(&self, tool: &Tool, root: &Path) -> ToolResult {
        let invocation = tool.invocation(self.mode, root);

        if tool.skip {
            log::info!("Skipping {}", invocation.name);
            return ToolResult::skipped(&invocation);
        }

        if let Some(config) = invocation.missing_config() {
            log::warn!(
                "Config file '{}' for {} does not exist",
                config.display(),
                invocation.name
            );
        }

        if tool.detected_path.is_none() {
            log::warn!(
                "Tool '{}' was not detected, trying to run '{}' anyway",
                invocation.name,
                invocation.program.display()
            );
        }

        Self::execute(&invocation)
    }

    /// Spawns the invocation and waits for it to finish.
    #[must_use]
    pub fn execute(invocation: &ToolInvocation) -> ToolResult {
        log::debug!(
            "Running {} {:?} in '{}'",
            invocation.program.display(),
            invocation.args,
            invocation.current_dir.display()
        );

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.current_dir)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) => {
                let result = ToolResult::from_output(invocation, &output);
                debug_or_trace!(
                    ("{} exited with {:?}", result.name, result.exit_code),
                    (
                        "{} exited with {:?} stdout={:?} stderr={:?}",
                        result.name,
                        result.exit_code,
                        result.stdout,
                        result.stderr
                    )
                );
                result
            }
            Err(e) => {
                let error = if e.kind() == io::ErrorKind::NotFound {
                    ToolError::NotFound(invocation.name.clone())
                } else {
                    ToolError::Spawn {
                        tool: invocation.name.clone(),
                        source: e,
                    }
                };
                log::error!("{error}");
                ToolResult::from_error(invocation, &error)
            }
        }
    }
}

/// Writes a per-tool status listing.
///
/// # Errors
///
/// * If writing to `out` fails
pub fn print_summary(results: &AggregatedResults, out: &mut impl Write) -> io::Result<()> {
    let width = results
        .tools
        .iter()
        .map(|result| result.name.len())
        .max()
        .unwrap_or(0);

    writeln!(out)?;
    writeln!(out, "Summary:")?;

    for result in &results.tools {
        let status = match (&result.status, &result.failure) {
            (ToolStatus::Passed, _) => "passed".to_string(),
            (ToolStatus::Skipped, _) => "skipped".to_string(),
            (ToolStatus::Failed, Some(failure)) => format!("failed ({failure})"),
            (ToolStatus::Failed, None) => "failed".to_string(),
        };
        writeln!(out, "  {:<width$}  {status}", result.name)?;
    }

    let failed = results.failed().count();
    if failed == 0 {
        writeln!(out, "All checks passed")?;
    } else {
        writeln!(out, "{failed} of {} checks failed", results.tools.len())?;
    }

    Ok(())
}

/// Serializes the results as a pretty-printed JSON report.
///
/// # Errors
///
/// * If serialization fails
pub fn results_to_json(results: &AggregatedResults) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}
