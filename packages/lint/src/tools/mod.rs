//! Detection and execution of the external lint tools.
//!
//! The orchestrator delegates all actual formatting and linting to the
//! native tools and their own configuration files (`pyproject.toml`,
//! `.flake8`). It only decides which tools run, in which order, with which
//! configuration source, and aggregates their exit codes.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use newsroom_lint::{
//!     config::LintConfig,
//!     tools::{AggregatedResults, LintMode, ToolRegistry, ToolRunner},
//! };
//!
//! let registry = ToolRegistry::new(&LintConfig::default());
//! let runner = ToolRunner::new(LintMode::Check);
//!
//! let results = registry
//!     .tools()
//!     .iter()
//!     .map(|tool| runner.run(tool, Path::new(".")))
//!     .collect();
//!
//! let results = AggregatedResults::new(LintMode::Check, results);
//! assert_eq!(results.tools.len(), 3);
//! ```

mod registry;
mod runner;
mod types;

pub use registry::ToolRegistry;
pub use runner::{
    AggregatedResults, ToolResult, ToolRunner, ToolStatus, print_summary, results_to_json,
};
pub use types::{LintMode, Tool, ToolConfigSource, ToolInvocation, ToolRole};

/// Error type for a tool that could not run to a successful exit
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The tool binary could not be found
    #[error("Tool '{0}' not found. Please install it and ensure it's in your PATH.")]
    NotFound(String),

    /// The tool could not be started
    #[error("Failed to start tool '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and reported failure
    #[error("{tool} exited with code {code}")]
    ExitStatus { tool: String, code: i32 },

    /// The tool was killed before it could exit
    #[error("{0} terminated by signal")]
    Terminated(String),
}
