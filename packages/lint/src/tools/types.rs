//! Tool definitions and the data passed between the registry and the runner.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;
use strum::{AsRefStr, EnumIter};

/// The position a tool occupies in the lint pipeline.
///
/// Variants are declared in execution order; later steps assume the
/// normalization applied by earlier ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, EnumIter, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ToolRole {
    Formatter,
    ImportSorter,
    StyleChecker,
}

impl fmt::Display for ToolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Whether the rewriting tools may modify files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LintMode {
    /// Formatter and import-sorter rewrite files in place
    #[default]
    Fix,
    /// Formatter and import-sorter only report what they would change
    Check,
}

/// Where a tool takes its settings from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolConfigSource {
    /// A configuration file, relative to the lint root unless absolute
    File(PathBuf),
    /// A named style profile built into the tool
    Profile(String),
}

impl ToolConfigSource {
    /// The command line arguments selecting this configuration.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::File(path) => vec!["--config".to_string(), path.display().to_string()],
            Self::Profile(name) => vec!["--profile".to_string(), name.clone()],
        }
    }

    /// Returns the configuration file path, if this source is a file.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Profile(_) => None,
        }
    }
}

/// Definition of an external lint tool.
#[derive(Debug, Clone)]
pub struct Tool {
    /// Identifier, also used as the binary name by default
    pub name: String,
    /// Binary to look up on the `PATH`
    pub binary: String,
    pub role: ToolRole,
    /// Arguments placed first when running in [`LintMode::Check`]
    pub check_args: Vec<String>,
    /// Arguments placed first when running in [`LintMode::Fix`]
    pub fix_args: Vec<String>,
    pub config: ToolConfigSource,
    /// Extra arguments appended after the configuration arguments
    pub extra_args: Vec<String>,
    /// Paths handed to the tool, relative to the lint root
    pub targets: Vec<String>,
    pub skip: bool,
    /// Resolved location of the binary, if it was found
    pub detected_path: Option<PathBuf>,
}

impl Tool {
    #[must_use]
    pub fn new(
        name: &str,
        role: ToolRole,
        config: ToolConfigSource,
        check_args: Vec<String>,
        fix_args: Vec<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            binary: name.to_string(),
            role,
            check_args,
            fix_args,
            config,
            extra_args: vec![],
            targets: vec![".".to_string()],
            skip: false,
            detected_path: None,
        }
    }

    #[must_use]
    pub fn with_detected_path(mut self, path: PathBuf) -> Self {
        self.detected_path = Some(path);
        self
    }

    /// Full argument list for the given mode.
    #[must_use]
    pub fn args(&self, mode: LintMode) -> Vec<String> {
        let mode_args = match mode {
            LintMode::Check => &self.check_args,
            LintMode::Fix => &self.fix_args,
        };

        mode_args
            .iter()
            .cloned()
            .chain(self.config.to_args())
            .chain(self.extra_args.iter().cloned())
            .chain(self.targets.iter().cloned())
            .collect()
    }

    /// Builds the invocation of this tool over the tree at `root`.
    #[must_use]
    pub fn invocation(&self, mode: LintMode, root: &Path) -> ToolInvocation {
        ToolInvocation {
            name: self.name.clone(),
            role: self.role,
            program: self
                .detected_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.binary)),
            args: self.args(mode),
            config: self.config.clone(),
            current_dir: root.to_path_buf(),
        }
    }
}

/// One concrete run of a tool. Built fresh for every lint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub name: String,
    pub role: ToolRole,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub config: ToolConfigSource,
    pub current_dir: PathBuf,
}

impl ToolInvocation {
    /// The command line as shown to the user, using the bare tool name.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The configuration file this invocation names, if it does not exist
    /// relative to the working directory.
    #[must_use]
    pub fn missing_config(&self) -> Option<&Path> {
        self.config
            .file()
            .filter(|config| !self.current_dir.join(config).exists())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator as _;

    use super::*;

    fn black() -> Tool {
        Tool::new(
            "black",
            ToolRole::Formatter,
            ToolConfigSource::File(PathBuf::from("pyproject.toml")),
            vec!["--check".to_string()],
            vec![],
        )
    }

    #[test_log::test]
    fn roles_iterate_in_execution_order() {
        let roles = ToolRole::iter().collect::<Vec<_>>();

        assert_eq!(
            roles,
            vec![
                ToolRole::Formatter,
                ToolRole::ImportSorter,
                ToolRole::StyleChecker
            ]
        );
        assert!(roles.is_sorted());
    }

    #[test_log::test]
    fn args_place_mode_then_config_then_extra_then_targets() {
        let mut tool = black();
        tool.extra_args = vec!["--quiet".to_string()];

        assert_eq!(
            tool.args(LintMode::Check),
            vec!["--check", "--config", "pyproject.toml", "--quiet", "."]
        );
        assert_eq!(
            tool.args(LintMode::Fix),
            vec!["--config", "pyproject.toml", "--quiet", "."]
        );
    }

    #[test_log::test]
    fn profile_source_renders_profile_flag() {
        let source = ToolConfigSource::Profile("black".to_string());

        assert_eq!(source.to_args(), vec!["--profile", "black"]);
        assert_eq!(source.file(), None);
    }

    #[test_log::test]
    fn invocation_prefers_detected_path_but_shows_tool_name() {
        let tool = black().with_detected_path(PathBuf::from("/usr/local/bin/black"));
        let invocation = tool.invocation(LintMode::Fix, Path::new("/src/newsroom"));

        assert_eq!(invocation.program, PathBuf::from("/usr/local/bin/black"));
        assert_eq!(invocation.current_dir, PathBuf::from("/src/newsroom"));
        assert_eq!(invocation.command_line(), "black --config pyproject.toml .");
    }

    #[test_log::test]
    fn missing_config_is_resolved_against_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tool = black();

        let invocation = tool.invocation(LintMode::Fix, dir.path());
        assert_eq!(invocation.missing_config(), Some(Path::new("pyproject.toml")));

        std::fs::write(dir.path().join("pyproject.toml"), "").unwrap();
        assert_eq!(invocation.missing_config(), None);

        let isort = Tool::new(
            "isort",
            ToolRole::ImportSorter,
            ToolConfigSource::Profile("black".to_string()),
            vec![],
            vec![],
        );
        assert_eq!(isort.invocation(LintMode::Fix, dir.path()).missing_config(), None);
    }
}
