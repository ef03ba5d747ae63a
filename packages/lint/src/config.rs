//! Orchestrator configuration (`newsroom-lint.toml`).
//!
//! Every key is optional. Missing keys keep the built-in tool defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::tools::ToolRole;

/// File name looked up in the lint root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "newsroom-lint.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Per-tool overrides.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ToolSettings {
    /// Binary name to look up on the `PATH`
    pub binary: Option<String>,
    /// Explicit location of the binary, bypassing `PATH` lookup. Relative
    /// paths are relative to the config file's directory.
    pub path: Option<PathBuf>,
    /// Configuration file passed with `--config`
    pub config: Option<PathBuf>,
    /// Style profile passed with `--profile`
    pub profile: Option<String>,
    /// Extra arguments appended after the configuration arguments
    pub args: Vec<String>,
    /// Paths to run the tool over instead of the whole tree
    pub targets: Option<Vec<String>>,
    pub skip: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LintConfig {
    pub formatter: ToolSettings,
    pub import_sorter: ToolSettings,
    pub style_checker: ToolSettings,
}

impl LintConfig {
    /// Parses a configuration from TOML source.
    ///
    /// # Errors
    ///
    /// * If the source is not valid TOML or contains unknown keys
    pub fn from_toml(source: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the configuration file at `path`.
    ///
    /// Relative tool paths are made absolute against the file's directory.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the file cannot be parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading config file '{}'", path.display());

        let read_error = |source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };

        let source = std::fs::read_to_string(path).map_err(read_error)?;
        let mut config = Self::from_toml(&source, path)?;

        let base = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let base = std::path::absolute(base).map_err(read_error)?;
        config.resolve_tool_paths(&base);

        Ok(config)
    }

    /// Joins every relative tool `path` onto `base`.
    pub fn resolve_tool_paths(&mut self, base: &Path) {
        for settings in [
            &mut self.formatter,
            &mut self.import_sorter,
            &mut self.style_checker,
        ] {
            if let Some(path) = &mut settings.path
                && path.is_relative()
            {
                *path = base.join(&*path);
            }
        }
    }

    /// Resolves the configuration for a lint run.
    ///
    /// An explicit path must exist. Without one, `newsroom-lint.toml` in
    /// `root` is used when present, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// * If the selected file cannot be read or parsed
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let path = root.join(CONFIG_FILE_NAME);

        if path.is_file() {
            Self::load(&path)
        } else {
            log::debug!(
                "No {CONFIG_FILE_NAME} in '{}', using defaults",
                root.display()
            );
            Ok(Self::default())
        }
    }

    #[must_use]
    pub const fn settings(&self, role: ToolRole) -> &ToolSettings {
        match role {
            ToolRole::Formatter => &self.formatter,
            ToolRole::ImportSorter => &self.import_sorter,
            ToolRole::StyleChecker => &self.style_checker,
        }
    }
}
