//! Tool registry for the lint pipeline.

use std::path::PathBuf;

use crate::{
    config::{LintConfig, ToolSettings},
    tools::types::{Tool, ToolConfigSource, ToolRole},
};

/// The three pipeline tools, in execution order, with their configuration
/// applied and their binaries detected.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// Creates a registry of the built-in tools with `config` applied.
    ///
    /// Tools whose binary cannot be found are still registered; running them
    /// fails that step only.
    #[must_use]
    pub fn new(config: &LintConfig) -> Self {
        let mut tools = builtin_tools();

        for tool in &mut tools {
            apply_settings(tool, config.settings(tool.role));
            detect(tool);
        }

        tools.sort_by_key(|tool| tool.role);

        Self { tools }
    }

    /// All tools in execution order.
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }
}

/// Formatter, import-sorter and style checker of the newsroom Python tree.
fn builtin_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "black",
            ToolRole::Formatter,
            ToolConfigSource::File(PathBuf::from("pyproject.toml")),
            vec!["--check".to_string()],
            vec![],
        ),
        Tool::new(
            "isort",
            ToolRole::ImportSorter,
            ToolConfigSource::Profile("black".to_string()),
            vec!["--check-only".to_string()],
            vec![],
        ),
        Tool::new(
            "flake8",
            ToolRole::StyleChecker,
            ToolConfigSource::File(PathBuf::from(".flake8")),
            vec![],
            vec![],
        ),
    ]
}

fn apply_settings(tool: &mut Tool, settings: &ToolSettings) {
    if let Some(binary) = &settings.binary {
        tool.binary.clone_from(binary);
    }

    if let Some(config) = &settings.config {
        tool.config = ToolConfigSource::File(config.clone());
    } else if let Some(profile) = &settings.profile {
        tool.config = ToolConfigSource::Profile(profile.clone());
    }

    if let Some(targets) = &settings.targets {
        tool.targets.clone_from(targets);
    }

    tool.extra_args.clone_from(&settings.args);
    tool.skip = settings.skip;
    tool.detected_path.clone_from(&settings.path);
}

fn detect(tool: &mut Tool) {
    let name = &tool.name;

    if tool.skip {
        log::debug!("Skipping tool '{name}' (configured to skip)");
        return;
    }

    if let Some(path) = &tool.detected_path {
        if path.exists() || which::which(path).is_ok() {
            log::debug!("Tool '{name}' found at configured path: {}", path.display());
            return;
        }
        log::warn!(
            "Tool '{name}' configured path '{}' not found, trying auto-detection",
            path.display()
        );
        tool.detected_path = None;
    }

    if let Ok(path) = which::which(&tool.binary) {
        log::debug!("Tool '{name}' detected at: {}", path.display());
        tool.detected_path = Some(path);
    } else {
        log::debug!("Tool '{name}' not found");
    }
}
