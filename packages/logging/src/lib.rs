#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Logging setup shared by the newsroom binaries.
//!
//! Log records are emitted through the [`log`] facade and collected by
//! [`free_log_client`], which writes them to stdout. The filter is read from
//! `NEWSROOM_LOG`, falling back to `RUST_LOG` and then to a caller-chosen
//! default.

use free_log_client::FreeLogLayer;
use thiserror::Error;

pub use free_log_client;
pub use log;

/// Environment variables consulted for the log filter, highest priority first.
pub const LOG_ENV_VARS: [&str; 2] = ["NEWSROOM_LOG", "RUST_LOG"];

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Logs(#[from] free_log_client::LogsInitError),
    #[error(transparent)]
    BuildLogsConfig(#[from] free_log_client::BuildLogsConfigError),
}

/// Initializes logging for the current process with the given filter
/// directive.
///
/// Records are written to stdout, so binaries whose stdout is program output
/// should pass a quiet filter such as `off` unless the user asked for logs.
///
/// # Errors
///
/// * If the global logger was already initialized
pub fn init(filter: &str) -> Result<FreeLogLayer, InitError> {
    let logs_config = free_log_client::LogsConfig::builder();
    let layer = free_log_client::init(logs_config.env_filter(filter))?;

    log::trace!("logging initialized with filter '{filter}'");

    Ok(layer)
}

/// Returns the log filter directive from the environment, or `fallback` if
/// none of [`LOG_ENV_VARS`] is set.
#[must_use]
pub fn env_filter_or(fallback: &str) -> String {
    resolve_env_filter(|name| std::env::var(name).ok(), fallback)
}

fn resolve_env_filter(lookup: impl Fn(&str) -> Option<String>, fallback: &str) -> String {
    LOG_ENV_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| fallback.to_string())
}

/// Logs the first form at debug level, or the second, more verbose form when
/// trace logging is enabled.
#[cfg(feature = "macros")]
#[macro_export]
macro_rules! debug_or_trace {
    (($($debug:tt)+), ($($trace:tt)+)) => {
        if $crate::log::log_enabled!($crate::log::Level::Trace) {
            $crate::log::trace!($($trace)*);
        } else {
            $crate::log::debug!($($debug)*);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_in(vars: &BTreeMap<&str, &str>) -> impl Fn(&str) -> Option<String> {
        move |name| vars.get(name).map(ToString::to_string)
    }

    #[test_log::test]
    fn newsroom_log_takes_priority_over_rust_log() {
        let vars = BTreeMap::from([
            ("NEWSROOM_LOG", "newsroom_lint=debug"),
            ("RUST_LOG", "warn"),
        ]);

        assert_eq!(
            resolve_env_filter(lookup_in(&vars), "off"),
            "newsroom_lint=debug"
        );
    }

    #[test_log::test]
    fn falls_back_to_rust_log() {
        let vars = BTreeMap::from([("RUST_LOG", "warn")]);

        assert_eq!(resolve_env_filter(lookup_in(&vars), "off"), "warn");
    }

    #[test_log::test]
    fn blank_values_are_ignored() {
        let vars = BTreeMap::from([("NEWSROOM_LOG", "  "), ("RUST_LOG", "")]);

        assert_eq!(resolve_env_filter(lookup_in(&vars), "warn"), "warn");
    }

    #[test_log::test]
    fn fallback_is_used_when_nothing_is_set() {
        let vars = BTreeMap::<&str, &str>::new();

        assert_eq!(resolve_env_filter(lookup_in(&vars), "off"), "off");
    }
}
