#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Test fixtures for the lint pipeline.
//!
//! A [`TestTree`] owns two temporary directories: the source tree being
//! linted and a separate directory holding fake tool scripts, so the fakes
//! never lint themselves.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Marker that makes the fake formatter fail on a file.
pub const FORMAT_VIOLATION: &str = "# fmt: unformattable";

/// File the fake tools append their invocations to, inside the tools dir.
pub const CALLS_LOG: &str = "calls.log";

/// A Python source tree plus a directory for fake tools.
pub struct TestTree {
    root: TempDir,
    tools: TempDir,
}

impl TestTree {
    /// Creates an empty tree.
    ///
    /// # Panics
    ///
    /// * If fails to create the temporary directories
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp directory"),
            tools: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a tree with the project config files and a tidy package.
    #[must_use]
    pub fn python_project() -> Self {
        let tree = Self::new();
        tree.write("pyproject.toml", "[tool.black]\nline-length = 100\n");
        tree.write(".flake8", "[flake8]\nmax-line-length = 100\n");
        tree.write("src/__init__.py", "");
        tree.write("src/scraper.py", "import json\nimport os\nimport sys\n");
        tree
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    #[must_use]
    pub fn tools_dir(&self) -> &Path {
        self.tools.path()
    }

    /// Writes `contents` to `relative` inside the tree, creating parents.
    ///
    /// # Panics
    ///
    /// * If the file or its parent directories cannot be written
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Reads `relative` inside the tree.
    ///
    /// # Panics
    ///
    /// * If the file cannot be read
    #[must_use]
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root.path().join(relative)).expect("Failed to read file")
    }

    /// The invocations recorded by the fake tools, one `name args` per line.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.tools.path().join(CALLS_LOG))
            .map(|log| log.lines().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Writes `newsroom-lint.toml` into the tree.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        self.write("newsroom-lint.toml", contents)
    }

    /// Installs the three fake tools and points the orchestrator config at
    /// them.
    #[cfg(unix)]
    pub fn install_fake_tools(&self) {
        let black = fake_black(self.tools_dir());
        let isort = fake_isort(self.tools_dir());
        let flake8 = fake_flake8(self.tools_dir());

        self.write_config(&format!(
            "[formatter]\npath = \"{}\"\n\n\
             [import-sorter]\npath = \"{}\"\n\n\
             [style-checker]\npath = \"{}\"\n",
            black.display(),
            isort.display(),
            flake8.display(),
        ));
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes an executable `/bin/sh` script named `name` into `dir`.
///
/// The script first appends `name args` to [`CALLS_LOG`] in `dir`.
///
/// # Panics
///
/// * If the script cannot be written or made executable
#[cfg(unix)]
pub fn write_tool_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;

    let path = dir.join(name);
    let log = dir.join(CALLS_LOG);
    let script = format!(
        "#!/bin/sh\nLC_ALL=C\nexport LC_ALL\necho \"{name} $*\" >> '{}'\n{body}",
        log.display()
    );

    std::fs::write(&path, script).expect("Failed to write tool script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make tool script executable");

    path
}

/// Fails with exit code 123 if any Python file contains [`FORMAT_VIOLATION`].
#[cfg(unix)]
pub fn fake_black(dir: &Path) -> PathBuf {
    write_tool_script(
        dir,
        "black",
        &format!(
            r#"status=0
for f in $(find . -name '*.py' | sort); do
  if grep -q '{FORMAT_VIOLATION}' "$f"; then
    echo "error: cannot format $f" >&2
    status=123
  fi
done
if [ "$status" -eq 0 ]; then
  echo "All done!"
fi
exit $status
"#
        ),
    )
}

/// Sorts the lines of unsorted Python files, or reports them with
/// `--check-only`.
#[cfg(unix)]
pub fn fake_isort(dir: &Path) -> PathBuf {
    write_tool_script(
        dir,
        "isort",
        r#"status=0
for f in $(find . -name '*.py' | sort); do
  if ! sort -c "$f" 2>/dev/null; then
    case " $* " in
      *" --check-only "*)
        echo "ERROR: $f Imports are incorrectly sorted and/or formatted."
        status=1
        ;;
      *)
        sort -o "$f" "$f"
        echo "Fixing $f"
        ;;
    esac
  fi
done
exit $status
"#,
    )
}

/// Reports every Python file whose lines are not sorted.
#[cfg(unix)]
pub fn fake_flake8(dir: &Path) -> PathBuf {
    write_tool_script(
        dir,
        "flake8",
        r#"status=0
for f in $(find . -name '*.py' | sort); do
  if ! sort -c "$f" 2>/dev/null; then
    echo "$f:1:1: I100 Import statements are in the wrong order"
    status=1
  fi
done
exit $status
"#,
    )
}
