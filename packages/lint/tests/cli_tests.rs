#![cfg(unix)]

use std::{
    path::Path,
    process::{Command, Output},
};

use newsroom_lint_test_utilities::{
    CALLS_LOG, FORMAT_VIOLATION, TestTree, fake_black, fake_flake8, fake_isort,
};
use pretty_assertions::assert_eq;

const HELP: &str = "Usage: newsroom-lint <COMMAND>\n\
                    \n\
                    Commands:\n  \
                    1. help  Show the available commands\n  \
                    2. lint  Format, sort imports and style-check the source tree\n";

fn newsroom_lint(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_newsroom-lint"))
        .args(args)
        .current_dir(dir)
        .env_remove("NEWSROOM_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run newsroom-lint")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn project() -> TestTree {
    let tree = TestTree::python_project();
    tree.install_fake_tools();
    tree
}

#[test_log::test]
fn help_lists_two_commands_and_exits_zero() {
    let tree = TestTree::new();

    let output = newsroom_lint(tree.path(), &["help"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), HELP);
}

#[test_log::test]
fn no_command_behaves_like_help() {
    let tree = project();

    let output = newsroom_lint(tree.path(), &[]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), HELP);
    assert!(tree.calls().is_empty());
}

#[test_log::test]
fn clean_tree_exits_zero() {
    let tree = project();

    let output = newsroom_lint(tree.path(), &["lint"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with("==> black --config pyproject.toml .\n"));
    assert!(stdout(&output).ends_with("All checks passed\n"));
    assert_eq!(stderr(&output), "");
}

#[test_log::test]
fn failing_step_exits_one() {
    let tree = project();
    tree.write("src/writer.py", &format!("{FORMAT_VIOLATION}\nimport os\n"));

    let output = newsroom_lint(tree.path(), &["lint"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(tree.calls().len(), 3);
}

#[test_log::test]
fn repeated_runs_print_identical_output() {
    let tree = project();

    let first = newsroom_lint(tree.path(), &["lint", "--check"]);
    let second = newsroom_lint(tree.path(), &["lint", "--check"]);

    assert_eq!(first.status.code(), Some(0));
    assert_eq!(stdout(&first), stdout(&second));
    assert_eq!(stderr(&first), stderr(&second));
}

#[test_log::test]
fn malformed_config_exits_two() {
    let tree = project();
    tree.write_config("[formatter\n");

    let output = newsroom_lint(tree.path(), &["lint"]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).starts_with("error: Failed to parse config file"));
    assert!(tree.calls().is_empty());
}

#[test_log::test]
fn missing_root_exits_two() {
    let tree = TestTree::new();

    let output = newsroom_lint(tree.path(), &["lint", "--root", "no-such-tree"]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr(&output),
        "error: Lint root 'no-such-tree' is not a directory\n"
    );
}

#[test_log::test]
fn json_output_is_parseable_even_with_logging_requested() {
    let tree = project();
    tree.write("src/publisher.py", "import sys\nimport json\n");

    for filter in [None, Some("trace")] {
        let mut command = Command::new(env!("CARGO_BIN_EXE_newsroom-lint"));
        command
            .args(["lint", "--check", "--output", "json"])
            .current_dir(tree.path())
            .env_remove("RUST_LOG")
            .env_remove("NEWSROOM_LOG");
        if let Some(filter) = filter {
            command.env("NEWSROOM_LOG", filter);
        }

        let output = command.output().unwrap();
        let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert_eq!(report["mode"], "check");
        assert_eq!(report["tools"][1]["status"], "failed");
        assert_eq!(report["tools"].as_array().unwrap().len(), 3);
    }
}

#[test_log::test]
fn relative_tool_paths_resolve_against_config_directory() {
    let workspace = TestTree::new();
    let bin = workspace.path().join("tree").join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    fake_black(&bin);
    fake_isort(&bin);
    fake_flake8(&bin);
    workspace.write("tree/pyproject.toml", "");
    workspace.write("tree/.flake8", "");
    workspace.write("tree/src/scraper.py", "import json\nimport os\n");
    workspace.write(
        "tree/newsroom-lint.toml",
        "[formatter]\npath = \"bin/black\"\n\n\
         [import-sorter]\npath = \"bin/isort\"\n\n\
         [style-checker]\npath = \"bin/flake8\"\n",
    );

    let output = newsroom_lint(workspace.path(), &["lint", "--root", "tree"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        std::fs::read_to_string(bin.join(CALLS_LOG)).unwrap(),
        "black --config pyproject.toml .\n\
         isort --profile black .\n\
         flake8 --config .flake8 .\n"
    );
}
