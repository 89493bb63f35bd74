//! Unit tests for the CLI runtime.

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use rstest::{fixture, rstest};
use tempfile::TempDir;
use trawl_core::{MatchOptions, MatchResult};
use trawl_syntax::SupportedLanguage;

use clap::Parser;

use crate::cli::{Cli, CliCommand};
use crate::output::human_line;
use crate::{resolve_options, run};

struct Outcome {
    code: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str]) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let argv = std::iter::once("trawl")
        .chain(args.iter().copied())
        .map(OsString::from);
    let code = run(argv, &mut stdout, &mut stderr);
    Outcome {
        code,
        stdout: String::from_utf8(stdout).expect("utf-8 stdout"),
        stderr: String::from_utf8(stderr).expect("utf-8 stderr"),
    }
}

#[fixture]
fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.py"), "foo(1)\nbar(2)\n").expect("write a.py");
    fs::write(dir.path().join("b.py"), "x = foo(3)\n").expect("write b.py");
    dir
}

fn root(dir: &TempDir) -> &str {
    dir.path().to_str().expect("utf-8 temp path")
}

#[rstest]
fn json_output_has_one_line_per_match(project: TempDir) {
    let outcome = invoke(&[
        "search",
        root(&project),
        "--pattern",
        "foo($x)",
        "--language",
        "python",
    ]);

    assert_eq!(outcome.code, ExitCode::SUCCESS);
    let texts: Vec<String> = outcome
        .stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).expect("json line");
            value
                .get("text")
                .and_then(serde_json::Value::as_str)
                .expect("text")
                .to_owned()
        })
        .collect();
    assert_eq!(texts, vec!["foo(1)", "foo(3)"]);
}

#[rstest]
fn no_matches_exits_with_one(project: TempDir) {
    let outcome = invoke(&["search", root(&project), "--pattern", "baz($x)", "--language", "py"]);
    assert_eq!(outcome.code, ExitCode::from(1));
    assert!(outcome.stdout.is_empty());
}

#[rstest]
#[case::malformed_pattern(&["--pattern", "foo($$x)", "--language", "python"], "malformed pattern")]
#[case::unknown_language(&["--pattern", "foo($x)", "--language", "cobol"], "unsupported language")]
#[case::pattern_and_configurations(
    &["--pattern", "foo($x)", "--configurations", "c.json", "--named", "calls"],
    "cannot be used with"
)]
fn errors_exit_with_two(project: TempDir, #[case] extra: &[&str], #[case] message: &str) {
    let mut args = vec!["search", root(&project)];
    args.extend_from_slice(extra);
    let outcome = invoke(&args);

    assert_eq!(outcome.code, ExitCode::from(2));
    assert!(outcome.stderr.contains(message), "{}", outcome.stderr);
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent");
    let outcome = invoke(&[
        "search",
        missing.to_str().expect("utf-8 path"),
        "--pattern",
        "foo($x)",
    ]);

    assert_eq!(outcome.code, ExitCode::from(2));
    assert!(outcome.stderr.contains("is not a directory"));
}

#[rstest]
fn named_configurations_are_loaded_from_json(project: TempDir) {
    let configurations = project.path().join("trawl.json");
    fs::write(
        &configurations,
        r#"{"configurations": [{"name": "calls", "language": "python", "pattern": "bar($y)"}]}"#,
    )
    .expect("write configurations");

    let outcome = invoke(&[
        "search",
        root(&project),
        "--configurations",
        configurations.to_str().expect("utf-8 path"),
        "--named",
        "calls",
        "--output",
        "human",
    ]);

    assert_eq!(outcome.code, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout.lines().count(), 1);
    assert!(outcome.stdout.trim_end().ends_with("a.py:2:1: bar(2)"), "{}", outcome.stdout);
}

#[rstest]
#[case::kept_without_flag(&[], true)]
#[case::kept_with_flag(&["--loose"], true)]
fn named_configuration_keeps_its_loose_setting(
    project: TempDir,
    #[case] extra: &[&str],
    #[case] expected: bool,
) {
    let configurations = project.path().join("trawl.json");
    fs::write(
        &configurations,
        r#"{"configurations": [{"name": "calls", "language": "python", "pattern": "bar($y)", "loose": true}]}"#,
    )
    .expect("write configurations");
    let argv = [
        "trawl",
        "search",
        root(&project),
        "--configurations",
        configurations.to_str().expect("utf-8 path"),
        "--named",
        "calls",
    ]
    .into_iter()
    .chain(extra.iter().copied());
    let cli = Cli::try_parse_from(argv).expect("arguments");
    let CliCommand::Search(args) = &cli.command;

    let (_, options) = resolve_options(args).expect("options");
    assert_eq!(options.loose(), expected);
}

#[test]
fn loose_flag_enables_loose_matching_for_inline_patterns() {
    let cli = Cli::try_parse_from(["trawl", "search", ".", "--pattern", "foo($x)", "--loose"])
        .expect("arguments");
    let CliCommand::Search(args) = &cli.command;

    let (_, options) = resolve_options(args).expect("options");
    assert!(options.loose());
}

#[rstest]
fn unknown_configuration_name_is_reported(project: TempDir) {
    let configurations = project.path().join("trawl.json");
    fs::write(&configurations, r#"{"configurations": []}"#).expect("write configurations");

    let outcome = invoke(&[
        "search",
        root(&project),
        "--configurations",
        configurations.to_str().expect("utf-8 path"),
        "--named",
        "calls",
    ]);

    assert_eq!(outcome.code, ExitCode::from(2));
    assert!(outcome.stderr.contains("configuration 'calls' not found"));
}

#[test]
fn help_goes_to_stdout() {
    let outcome = invoke(&["--help"]);
    assert_eq!(outcome.code, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("search"));
}

#[test]
fn human_line_keeps_the_first_line_of_the_match() {
    let workspace = trawl::Workspace::for_directory(".");
    let results: Vec<MatchResult> = trawl::Matcher::new(&workspace)
        .find_matches_in_source(
            "foo(\n    1\n)\n",
            &MatchOptions::new("foo($x)", SupportedLanguage::Python),
        )
        .expect("search");
    let first = results.first().expect("one match");

    assert_eq!(human_line(first), "<memory>:1:1: foo(");
}
