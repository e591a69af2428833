mod common;

use common::{write_data, TEAS_YAML, TISANES_YAML};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

/// A scratch directory with fixture data and an isolated environment
struct Workspace {
    dir: TempDir,
    teas: PathBuf,
    tisanes: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let teas = write_data(dir.path(), "teas.yaml", TEAS_YAML);
        let tisanes = write_data(dir.path(), "tisanes.yaml", TISANES_YAML);
        Self { dir, teas, tisanes }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_tea-explorer"));
        command
            .current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg-config"))
            .env("XDG_DATA_HOME", self.path().join("xdg-data"))
            .env_remove("RUST_LOG")
            .env_remove("TEA_EXPLORER_CONFIG")
            .env_remove("TEA_EXPLORER_SOURCES")
            .env_remove("TEA_EXPLORER_LOAD_MODE")
            .env_remove("TEA_EXPLORER_JOURNAL")
            .env_remove("TEA_EXPLORER_MAX_COMPARE")
            .env_remove("TEA_EXPLORER_LOG_LEVEL")
            .arg("--journal-file")
            .arg(self.path().join("journal.json"));
        command
    }

    /// Run with both fixture files as data sources
    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .arg("--data")
            .arg(&self.teas)
            .arg("--data")
            .arg(&self.tisanes)
            .args(args)
            .output()
            .expect("Failed to execute tea-explorer")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_cli_help_command() {
    let workspace = Workspace::new();
    let output = workspace.command().arg("--help").output().unwrap();

    assert!(output.status.success());
    let text = stdout(&output);
    for command in [
        "list",
        "filter",
        "search",
        "show",
        "facets",
        "compare",
        "recommend",
        "export",
        "validate",
        "journal",
    ] {
        assert!(text.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_cli_list_teas() {
    let workspace = Workspace::new();
    let output = workspace.run(&["list", "tea"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("darjeeling-first-flush"));
    assert!(text.contains("5 tea record(s)"));
}

#[test]
fn test_cli_filter_json_output() {
    let workspace = Workspace::new();
    let output = workspace.run(&["filter", "tea", "--where", "category=Green", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let records: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let ids: Vec<&str> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["sencha", "gyokuro"]);
}

#[test]
fn test_cli_missing_data_cannot_open_reference_data() {
    let workspace = Workspace::new();
    let output = workspace
        .command()
        .args(["--data", "missing.yaml", "list", "tea"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot open reference data"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_cli_strict_and_lenient_loads() {
    let workspace = Workspace::new();
    let broken = write_data(
        workspace.path(),
        "broken.yaml",
        "tea:\n  - name: Sencha\n    category: Green\n  - name: No Category\n",
    );

    let strict = workspace
        .command()
        .arg("--data")
        .arg(&broken)
        .args(["list", "tea"])
        .output()
        .unwrap();
    assert!(!strict.status.success());
    assert!(stderr(&strict).contains("cannot open reference data"));
    assert!(stdout(&strict).is_empty());

    let lenient = workspace
        .command()
        .arg("--data")
        .arg(&broken)
        .args(["--lenient", "list", "tea"])
        .output()
        .unwrap();
    assert!(lenient.status.success());
    assert!(stderr(&lenient).contains("reference data is partial"));
    assert!(stdout(&lenient).contains("1 tea record(s)"));
}

#[test]
fn test_cli_show_missing_record() {
    let workspace = Workspace::new();
    let output = workspace.run(&["show", "tea", "matcha"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("no such item: tea 'matcha'"));
}

#[test]
fn test_cli_compare_mixed_kinds_fails() {
    let workspace = Workspace::new();
    let output = workspace.run(&["compare", "tea:sencha", "tea:gyokuro", "blend:earl-grey"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid query"));

    let output = workspace.run(&["compare", "--kind", "tea", "sencha", "gyokuro"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Comparing 2 tea records"));
    assert!(text.contains("= origin"));
}

#[test]
fn test_cli_export_is_byte_identical() {
    let workspace = Workspace::new();
    let first = workspace.path().join("first.csv");
    let second = workspace.path().join("second.csv");

    for target in [&first, &second] {
        let output = workspace.run(&[
            "export",
            "tea",
            "--where",
            "category=Green",
            "--output",
            target.to_str().unwrap(),
        ]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);
    assert_eq!(String::from_utf8(a).unwrap().lines().count(), 3);
}

#[test]
fn test_cli_journal_flow() {
    let workspace = Workspace::new();

    let added = workspace.run(&["journal", "add", "tisane", "hibiscus", "--rating", "7", "--notes", "Tart"]);
    assert!(added.status.success(), "stderr: {}", stderr(&added));
    assert!(stdout(&added).contains("Added entry #1 for Hibiscus ★★★★★"));

    let missing = workspace.run(&["journal", "add", "tea", "matcha", "--rating", "3"]);
    assert!(!missing.status.success());

    let listed = workspace.run(&["journal", "list", "--json"]);
    assert!(listed.status.success());
    let entries: serde_json::Value = serde_json::from_str(&stdout(&listed)).unwrap();
    assert_eq!(entries[0]["rating"], 5);
    assert_eq!(entries[0]["record"]["id"], "hibiscus");

    let edited = workspace.run(&["journal", "edit", "1", "--rating", "3"]);
    assert!(edited.status.success());

    let stats = workspace.run(&["journal", "stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&stdout(&stats)).unwrap();
    assert_eq!(stats["total_entries"], 1);
    assert_eq!(stats["average_rating"], 3.0);

    let deleted = workspace.run(&["journal", "delete", "1"]);
    assert!(deleted.status.success());
    let listed = workspace.run(&["journal", "list"]);
    assert!(stdout(&listed).contains("No journal entries."));
}

#[test]
fn test_cli_validate_reports_counts() {
    let workspace = Workspace::new();
    let output = workspace.run(&["validate", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["loaded"]["tea"], 5);
    assert_eq!(report["loaded"]["tisane"], 2);
    assert_eq!(report["mode"], "strict");
}

fn recommended_ids(output: &Output) -> Vec<(String, f64)> {
    let suggestions: serde_json::Value = serde_json::from_str(&stdout(output)).unwrap();
    suggestions
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            (
                s["record"]["id"].as_str().unwrap().to_string(),
                s["score"].as_f64().unwrap(),
            )
        })
        .collect()
}

#[test]
fn test_cli_recommend_similar_and_next() {
    let workspace = Workspace::new();

    let similar = workspace.run(&["recommend", "similar", "tea", "sencha", "--json"]);
    assert!(similar.status.success(), "stderr: {}", stderr(&similar));
    assert_eq!(recommended_ids(&similar), vec![("gyokuro".to_string(), 5.0)]);

    let empty = workspace.run(&["recommend", "next"]);
    assert!(empty.status.success());
    assert!(stdout(&empty).contains("No tea recommendations."));

    let added = workspace.run(&["journal", "add", "tea", "sencha", "--rating", "5"]);
    assert!(added.status.success(), "stderr: {}", stderr(&added));

    let next = workspace.run(&["recommend", "next", "--json"]);
    assert!(next.status.success(), "stderr: {}", stderr(&next));
    assert_eq!(recommended_ids(&next), vec![("gyokuro".to_string(), 3.0)]);

    let text = workspace.run(&["recommend", "rated"]);
    assert!(text.status.success());
    assert!(stdout(&text).contains("gyokuro"));
    assert!(!stdout(&text).contains("sencha"));
}

#[test]
fn test_cli_recommend_by_field_needs_the_field() {
    let workspace = Workspace::new();

    let by_origin = workspace.run(&["recommend", "origin", "tea", "india", "-n", "1", "--json"]);
    assert!(by_origin.status.success(), "stderr: {}", stderr(&by_origin));
    assert_eq!(
        recommended_ids(&by_origin),
        vec![("darjeeling-first-flush".to_string(), 1.0)]
    );

    let output = workspace.run(&["recommend", "origin", "tisane", "Egypt"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid query"));
}

#[test]
fn test_cli_facets_lists_distinct_values() {
    let workspace = Workspace::new();

    let output = workspace.run(&["facets", "tea", "origin"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Blend\nIndia\nJapan\n");

    let output = workspace.run(&["facets", "tisane", "cultivation_countries", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let values: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(values, vec!["Egypt", "Mexico", "Sudan"]);

    let output = workspace.run(&["facets", "tea", "brew_temp_c"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid query"));
}

#[test]
fn test_cli_requested_log_level_covers_config_loading() {
    let workspace = Workspace::new();

    let flagged = workspace.run(&["--log-level", "debug", "list", "tea"]);
    assert!(flagged.status.success(), "stderr: {}", stderr(&flagged));
    assert!(stderr(&flagged).contains("Configuration loaded"));
    assert!(stdout(&flagged).contains("5 tea record(s)"));

    let from_env = workspace
        .command()
        .env("RUST_LOG", "debug")
        .arg("--data")
        .arg(&workspace.teas)
        .args(["list", "tea"])
        .output()
        .unwrap();
    assert!(from_env.status.success(), "stderr: {}", stderr(&from_env));
    assert!(stderr(&from_env).contains("Configuration loaded"));

    // a level from the config file only applies once the file has been read
    write_data(workspace.path(), "tea-explorer.yaml", "logging:\n  level: debug\n");
    let configured = workspace.run(&["list", "tea"]);
    assert!(configured.status.success(), "stderr: {}", stderr(&configured));
    assert!(!stderr(&configured).contains("Configuration loaded"));
    assert!(stderr(&configured).contains("Starting"));
}
