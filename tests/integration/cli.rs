//! The `viewreg` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use viewreg::test_utils::{ConfigFixture, TemplateTree};

fn viewreg(tree: &TemplateTree) -> Command {
    let mut cmd = Command::cargo_bin("viewreg").unwrap();
    cmd.current_dir(tree.path()).env_remove("RUST_LOG").env_remove("VIEWREG_CONFIG");
    cmd
}

fn sample_tree() -> TemplateTree {
    TemplateTree::with_files(&[
        ("templates/a.tmpl", "Hello {{ Name }}"),
        ("templates/sub/b.tmpl", "B"),
        ("templates/notes.txt", "ignored"),
        ("user.json", r#"{"Name": "Amy"}"#),
        ("user.yaml", "Name: Bo\n"),
    ])
    .unwrap()
}

#[test]
fn test_render_with_json_data() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--dir", "templates", "--ext", ".tmpl", "render", "a.tmpl", "--data", "user.json"])
        .assert()
        .success()
        .stdout("Hello Amy");
}

#[test]
fn test_render_to_output_file() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--dir", "templates", "render", "a.tmpl", "-d", "user.yaml", "-o", "out.txt"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(fs::read_to_string(tree.file("out.txt")).unwrap(), "Hello Bo");
}

#[test]
fn test_render_unknown_alias_suggests() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--dir", "templates", "render", "b.tmpl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template 'b.tmpl' not found"))
        .stderr(predicate::str::contains("Did you mean"));
}

#[test]
fn test_render_missing_variable_fails() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--dir", "templates", "render", "a.tmpl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render template 'a.tmpl'"))
        .stderr(predicate::str::contains("Name"));
}

#[test]
fn test_list_aliases() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--dir", "templates", "--ext", "tmpl", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.tmpl"))
        .stdout(predicate::str::contains("sub/b.tmpl"))
        .stdout(predicate::str::contains("notes.txt").not());
}

#[test]
fn test_list_non_recursive_json() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--dir", "templates", "--ext", "tmpl", "--no-recursive", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"alias\": \"a.tmpl\""))
        .stdout(predicate::str::contains("\"loaded\": true"))
        .stdout(predicate::str::contains("sub/b.tmpl").not());
}

#[test]
fn test_list_rejects_unknown_format() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--dir", "templates", "list", "--format", "table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format 'table'"));
}

#[test]
fn test_check_reports_loaded_templates() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--dir", "templates", "--ext", ".tmpl", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 templates loaded"));
}

#[test]
fn test_check_fails_on_broken_template() {
    let tree = sample_tree();
    tree.write("templates/broken.tmpl", "{% if %}").unwrap();

    viewreg(&tree)
        .args(["--dir", "templates", "--ext", ".tmpl", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse template 'broken.tmpl'"));
}

#[test]
fn test_config_file_in_working_directory() {
    let tree = TemplateTree::with_files(&[
        ("templates/page.html", "<p>{{ v }}</p>"),
        ("shared/layout.html", "L"),
        ("data.toml", "v = \"<x>\"\n"),
    ])
    .unwrap();
    ConfigFixture::with_layout().write_to(tree.path()).unwrap();

    viewreg(&tree)
        .args(["render", "page.html", "--data", "data.toml"])
        .assert()
        .success()
        .stdout("<p>&lt;x&gt;</p>");

    viewreg(&tree)
        .args(["list", "--paths"])
        .assert()
        .success()
        .stdout(predicate::str::contains("layout"))
        .stdout(predicate::str::contains("page.html"));
}

#[test]
fn test_explicit_config_resolves_relative_paths() {
    let tree = TemplateTree::with_files(&[
        ("site/templates/a.tmpl", "A {{ v }}"),
        ("site/shared/layout.html", "L"),
        ("data.json", r#"{"v": 1}"#),
    ])
    .unwrap();
    let config = ConfigFixture::with_layout().write_to(&tree.file("site")).unwrap();

    viewreg(&tree)
        .args(["--config", config.to_str().unwrap(), "render", "a.tmpl", "--data", "data.json"])
        .assert()
        .success()
        .stdout("A 1");

    viewreg(&tree)
        .args(["--config", config.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("layout"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let tree = sample_tree();

    viewreg(&tree)
        .args(["--config", "nope.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_unsupported_data_format() {
    let tree = sample_tree();
    tree.write("data.ini", "Name=Amy").unwrap();

    viewreg(&tree)
        .args(["--dir", "templates", "render", "a.tmpl", "--data", "data.ini"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported data file"));
}
