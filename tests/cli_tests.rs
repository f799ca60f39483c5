#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;

const ENV_VARS: &[&str] = &[
    "SCAFFOLD_ENTITIES_FILE",
    "SCAFFOLD_OUTPUT_DIR",
    "SCAFFOLD_PROJECT_NAME",
    "SCAFFOLD_DATABASE_URL",
    "RUST_LOG",
];

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn scaffold(dir: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_entity-scaffold"));
    cmd.current_dir(dir).args(args);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.output().expect("failed to run entity-scaffold")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_generate_writes_project() {
    let dir = tempdir().unwrap();
    let entities = fixture("shop.txt");
    let output = scaffold(
        dir.path(),
        &["generate", "-e", entities.to_str().unwrap(), "-o", "shop"],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let out = stdout(&output);
    assert!(out.contains("✅ Generated app/entities/product.py"));
    assert!(out.contains("✅ Generated app/main.py"));
    assert!(dir.path().join("shop/app/routers/category.py").is_file());
}

#[test]
fn test_generate_twice_skips_support_files() {
    let dir = tempdir().unwrap();
    let entities = fixture("shop.txt");
    let args = ["generate", "-e", entities.to_str().unwrap(), "-o", "shop"];
    assert!(scaffold(dir.path(), &args).status.success());

    let second = scaffold(dir.path(), &args);
    assert!(second.status.success());
    let out = stdout(&second);
    assert!(out.contains("ℹ️  .env already present (use --force to overwrite)"));
    assert!(out.contains("✅ Generated app/entities/product.py"));
}

#[test]
fn test_no_arguments_generates_from_current_dir() {
    let dir = tempdir().unwrap();
    fs::copy(fixture("shop.txt"), dir.path().join("entities.txt")).unwrap();
    fs::write(dir.path().join("scaffold.toml"), "output_dir = \"backend\"\nproject_name = \"Shop API\"\n").unwrap();

    let output = scaffold(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let config = fs::read_to_string(dir.path().join("backend/app/utils/core/config.py")).unwrap();
    assert!(config.contains("\"Shop API\""));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let entities = fixture("school.txt");
    let output = scaffold(
        dir.path(),
        &["generate", "-e", entities.to_str().unwrap(), "-o", "school", "--dry-run"],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("📝 Would write app/routers/enrollment.py"));
    assert!(!dir.path().join("school").exists());
}

#[test]
fn test_malformed_definitions_fail() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("entities.txt"), "- orphan str\nProduct\n- title str\n").unwrap();

    let output = scaffold(dir.path(), &["generate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1"), "stderr: {stderr}");
    assert!(!dir.path().join("app").exists());
}

#[test]
fn test_missing_definition_file_fails() {
    let dir = tempdir().unwrap();
    let output = scaffold(dir.path(), &["generate", "-e", "nope.txt"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.txt"));
}

#[test]
fn test_lint_exit_codes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("clean.txt"), "Tag\n- label str.unique\n").unwrap();
    fs::write(dir.path().join("warn.txt"), "Doc\n- ref uuid\n").unwrap();
    fs::write(dir.path().join("error.txt"), "Doc\n- class str\n").unwrap();

    assert!(scaffold(dir.path(), &["lint", "-e", "clean.txt"]).status.success());
    assert!(scaffold(dir.path(), &["lint", "-e", "warn.txt"]).status.success());
    assert!(!scaffold(dir.path(), &["lint", "-e", "warn.txt", "--fail-on-warning"])
        .status
        .success());
    assert!(!scaffold(dir.path(), &["lint", "-e", "error.txt"]).status.success());
}

#[test]
fn test_inspect_prints_json() {
    let dir = tempdir().unwrap();
    let entities = fixture("school.txt");
    let output = scaffold(dir.path(), &["inspect", "-e", entities.to_str().unwrap()]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entities = report["entities"].as_array().unwrap();
    let names: Vec<&str> = entities
        .iter()
        .map(|e| e["class_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Enrollment", "Student", "Course"]);
    assert_eq!(entities[0]["attributes"][0]["foreign_table"], "student");
    assert!(report["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn test_entities_file_from_environment() {
    let dir = tempdir().unwrap();
    let entities = fixture("shop.txt");
    let output = Command::new(env!("CARGO_BIN_EXE_entity-scaffold"))
        .current_dir(dir.path())
        .args(["generate", "-o", "out", "--only", "models"])
        .env("SCAFFOLD_ENTITIES_FILE", &entities)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("out/app/entities/product.py").is_file());
    assert!(!dir.path().join("out/app/main.py").exists());
}
