//! Unit tests for CLI commands

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::cli::{
    inspect, map_only_to_scope, resolve_generate_config, run, Cli, Commands, GenerateArgs,
    OnlyPart, Outcome,
};
use crate::generator::GenerationScope;
use clap::Parser;
use std::fs;
use tempfile::tempdir;

const SHOP: &str = "Product .w admin\n- title str.nn.max(120)\n- category Category.fk\nCategory\n- label str.unique\n";

#[test]
fn test_no_subcommand_parses() {
    let cli = Cli::try_parse_from(["entity-scaffold"]).unwrap();
    assert!(cli.command.is_none());
    assert!(!cli.verbose);
}

#[test]
fn test_generate_command_with_flags() {
    let cli = Cli::try_parse_from([
        "entity-scaffold",
        "generate",
        "--entities",
        "shop.txt",
        "--output",
        "out",
        "--force",
        "--dry-run",
        "--only",
        "models,routers",
        "--venv",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Generate(args)) => {
            assert_eq!(args.entities.unwrap().to_string_lossy(), "shop.txt");
            assert_eq!(args.output.unwrap().to_string_lossy(), "out");
            assert!(args.force);
            assert!(args.dry_run);
            assert!(args.venv);
            assert_eq!(args.only.unwrap(), vec![OnlyPart::Models, OnlyPart::Routers]);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_lint_command_with_flags() {
    let cli = Cli::try_parse_from([
        "entity-scaffold",
        "lint",
        "-e",
        "entities.txt",
        "--fail-on-warning",
        "--errors-only",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Lint {
            entities,
            fail_on_warning,
            errors_only,
        }) => {
            assert_eq!(entities.unwrap().to_string_lossy(), "entities.txt");
            assert!(fail_on_warning);
            assert!(errors_only);
        }
        _ => panic!("Expected Lint command"),
    }
}

#[test]
fn test_verbose_is_global() {
    let cli = Cli::try_parse_from(["entity-scaffold", "inspect", "-v"]).unwrap();
    assert!(cli.verbose);
}

#[test]
fn test_unknown_only_part_rejected() {
    assert!(Cli::try_parse_from(["entity-scaffold", "generate", "--only", "handlers"]).is_err());
}

#[test]
fn test_map_only_to_scope() {
    assert_eq!(map_only_to_scope(None), GenerationScope::all());
    let scope = map_only_to_scope(Some(&[OnlyPart::Main, OnlyPart::Scaffold]));
    assert!(scope.main && scope.scaffold);
    assert!(!scope.models && !scope.repositories && !scope.routers);
}

#[test]
fn test_flags_override_config_file() {
    let dir = tempdir().unwrap();
    let entities = dir.path().join("entities.txt");
    fs::write(&entities, SHOP).unwrap();
    fs::write(
        dir.path().join("scaffold.toml"),
        "project_name = \"From File\"\noutput_dir = \"from-file\"\n",
    )
    .unwrap();

    let args = GenerateArgs {
        entities: Some(entities.clone()),
        output: Some(dir.path().join("from-flag")),
        ..GenerateArgs::default()
    };
    let config = resolve_generate_config(&args).unwrap();
    assert_eq!(config.project_name, "From File");
    assert_eq!(config.output_dir, dir.path().join("from-flag"));
    assert_eq!(config.entities_file, entities);
}

#[test]
fn test_run_generate_writes_project() {
    let dir = tempdir().unwrap();
    let entities = dir.path().join("entities.txt");
    fs::write(&entities, SHOP).unwrap();
    let out = dir.path().join("shop");

    let cli = Cli {
        verbose: false,
        command: Some(Commands::Generate(GenerateArgs {
            entities: Some(entities),
            output: Some(out.clone()),
            ..GenerateArgs::default()
        })),
    };
    assert_eq!(run(cli).unwrap(), Outcome::Success);
    assert!(out.join("app/entities/product.py").exists());
    assert!(out.join("app/routers/category.py").exists());
    assert!(out.join("run.sh").exists());
}

#[test]
fn test_run_generate_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let entities = dir.path().join("entities.txt");
    fs::write(&entities, SHOP).unwrap();
    let out = dir.path().join("shop");

    let cli = Cli {
        verbose: false,
        command: Some(Commands::Generate(GenerateArgs {
            entities: Some(entities),
            output: Some(out.clone()),
            dry_run: true,
            ..GenerateArgs::default()
        })),
    };
    assert_eq!(run(cli).unwrap(), Outcome::Success);
    assert!(!out.exists());
}

#[test]
fn test_run_generate_malformed_is_error() {
    let dir = tempdir().unwrap();
    let entities = dir.path().join("entities.txt");
    fs::write(&entities, "- orphan str\n").unwrap();

    let cli = Cli {
        verbose: false,
        command: Some(Commands::Generate(GenerateArgs {
            entities: Some(entities),
            output: Some(dir.path().join("out")),
            ..GenerateArgs::default()
        })),
    };
    let err = run(cli).unwrap_err();
    assert!(format!("{err:#}").contains("line 1"));
}

#[test]
fn test_run_generate_refuses_error_diagnostics() {
    let dir = tempdir().unwrap();
    let entities = dir.path().join("entities.txt");
    fs::write(&entities, "Auth\n- token str\n").unwrap();
    let out = dir.path().join("out");

    let cli = Cli {
        verbose: false,
        command: Some(Commands::Generate(GenerateArgs {
            entities: Some(entities),
            output: Some(out.clone()),
            ..GenerateArgs::default()
        })),
    };
    assert_eq!(run(cli).unwrap(), Outcome::Failure);
    assert!(!out.exists());
}

#[test]
fn test_run_lint_outcomes() {
    let dir = tempdir().unwrap();
    let clean = dir.path().join("clean.txt");
    fs::write(&clean, SHOP).unwrap();
    let warned = dir.path().join("warned.txt");
    fs::write(&warned, "Doc\n- ref uuid\n").unwrap();
    let broken = dir.path().join("broken.txt");
    fs::write(&broken, "Doc\n- class str\n").unwrap();

    let lint = |path: &std::path::Path, fail_on_warning: bool| {
        run(Cli {
            verbose: false,
            command: Some(Commands::Lint {
                entities: Some(path.to_path_buf()),
                fail_on_warning,
                errors_only: false,
            }),
        })
        .unwrap()
    };
    assert_eq!(lint(&clean, true), Outcome::Success);
    assert_eq!(lint(&warned, false), Outcome::Success);
    assert_eq!(lint(&warned, true), Outcome::Failure);
    assert_eq!(lint(&broken, false), Outcome::Failure);
}

#[test]
fn test_inspect_serializes_entities() {
    let dir = tempdir().unwrap();
    let entities = dir.path().join("entities.txt");
    fs::write(&entities, SHOP).unwrap();

    let report = inspect(&entities).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entities"][0]["class_name"], "Product");
    assert_eq!(json["entities"][1]["route_segment"], "categorys");
    assert_eq!(json["entities"][0]["access"]["write_roles"][0], "admin");
    assert_eq!(json["entities"][0]["attributes"][1]["foreign_table"], "category");
    assert!(json["diagnostics"].as_array().unwrap().is_empty());
}
