//! # CLI Module
//!
//! Command-line interface of the `entity-scaffold` binary.
//!
//! ## Commands
//!
//! ### `generate` (default)
//!
//! ```bash
//! entity-scaffold generate --entities entities.txt --output shop
//! ```
//!
//! Options:
//! - `--entities <FILE>` - entity definition file (default: `entities.txt`)
//! - `--output <DIR>` - project root (default: from `scaffold.toml`, else `.`)
//! - `--config <FILE>` - configuration file (default: `scaffold.toml` beside the entities file)
//! - `--project-name <NAME>` - application title
//! - `--force` - overwrite existing support files
//! - `--dry-run` - report what would be written
//! - `--only <PARTS>` - scaffold, models, repositories, routers, main
//! - `--venv` - create `venv/` and install requirements afterwards
//!
//! Running `entity-scaffold` with no arguments is the same as `generate`
//! with every default.
//!
//! ### `lint`
//!
//! ```bash
//! entity-scaffold lint --entities entities.txt --fail-on-warning
//! ```
//!
//! ### `inspect`
//!
//! ```bash
//! entity-scaffold inspect --entities entities.txt | jq '.entities[].route_segment'
//! ```
//!
//! ## Exit Status
//!
//! `0` on success. Non-zero when the definition file is malformed or
//! unreadable, a template fails, any artifact cannot be written, the venv
//! bootstrap fails, or `lint` finds errors.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{
    inspect, map_only_to_scope, resolve_generate_config, run, run_cli, Cli, Commands,
    GenerateArgs, InspectReport, OnlyPart, Outcome, DEFAULT_ENTITIES_FILE,
};
