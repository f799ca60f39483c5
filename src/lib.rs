//! # entity-scaffold
//!
//! **entity-scaffold** generates a FastAPI + SQLModel backend from a small
//! text file describing entities, their fields and who may touch them.
//!
//! ## Overview
//!
//! ```text
//! Product .w admin
//! - title str.nn.max(120)
//! - price float.range(0,)
//! - category Category.fk
//! Category
//! - label str.unique
//! ```
//!
//! For every entity the generator writes a table model, a repository and a
//! router with role-gated CRUD endpoints, plus the support tree around them:
//! settings, database session, token auth, an admin seed and launch scripts.
//!
//! ## Architecture
//!
//! - **[`dsl`]** - parser for `entities.txt`: entities, attributes, modifiers, access roles
//! - **[`generator`]** - resolution, Askama-based emitters and the project orchestrator
//! - **[`linter`]** - non-fatal diagnostics about a definition file
//! - **[`config`]** - `scaffold.toml` and `SCAFFOLD_*` overrides
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`repository`]** - in-memory model of the generated repository contract
//! - **[`cli`]** - the `entity-scaffold` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(entity-scaffold)
//!     participant Parser as dsl::parse
//!     participant Resolve as generator::resolve
//!     participant Emit as generator::emit
//!     participant Project as generator::project
//!     participant FS as File System
//!
//!     User->>CLI: entity-scaffold generate --entities entities.txt
//!     CLI->>Parser: load_definitions(path)
//!     Parser-->>CLI: EntityCatalog + diagnostics
//!     CLI->>Resolve: resolve_catalog(&catalog)
//!     Resolve-->>CLI: Vec<ResolvedEntity> + diagnostics
//!     CLI->>Emit: emit_model / emit_repository / emit_router
//!     Emit-->>Project: source text per entity
//!     Project->>FS: write artifacts (skip existing support files)
//!     Project-->>CLI: GenerationReport
//!     CLI-->>User: ✅ Generated ... / failures
//! ```
//!
//! ## Example
//!
//! ```rust
//! use entity_scaffold::dsl::parse;
//! use entity_scaffold::generator::{emit_model, resolve_catalog};
//!
//! let catalog = parse("Tag\n- label str.unique\n").unwrap();
//! let (entities, diagnostics) = resolve_catalog(&catalog);
//! assert!(diagnostics.is_empty());
//! let model = emit_model(&entities[0]).unwrap();
//! assert!(model.contains("label: str | None = Field(default=None, unique=True)"));
//! ```

pub mod cli;
pub mod config;
pub mod dsl;
pub mod error;
pub mod generator;
pub mod linter;
pub mod logging;
pub mod repository;

pub use config::ScaffoldConfig;
pub use dsl::{parse, EntityCatalog};
pub use error::{Result, ScaffoldError};
pub use generator::{generate_project, GenerationOptions, GenerationReport, GenerationScope};
