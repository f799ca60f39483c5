//! # Generator Module
//!
//! Turns a parsed [`EntityCatalog`](crate::dsl::EntityCatalog) into the
//! source tree of a FastAPI + SQLModel backend.
//!
//! ## Architecture
//!
//! ```text
//! entities.txt → Parser → EntityCatalog → Resolver → ResolvedEntity → Emitters → Orchestrator
//! ```
//!
//! 1. **Resolver** ([`resolve`]) - maps type tokens, interprets modifiers and
//!    resolves foreign keys against the whole catalog
//! 2. **Emitters** ([`emit`]) - render Askama templates into model,
//!    repository and router source, one triple per entity
//! 3. **Orchestrator** (`project`) - plans every file of the project,
//!    writes it, and reports per-file failures
//!
//! ## Generated Structure
//!
//! ```text
//! <output>/
//! ├── .env, .gitignore, requirements.txt, README.md, run.sh, run.bat
//! └── app/
//!     ├── main.py                    # router registry, one include per entity
//!     ├── entities/<name>.py         # SQLModel table
//!     ├── entities/auth/user.py
//!     ├── repositories/<name>_repository.py
//!     ├── repositories/base_repository.py
//!     ├── repositories/auth/user_repository.py
//!     ├── routers/<name>.py          # CRUD endpoints with role gates
//!     ├── routers/auth.py
//!     └── utils/{core,auth,seeds}/
//! ```
//!
//! Entity triples and `main.py` are derived from `entities.txt` and rewritten
//! on every run. The remaining files are meant to be edited and are only
//! replaced with `--force`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use entity_scaffold::config::ScaffoldConfig;
//! use entity_scaffold::generator::{generate_project, GenerationOptions};
//!
//! let config = ScaffoldConfig::default();
//! let report = generate_project(&config.entities_file, &config, &GenerationOptions::default())?;
//! assert!(report.is_success());
//! ```
//!
//! ## Templates
//!
//! Templates live in `templates/`; `model.py.txt`, `repository.py.txt` and
//! `router.py.txt` produce the per-entity files.

pub mod emit;
pub mod naming;
mod project;
pub mod resolve;
mod templates;

pub use emit::{emit_main, emit_model, emit_readme, emit_repository, emit_router, model_field, route_guard};
pub use naming::pluralize;
pub use project::*;
pub use resolve::{resolve_catalog, resolve_entity, ResolvedAttribute, ResolvedEntity};
pub use templates::{ModelField, RouteGuard, RouterEntry};
