//! # Entity Definition DSL
//!
//! `entities.txt` is a line-oriented description of the domain:
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
//! - a line that does not start with `- ` opens an entity; its first token is
//!   the entity name and the rest are access markers ([`access`])
//! - a `- ` line adds an attribute: name, type token, modifiers
//!   ([`modifiers`], [`types`])
//! - blank lines and `#` comments are ignored
//!
//! Parsing produces an [`EntityCatalog`] value that the generator consumes.
//! Nothing is kept in global state.

pub mod access;
pub mod catalog;
pub mod modifiers;
pub mod parser;
pub mod types;

pub use access::{get_access, AccessPolicy, RoleSet, ANY_ROLE};
pub use catalog::{AttributeSpec, EntityCatalog, EntityDefinition};
pub use modifiers::{parse_modifiers, scan_modifiers, ConstraintSet, ModifierIssue};
pub use parser::{load_definitions, parse, parse_with_diagnostics};
pub use types::{map_type, ResolvedType};
