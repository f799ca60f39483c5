//! # Definition Linter
//!
//! Collects every problem found in an entity definition file that does not
//! stop parsing. Warnings and info are printed and generation goes on with a
//! fallback. An error means the generated code would be wrong, so
//! `generate_project` refuses to write anything.
//!
//! ## Checks Performed
//!
//! 1. **Unrecognized types** - custom type tokens that name no declared entity
//! 2. **Unparsable modifiers** - malformed `.max(`, `.range(a,b)`, unknown markers
//! 3. **Header problems** - duplicate entities, stray tokens, markers without roles
//! 4. **Identifiers** - names (and lowercased module names) that are not valid
//!    Python identifiers or are keywords
//! 5. **Reserved names** - entities clashing with the generated auth models
//! 6. **Collisions** - entities sharing a module name, repeated attribute names
//! 7. **Relations** - `.fk` on primitives, declared entity types without `.fk`
//! 8. **Ignored constraints** - length caps on non-strings, ranges on non-numbers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use entity_scaffold::linter::{lint_definitions, Severity};
//!
//! let diagnostics = lint_definitions(&std::fs::read_to_string("entities.txt")?)?;
//! for d in &diagnostics {
//!     eprintln!("[{}] {}: {}", d.severity, d.location, d.message);
//! }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::dsl::{self, EntityCatalog};
use crate::error::{Result, ScaffoldError};
use crate::generator::naming::module_name;
use crate::generator::resolve_catalog;


#[allow(clippy::expect_used)]
static PYTHON_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex should be valid")
});

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Lowercase entity names that collide with generated support code. `auth`
/// and `base` would overwrite files outright; `user` and `role` only share a
/// class name with the auth models.
const RESERVED_ENTITY_NAMES: &[(&str, Severity)] = &[
    ("auth", Severity::Error),
    ("base", Severity::Error),
    ("user", Severity::Warning),
    ("role", Severity::Warning),
];

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Generated code will be wrong
    Error,
    /// Generation proceeds with a fallback
    Warning,
    /// Worth knowing, nothing is lost
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnrecognizedType,
    UnparsableModifier,
    DuplicateEntity,
    UnknownHeaderToken,
    MissingRoleList,
    InvalidIdentifier,
    ReservedName,
    ModuleCollision,
    DuplicateAttribute,
    #[serde(rename = "relation_without_fk")]
    RelationWithoutForeignKey,
    ForeignKeyOnPrimitive,
    IgnoredConstraint,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UnrecognizedType => "unrecognized_type",
            DiagnosticKind::UnparsableModifier => "unparsable_modifier",
            DiagnosticKind::DuplicateEntity => "duplicate_entity",
            DiagnosticKind::UnknownHeaderToken => "unknown_header_token",
            DiagnosticKind::MissingRoleList => "missing_role_list",
            DiagnosticKind::InvalidIdentifier => "invalid_identifier",
            DiagnosticKind::ReservedName => "reserved_name",
            DiagnosticKind::ModuleCollision => "module_collision",
            DiagnosticKind::DuplicateAttribute => "duplicate_attribute",
            DiagnosticKind::RelationWithoutForeignKey => "relation_without_fk",
            DiagnosticKind::ForeignKeyOnPrimitive => "foreign_key_on_primitive",
            DiagnosticKind::IgnoredConstraint => "ignored_constraint",
        }
    }

    /// Severity used unless the caller overrides it.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticKind::InvalidIdentifier | DiagnosticKind::ModuleCollision => Severity::Error,
            DiagnosticKind::RelationWithoutForeignKey | DiagnosticKind::IgnoredConstraint => {
                Severity::Info
            }
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal problem found in a definition file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Where the issue occurred (e.g. "line 3, Product.title")
    pub location: String,
    /// 1-based line number, when known
    pub line: Option<usize>,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Human-readable description of the problem
    pub message: String,
    /// Optional hint for fixing it
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default severity
    pub fn new(kind: DiagnosticKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            location: location.into(),
            line: None,
            severity: kind.default_severity(),
            kind,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        if line > 0 {
            self.line = Some(line);
        }
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Add a suggestion for fixing the issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Lint definition text.
///
/// # Errors
///
/// Returns the parse error when the text is structurally malformed; there is
/// nothing meaningful to lint past that point.
pub fn lint_definitions(text: &str) -> Result<Vec<Diagnostic>> {
    let (catalog, mut diagnostics) = dsl::parse_with_diagnostics(text)?;
    let (_, resolve_diagnostics) = resolve_catalog(&catalog);
    diagnostics.extend(resolve_diagnostics);
    diagnostics.extend(lint_catalog(&catalog));
    sort_diagnostics(&mut diagnostics);
    Ok(diagnostics)
}

/// Lint a definition file.
pub fn lint_file(path: &Path) -> Result<Vec<Diagnostic>> {
    let text = std::fs::read_to_string(path).map_err(|e| ScaffoldError::io(path, e))?;
    lint_definitions(&text)
}

/// Naming checks that need the whole catalog but not type resolution.
pub fn lint_catalog(catalog: &EntityCatalog) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    // module name -> first entity generating it
    let mut modules: HashMap<String, (&str, usize)> = HashMap::new();

    for entity in catalog {
        let location = format!("line {}, entity {}", entity.line, entity.name);
        let lowered = module_name(&entity.name);
        if let Some(problem) = identifier_problem(&entity.name) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidIdentifier,
                    &location,
                    format!("entity name `{}` {problem}", entity.name),
                )
                .at_line(entity.line),
            );
        } else if let Some(problem) = identifier_problem(&lowered) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidIdentifier,
                    &location,
                    format!("module name `{lowered}` of entity `{}` {problem}", entity.name),
                )
                .at_line(entity.line)
                .with_suggestion(format!("rename the entity, e.g. `{}Item`", entity.name)),
            );
        }

        match modules.get(&lowered) {
            Some((first, first_line)) => diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::ModuleCollision,
                    &location,
                    format!(
                        "entity `{}` and entity `{first}` (line {first_line}) both generate module `{lowered}`",
                        entity.name
                    ),
                )
                .at_line(entity.line)
                .with_suggestion("entity names must differ after lowercasing"),
            ),
            None => {
                modules.insert(lowered.clone(), (entity.name.as_str(), entity.line));
            }
        }

        if let Some((_, severity)) = RESERVED_ENTITY_NAMES.iter().find(|(n, _)| *n == lowered) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::ReservedName,
                    &location,
                    format!(
                        "entity `{}` collides with generated support code of the same name",
                        entity.name
                    ),
                )
                .with_severity(*severity)
                .at_line(entity.line)
                .with_suggestion("rename the entity, e.g. `Member` or `AppRole`"),
            );
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for attr in &entity.attributes {
            let location = format!("line {}, {}.{}", attr.line, entity.name, attr.var_name);
            if let Some(first_line) = seen.insert(attr.var_name.as_str(), attr.line) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateAttribute,
                        &location,
                        format!(
                            "attribute `{}` is already declared on line {first_line}; the later field replaces it",
                            attr.var_name
                        ),
                    )
                    .at_line(attr.line)
                    .with_suggestion("remove or rename one of the attributes"),
                );
            }
            if attr.var_name == "id" {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::ReservedName,
                        &location,
                        "`id` is the implicit primary key and is always generated",
                    )
                    .at_line(attr.line)
                    .with_suggestion("remove the attribute"),
                );
            } else if let Some(problem) = identifier_problem(&attr.var_name) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::InvalidIdentifier,
                        &location,
                        format!("attribute name `{}` {problem}", attr.var_name),
                    )
                    .at_line(attr.line),
                );
            }
        }
    }

    diagnostics
}

/// Why `name` cannot be used as a Python identifier, if it cannot.
pub fn identifier_problem(name: &str) -> Option<&'static str> {
    if !PYTHON_IDENTIFIER.is_match(name) {
        Some("is not a valid identifier")
    } else if PYTHON_KEYWORDS.contains(&name) {
        Some("is a Python keyword")
    } else {
        None
    }
}

/// Order diagnostics by line, then severity, keeping insertion order for ties.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| (d.line.unwrap_or(usize::MAX), d.severity));
}

/// Whether any diagnostic has [`Severity::Error`].
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Whether any diagnostic is at least a warning.
pub fn has_warnings(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity <= Severity::Warning)
}

/// Print diagnostics grouped by severity.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("✅ No definition issues found!");
        return;
    }

    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    let warnings: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    let infos: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Info)
        .collect();

    println!("\n📋 Definition check:");
    println!(
        "   {} error(s), {} warning(s), {} info(s)\n",
        errors.len(),
        warnings.len(),
        infos.len()
    );

    for (title, group) in [
        ("❌ Errors (generated code will be wrong):", &errors),
        ("⚠️  Warnings (fallback applied):", &warnings),
        ("ℹ️  Info:", &infos),
    ] {
        if group.is_empty() {
            continue;
        }
        println!("{title}");
        for d in group.iter() {
            println!("   [{}] {}", d.kind, d.location);
            println!("      {}", d.message);
            if let Some(suggestion) = &d.suggestion {
                println!("      💡 Suggestion: {suggestion}");
            }
        }
        println!();
    }
}
