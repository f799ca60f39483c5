//! Error types shared by the parser, the emitters and the orchestrator.
//!
//! Structural problems with `entities.txt`, unreadable inputs and template
//! failures are errors. Everything the generator can recover from (unknown
//! types, malformed modifier arguments, ...) is reported as a
//! [`Diagnostic`] instead. Error-severity diagnostics make generation refuse
//! with [`ScaffoldError::DefinitionErrors`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::linter::{Diagnostic, Severity};

/// Result alias used across the library.
pub type Result<T, E = ScaffoldError> = std::result::Result<T, E>;

/// Top-level error type returned by the library.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// Structural DSL error. Aborts the whole run.
    #[error("malformed definition at line {line}{}: {reason}", entity_suffix(.entity))]
    MalformedDefinition {
        /// 1-based line number in the definition file
        line: usize,
        /// Entity the offending line belongs to, when one is open
        entity: Option<String>,
        /// Human-readable explanation
        reason: String,
    },

    /// The definition parsed, but some diagnostics are errors. Nothing is written.
    #[error("{count} definition error(s), first at {location}: {message}")]
    DefinitionErrors {
        /// Number of error-severity diagnostics
        count: usize,
        /// Location of the first error (line and entity)
        location: String,
        /// Message of the first error
        message: String,
        /// Every diagnostic of the run, errors and the rest
        diagnostics: Vec<Diagnostic>,
    },

    /// Filesystem or subprocess failure on a specific path.
    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A template failed to render.
    #[error("failed to render {artifact}: {source}")]
    Render {
        /// Artifact being rendered (e.g. `model Product`)
        artifact: String,
        /// Underlying askama error
        #[source]
        source: askama::Error,
    },

    /// The configuration file exists but cannot be parsed.
    #[error("invalid configuration in {}: {source}", .path.display())]
    Config {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },
}

fn entity_suffix(entity: &Option<String>) -> String {
    match entity {
        Some(name) => format!(" (entity `{name}`)"),
        None => String::new(),
    }
}

impl ScaffoldError {
    /// Build a [`ScaffoldError::MalformedDefinition`].
    pub fn malformed(line: usize, entity: Option<&str>, reason: impl Into<String>) -> Self {
        ScaffoldError::MalformedDefinition {
            line,
            entity: entity.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Build a [`ScaffoldError::DefinitionErrors`] from sorted diagnostics.
    pub fn rejected(diagnostics: Vec<Diagnostic>) -> Self {
        let mut errors = diagnostics.iter().filter(|d| d.severity == Severity::Error);
        let (location, message) = errors
            .next()
            .map(|d| (d.location.clone(), d.message.clone()))
            .unwrap_or_default();
        ScaffoldError::DefinitionErrors {
            count: errors.count() + usize::from(!location.is_empty()),
            location,
            message,
            diagnostics,
        }
    }

    /// Build a [`ScaffoldError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScaffoldError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error comes from the definition file itself.
    pub fn is_malformed_definition(&self) -> bool {
        matches!(self, ScaffoldError::MalformedDefinition { .. })
    }
}
