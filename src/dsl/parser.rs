use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::access::{AccessPolicy, HeaderIssue};
use super::catalog::{AttributeSpec, EntityCatalog, EntityDefinition};
use crate::error::{Result, ScaffoldError};
use crate::linter::{Diagnostic, DiagnosticKind};

/// Marker that starts an attribute line.
pub const ATTRIBUTE_MARKER: &str = "- ";

/// Parse definition text into an [`EntityCatalog`].
///
/// Header-level problems that have a safe default are logged and dropped;
/// use [`parse_with_diagnostics`] to keep them.
pub fn parse(text: &str) -> Result<EntityCatalog> {
    let (catalog, diagnostics) = parse_with_diagnostics(text)?;
    for d in &diagnostics {
        warn!(kind = d.kind.as_str(), location = %d.location, "{}", d.message);
    }
    Ok(catalog)
}

/// Parse definition text, returning the catalog and every non-fatal issue.
///
/// # Errors
///
/// [`ScaffoldError::MalformedDefinition`] when an attribute appears before
/// any entity header, an attribute line is empty, or an entity ends up with
/// no attributes.
pub fn parse_with_diagnostics(text: &str) -> Result<(EntityCatalog, Vec<Diagnostic>)> {
    let mut catalog = EntityCatalog::new();
    let mut diagnostics = Vec::new();
    let mut current: Option<EntityDefinition> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(attribute) = attribute_text(line) {
            let Some(entity) = current.as_mut() else {
                return Err(ScaffoldError::malformed(
                    line_no,
                    None,
                    format!("attribute `{attribute}` appears before any entity header"),
                ));
            };
            if attribute.is_empty() {
                return Err(ScaffoldError::malformed(
                    line_no,
                    Some(&entity.name),
                    "empty attribute line",
                ));
            }
            let mut spec = AttributeSpec::split(attribute);
            spec.line = line_no;
            entity.attributes.push(spec);
            continue;
        }

        if let Some(done) = current.take() {
            close_entity(&mut catalog, &mut diagnostics, done)?;
        }
        current = Some(open_entity(line, line_no, &mut diagnostics));
    }

    if let Some(done) = current.take() {
        close_entity(&mut catalog, &mut diagnostics, done)?;
    }

    debug!(entities = catalog.len(), "parsed entity definitions");
    Ok((catalog, diagnostics))
}

/// Read and parse a definition file.
pub fn load_definitions(path: &Path) -> Result<(EntityCatalog, Vec<Diagnostic>)> {
    let text = fs::read_to_string(path).map_err(|e| ScaffoldError::io(path, e))?;
    parse_with_diagnostics(&text)
}

/// The attribute text of an attribute line, or `None` for a header line.
///
/// Lines are trimmed before this runs, so `"- "` on its own arrives as `"-"`.
pub(super) fn attribute_text(line: &str) -> Option<&str> {
    if line == "-" {
        Some("")
    } else {
        line.strip_prefix(ATTRIBUTE_MARKER)
    }
}

fn open_entity(line: &str, line_no: usize, diagnostics: &mut Vec<Diagnostic>) -> EntityDefinition {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let name = tokens.first().copied().unwrap_or_default();
    let location = format!("line {line_no}, entity {name}");

    let (access, issues) = AccessPolicy::from_header_tokens(&tokens[1..]);
    for issue in issues {
        let diagnostic = match issue {
            HeaderIssue::MissingRoleList { marker } => Diagnostic::new(
                DiagnosticKind::MissingRoleList,
                &location,
                format!("`{marker}` is not followed by a role list; access stays unrestricted"),
            )
            .with_suggestion(format!("write `{marker} role1,role2`")),
            HeaderIssue::UnknownToken { token } => Diagnostic::new(
                DiagnosticKind::UnknownHeaderToken,
                &location,
                format!("unexpected token `{token}` on entity header; ignored"),
            )
            .with_suggestion("header tokens after the name must be `.r`, `.w` or `.d` markers"),
        };
        diagnostics.push(diagnostic.at_line(line_no));
    }

    debug!(entity = name, line = line_no, "entity header");
    EntityDefinition {
        name: name.to_string(),
        attributes: Vec::new(),
        access,
        line: line_no,
    }
}

fn close_entity(
    catalog: &mut EntityCatalog,
    diagnostics: &mut Vec<Diagnostic>,
    entity: EntityDefinition,
) -> Result<()> {
    if entity.attributes.is_empty() {
        return Err(ScaffoldError::malformed(
            entity.line,
            Some(&entity.name),
            "entity declares no attributes",
        ));
    }

    let (name, line) = (entity.name.clone(), entity.line);
    if let Some(previous) = catalog.insert(entity) {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::DuplicateEntity,
                format!("line {line}, entity {name}"),
                format!(
                    "entity `{name}` is declared again (first at line {}); the later declaration wins",
                    previous.line
                ),
            )
            .at_line(line),
        );
    }
    Ok(())
}
