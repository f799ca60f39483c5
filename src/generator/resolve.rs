//! Resolution of parsed entities into generation-ready form.
//!
//! Resolution is where the catalog as a whole is known: a custom type token
//! is either a relation to a declared entity or an unrecognized type, and a
//! `.fk` target may be declared anywhere in the file.

use serde::Serialize;
use tracing::debug;

use super::naming;
use crate::dsl::{map_type, AccessPolicy, AttributeSpec, ConstraintSet, EntityCatalog, EntityDefinition, ResolvedType};
use crate::linter::{Diagnostic, DiagnosticKind};

/// An attribute with its type mapped and constraints interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAttribute {
    pub name: String,
    pub ty: ResolvedType,
    pub constraints: ConstraintSet,
    /// Table referenced by a `.fk` attribute
    pub foreign_table: Option<String>,
    pub line: usize,
}

impl ResolvedAttribute {
    pub fn is_foreign_key(&self) -> bool {
        self.foreign_table.is_some()
    }

    /// Whether `max_length` is emitted for this attribute.
    pub fn takes_max_length(&self) -> bool {
        self.ty.is_string()
    }

    /// Whether `ge` / `le` are emitted. A foreign key is an id, not a quantity.
    pub fn takes_range(&self) -> bool {
        self.ty.is_numeric() && !self.is_foreign_key()
    }

    /// Python annotation before nullability is applied.
    pub fn python_type(&self) -> &str {
        if self.is_foreign_key() {
            "int"
        } else {
            self.ty.python_type()
        }
    }
}

/// An entity ready for the emitters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntity {
    /// Class name, the entity name as written
    pub class_name: String,
    pub module_name: String,
    pub table_name: String,
    /// Plural path segment the router is mounted under
    pub route_segment: String,
    pub attributes: Vec<ResolvedAttribute>,
    pub access: AccessPolicy,
}

impl ResolvedEntity {
    pub fn repository_class(&self) -> String {
        naming::repository_class(&self.class_name)
    }

    /// Attributes declared `.unique`, in declaration order.
    pub fn unique_fields(&self) -> impl Iterator<Item = &ResolvedAttribute> {
        self.attributes.iter().filter(|a| a.constraints.unique)
    }

    /// Foreign-key attributes, in declaration order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ResolvedAttribute> {
        self.attributes.iter().filter(|a| a.is_foreign_key())
    }
}

/// Resolve every entity of the catalog, in catalog order.
pub fn resolve_catalog(catalog: &EntityCatalog) -> (Vec<ResolvedEntity>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let entities = catalog
        .iter()
        .map(|entity| {
            let (resolved, mut found) = resolve_entity(entity, catalog);
            diagnostics.append(&mut found);
            resolved
        })
        .collect();
    (entities, diagnostics)
}

/// Resolve one entity against the catalog it was declared in.
pub fn resolve_entity(
    entity: &EntityDefinition,
    catalog: &EntityCatalog,
) -> (ResolvedEntity, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let attributes = entity
        .attributes
        .iter()
        .map(|attr| resolve_attribute(&entity.name, attr, catalog, &mut diagnostics))
        .collect();

    let module_name = naming::module_name(&entity.name);
    let resolved = ResolvedEntity {
        class_name: entity.name.clone(),
        route_segment: naming::pluralize(&entity.name),
        table_name: naming::table_name(&entity.name),
        module_name,
        attributes,
        access: entity.access.clone(),
    };
    debug!(entity = %resolved.class_name, fields = resolved.attributes.len(), "resolved entity");
    (resolved, diagnostics)
}

fn resolve_attribute(
    entity: &str,
    attr: &AttributeSpec,
    catalog: &EntityCatalog,
    diagnostics: &mut Vec<Diagnostic>,
) -> ResolvedAttribute {
    let location = format!("line {}, {entity}.{}", attr.line, attr.var_name);
    let report = |diagnostics: &mut Vec<Diagnostic>, kind, message: String| {
        diagnostics.push(Diagnostic::new(kind, &location, message).at_line(attr.line));
    };

    let (mut constraints, issues) = attr.constraints();
    for issue in issues {
        report(diagnostics, DiagnosticKind::UnparsableModifier, issue.reason);
    }

    let ty = map_type(&attr.type_token);
    let declared = catalog.contains(&attr.type_token);
    let mut foreign_table = None;

    match (&ty, constraints.foreign_key) {
        (ResolvedType::Custom(token), true) => {
            if !declared {
                report(
                    diagnostics,
                    DiagnosticKind::UnrecognizedType,
                    format!("foreign key target `{token}` is not a declared entity"),
                );
            }
            foreign_table = Some(naming::table_name(token));
        }
        (ResolvedType::Custom(token), false) if declared => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::RelationWithoutForeignKey,
                    &location,
                    format!("type `{token}` names a declared entity but the attribute has no `.fk`"),
                )
                .at_line(attr.line)
                .with_suggestion(format!("write `{} {token}.fk`", attr.var_name)),
            );
        }
        (ResolvedType::Custom(token), false) => {
            report(
                diagnostics,
                DiagnosticKind::UnrecognizedType,
                format!("unrecognized type `{token}`; emitted verbatim"),
            );
        }
        (primitive, true) => {
            report(
                diagnostics,
                DiagnosticKind::ForeignKeyOnPrimitive,
                format!("`.fk` on primitive type `{primitive}` is ignored"),
            );
            constraints.foreign_key = false;
        }
        _ => {}
    }

    let resolved = ResolvedAttribute {
        name: attr.var_name.clone(),
        ty,
        constraints,
        foreign_table,
        line: attr.line,
    };

    if let Some(max) = resolved.constraints.max_length.filter(|_| !resolved.takes_max_length()) {
        report(
            diagnostics,
            DiagnosticKind::IgnoredConstraint,
            format!("`.max({max})` only applies to strings; not emitted"),
        );
    }
    if resolved.constraints.has_range() && !resolved.takes_range() {
        report(
            diagnostics,
            DiagnosticKind::IgnoredConstraint,
            "`.range(..)` only applies to int and float fields; not emitted".to_string(),
        );
    }

    resolved
}
