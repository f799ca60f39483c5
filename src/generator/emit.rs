//! Source emitters. Each takes resolved data and returns the text of one
//! generated file; the same input always yields byte-identical output.

use super::naming::{python_number, python_str_list};
use super::resolve::{ResolvedAttribute, ResolvedEntity};
use super::templates::{
    render_artifact, MainTemplateData, ModelField, ModelTemplateData, ReadmeTemplateData,
    RepositoryTemplateData, RouteGuard, RouterEntry, RouterTemplateData,
};
use crate::dsl::{ResolvedType, RoleSet};
use crate::error::Result;

/// Emit the SQLModel table class of an entity.
pub fn emit_model(entity: &ResolvedEntity) -> Result<String> {
    let data = ModelTemplateData {
        class_name: entity.class_name.clone(),
        table_name: entity.table_name.clone(),
        extra_imports: datetime_imports(&entity.attributes),
        fields: entity.attributes.iter().map(model_field).collect(),
    };
    render_artifact(&data, &format!("model {}", entity.class_name))
}

/// Emit the repository class of an entity.
pub fn emit_repository(entity: &ResolvedEntity) -> Result<String> {
    let data = RepositoryTemplateData {
        class_name: entity.class_name.clone(),
        module_name: entity.module_name.clone(),
        repository_class: entity.repository_class(),
        unique_fields: entity.unique_fields().map(|a| a.name.clone()).collect(),
        reference_fields: entity.foreign_keys().map(|a| a.name.clone()).collect(),
    };
    render_artifact(&data, &format!("repository {}", entity.class_name))
}

/// Emit the FastAPI router of an entity with its role gates.
pub fn emit_router(entity: &ResolvedEntity) -> Result<String> {
    let read = route_guard(&entity.access.read_roles);
    let write = route_guard(&entity.access.write_roles);
    let remove = route_guard(&entity.access.delete_roles);
    let data = RouterTemplateData {
        class_name: entity.class_name.clone(),
        module_name: entity.module_name.clone(),
        repository_class: entity.repository_class(),
        route_segment: entity.route_segment.clone(),
        gated: !(read.open && write.open && remove.open),
        read,
        write,
        remove,
    };
    render_artifact(&data, &format!("router {}", entity.class_name))
}

/// Emit `app/main.py` with one `include_router` per entity, in catalog order.
pub fn emit_main(entities: &[ResolvedEntity]) -> Result<String> {
    let data = MainTemplateData {
        routers: entities.iter().map(router_entry).collect(),
    };
    render_artifact(&data, "app/main.py")
}

/// Emit the project README with the entity table.
pub fn emit_readme(project_name: &str, entities_file: &str, entities: &[ResolvedEntity]) -> Result<String> {
    let data = ReadmeTemplateData {
        project_name: project_name.to_string(),
        entities_file: entities_file.to_string(),
        routers: entities.iter().map(router_entry).collect(),
    };
    render_artifact(&data, "README.md")
}

/// Build the model line of one attribute.
pub fn model_field(attr: &ResolvedAttribute) -> ModelField {
    let c = &attr.constraints;
    let mut annotation = attr.python_type().to_string();
    if !c.not_null {
        annotation.push_str(" | None");
    }

    let mut args = Vec::new();
    match &c.default_value {
        Some(literal) => args.push(format!("default={literal}")),
        None if !c.not_null => args.push("default=None".to_string()),
        None => {}
    }
    if c.not_null {
        args.push("nullable=False".to_string());
    }
    if c.unique {
        args.push("unique=True".to_string());
    }
    if let Some(table) = &attr.foreign_table {
        args.push(format!("foreign_key=\"{table}.id\""));
    }
    if let Some(max) = c.max_length.filter(|_| attr.takes_max_length()) {
        args.push(format!("max_length={max}"));
    }
    if attr.takes_range() {
        if let Some(min) = c.range_min {
            args.push(format!("ge={}", python_number(min)));
        }
        if let Some(max) = c.range_max {
            args.push(format!("le={}", python_number(max)));
        }
    }

    ModelField {
        name: attr.name.clone(),
        annotation,
        args: args.join(", "),
    }
}

/// Role gate for one endpoint category. The `any` sentinel emits no dependency.
pub fn route_guard(roles: &RoleSet) -> RouteGuard {
    if roles.is_any() {
        RouteGuard {
            open: true,
            dependency: String::new(),
            summary: "public".to_string(),
        }
    } else {
        RouteGuard {
            open: false,
            dependency: format!("require_roles({})", python_str_list(roles.iter())),
            summary: format!("roles: {}", roles.iter().collect::<Vec<_>>().join(", ")),
        }
    }
}

fn router_entry(entity: &ResolvedEntity) -> RouterEntry {
    RouterEntry {
        class_name: entity.class_name.clone(),
        module_name: entity.module_name.clone(),
        route_segment: entity.route_segment.clone(),
        read_roles: entity.access.read_roles.to_string(),
        write_roles: entity.access.write_roles.to_string(),
        delete_roles: entity.access.delete_roles.to_string(),
    }
}

fn datetime_imports(attributes: &[ResolvedAttribute]) -> Vec<String> {
    let uses = |ty: ResolvedType| attributes.iter().any(|a| !a.is_foreign_key() && a.ty == ty);
    let names: Vec<&str> = [(ResolvedType::Date, "date"), (ResolvedType::DateTime, "datetime")]
        .into_iter()
        .filter(|(ty, _)| uses(ty.clone()))
        .map(|(_, name)| name)
        .collect();
    if names.is_empty() {
        Vec::new()
    } else {
        vec![format!("from datetime import {}", names.join(", "))]
    }
}
