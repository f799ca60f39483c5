use askama::Template;

use crate::error::{Result, ScaffoldError};

/// One field line of a generated table model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelField {
    /// Attribute name
    pub name: String,
    /// Python annotation, `| None` included when nullable
    pub annotation: String,
    /// Comma-separated `Field(...)` arguments
    pub args: String,
}

/// Role gate of one endpoint category in a generated router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    /// No role dependency is emitted
    pub open: bool,
    /// `require_roles([...])` call, empty when open
    pub dependency: String,
    /// Short text for the endpoint docstring
    pub summary: String,
}

/// Entry of the static router registry in `main.py` and the README table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterEntry {
    pub class_name: String,
    pub module_name: String,
    pub route_segment: String,
    pub read_roles: String,
    pub write_roles: String,
    pub delete_roles: String,
}

/// Template data for `app/entities/<name>.py`
#[derive(Template)]
#[template(path = "model.py.txt", escape = "none")]
pub struct ModelTemplateData {
    pub class_name: String,
    pub table_name: String,
    /// Import lines beyond `sqlmodel`
    pub extra_imports: Vec<String>,
    pub fields: Vec<ModelField>,
}

/// Template data for `app/repositories/<name>_repository.py`
#[derive(Template)]
#[template(path = "repository.py.txt", escape = "none")]
pub struct RepositoryTemplateData {
    pub class_name: String,
    pub module_name: String,
    pub repository_class: String,
    /// Fields that get a `get_by_<field>` lookup
    pub unique_fields: Vec<String>,
    /// Foreign-key fields that get a `list_by_<field>` query
    pub reference_fields: Vec<String>,
}

/// Template data for `app/routers/<name>.py`
#[derive(Template)]
#[template(path = "router.py.txt", escape = "none")]
pub struct RouterTemplateData {
    pub class_name: String,
    pub module_name: String,
    pub repository_class: String,
    pub route_segment: String,
    /// Whether any endpoint needs `require_roles`
    pub gated: bool,
    pub read: RouteGuard,
    pub write: RouteGuard,
    pub remove: RouteGuard,
}

/// Template data for `app/main.py`
#[derive(Template)]
#[template(path = "main.py.txt", escape = "none")]
pub struct MainTemplateData {
    pub routers: Vec<RouterEntry>,
}

/// Template data for the project README
#[derive(Template)]
#[template(path = "README.md.txt", escape = "none")]
pub struct ReadmeTemplateData {
    pub project_name: String,
    pub entities_file: String,
    pub routers: Vec<RouterEntry>,
}

/// Template data for `app/utils/core/config.py`; string fields hold Python literals
#[derive(Template)]
#[template(path = "config.py.txt", escape = "none")]
pub struct SettingsTemplateData {
    pub project_name: String,
    pub version: String,
    pub database_url: String,
    pub algorithm: String,
    pub access_token_expire_minutes: u32,
    pub admin_email: String,
}

/// Template data for `.env`
#[derive(Template)]
#[template(path = "env.txt", escape = "none")]
pub struct EnvTemplateData {
    pub project_name: String,
    pub version: String,
    pub database_url: String,
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: u32,
    pub admin_email: String,
    pub admin_password: String,
}

/// Template data for `app/utils/seeds/seed_users.py`
#[derive(Template)]
#[template(path = "seed_users.py.txt", escape = "none")]
pub struct SeedUsersTemplateData {
    /// Python literal of the comma-joined roles granted to the admin
    pub admin_roles: String,
}

#[derive(Template)]
#[template(path = "base_repository.py.txt", escape = "none")]
pub struct BaseRepositoryTemplate;

#[derive(Template)]
#[template(path = "database.py.txt", escape = "none")]
pub struct DatabaseTemplate;

#[derive(Template)]
#[template(path = "auth.py.txt", escape = "none")]
pub struct AuthTemplate;

#[derive(Template)]
#[template(path = "roles.py.txt", escape = "none")]
pub struct RolesTemplate;

#[derive(Template)]
#[template(path = "auth_user.py.txt", escape = "none")]
pub struct AuthUserTemplate;

#[derive(Template)]
#[template(path = "user_repository.py.txt", escape = "none")]
pub struct UserRepositoryTemplate;

#[derive(Template)]
#[template(path = "auth_router.py.txt", escape = "none")]
pub struct AuthRouterTemplate;

#[derive(Template)]
#[template(path = "gitignore.txt", escape = "none")]
pub struct GitignoreTemplate;

#[derive(Template)]
#[template(path = "run.sh.txt", escape = "none")]
pub struct RunShTemplate;

#[derive(Template)]
#[template(path = "run.bat.txt", escape = "none")]
pub struct RunBatTemplate;

/// Render a template, naming `artifact` in the error on failure.
///
/// Trailing whitespace is normalized to a single newline so the output does
/// not depend on how the template file ends.
pub fn render_artifact<T: Template>(template: &T, artifact: &str) -> Result<String> {
    let mut text = template.render().map_err(|source| ScaffoldError::Render {
        artifact: artifact.to_string(),
        source,
    })?;
    text.truncate(text.trim_end().len());
    text.push('\n');
    Ok(text)
}
