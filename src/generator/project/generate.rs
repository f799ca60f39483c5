use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::ScaffoldConfig;
use crate::dsl::load_definitions;
use crate::error::{Result, ScaffoldError};
use crate::generator::emit::{emit_main, emit_model, emit_readme, emit_repository, emit_router};
use crate::generator::naming::python_str_literal;
use crate::generator::resolve::{resolve_catalog, ResolvedEntity};
use crate::generator::templates::{
    render_artifact, AuthRouterTemplate, AuthTemplate, AuthUserTemplate, BaseRepositoryTemplate,
    DatabaseTemplate, EnvTemplateData, GitignoreTemplate, RolesTemplate, RunBatTemplate,
    RunShTemplate, SeedUsersTemplateData, SettingsTemplateData, UserRepositoryTemplate,
};
use crate::linter::{has_errors, lint_catalog, sort_diagnostics, Diagnostic};

/// Python packages of the generated tree; each gets an empty `__init__.py`.
const PACKAGES: &[&str] = &[
    "app",
    "app/entities",
    "app/entities/auth",
    "app/repositories",
    "app/repositories/auth",
    "app/routers",
    "app/utils",
    "app/utils/auth",
    "app/utils/core",
    "app/utils/seeds",
];

/// Roles the seeded administrator always holds.
const BASE_ADMIN_ROLES: &[&str] = &["admin", "user"];

/// Which parts of the project a run regenerates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationScope {
    /// Support files: settings, database, auth, seeds, launch scripts, packages
    pub scaffold: bool,
    pub models: bool,
    pub repositories: bool,
    pub routers: bool,
    /// `app/main.py` with the router registry
    pub main: bool,
}

impl GenerationScope {
    pub fn all() -> Self {
        GenerationScope {
            scaffold: true,
            models: true,
            repositories: true,
            routers: true,
            main: true,
        }
    }

    pub fn none() -> Self {
        GenerationScope {
            scaffold: false,
            models: false,
            repositories: false,
            routers: false,
            main: false,
        }
    }
}

impl Default for GenerationScope {
    fn default() -> Self {
        GenerationScope::all()
    }
}

/// Options of one generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Overwrite support files that already exist
    pub force: bool,
    /// Plan and report without touching the filesystem
    pub dry_run: bool,
    pub scope: GenerationScope,
}

/// What an artifact is, which decides whether existing files are replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Repository,
    Router,
    Main,
    Support,
    Package,
}

impl ArtifactKind {
    /// Derived artifacts are rewritten on every run; the rest are hand-editable.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            ArtifactKind::Model | ArtifactKind::Repository | ArtifactKind::Router | ArtifactKind::Main
        )
    }
}

/// One file of the generated project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub contents: String,
    /// Mark the file executable (launch scripts)
    pub executable: bool,
}

impl Artifact {
    fn new(path: impl Into<PathBuf>, kind: ArtifactKind, contents: String) -> Self {
        Artifact {
            path: path.into(),
            kind,
            contents,
            executable: false,
        }
    }
}

/// A write that failed; the run continues with the remaining artifacts
#[derive(Debug)]
pub struct ArtifactFailure {
    pub path: PathBuf,
    pub error: ScaffoldError,
}

/// Outcome of a generation run
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    /// Files written, relative to `output_dir`
    pub written: Vec<PathBuf>,
    /// Support files left untouched because they exist
    pub skipped: Vec<PathBuf>,
    /// Files a dry run would have written
    pub planned: Vec<PathBuf>,
    pub failures: Vec<ArtifactFailure>,
    /// Non-fatal findings about the definition file
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Generate a project from a definition file.
///
/// # Errors
///
/// Reading or parsing the definition file, and rendering any template, are
/// fatal. So is any error-severity diagnostic: an entity whose module would
/// overwrite another file or would not import in Python yields
/// [`ScaffoldError::DefinitionErrors`] and nothing is written. Write
/// failures are not fatal: they are collected in
/// [`GenerationReport::failures`].
pub fn generate_project(
    entities_path: &Path,
    config: &ScaffoldConfig,
    options: &GenerationOptions,
) -> Result<GenerationReport> {
    let (catalog, mut diagnostics) = load_definitions(entities_path)?;
    let (entities, resolve_diagnostics) = resolve_catalog(&catalog);
    diagnostics.extend(resolve_diagnostics);
    diagnostics.extend(lint_catalog(&catalog));
    sort_diagnostics(&mut diagnostics);
    for d in &diagnostics {
        warn!(kind = d.kind.as_str(), location = %d.location, "{}", d.message);
    }
    if has_errors(&diagnostics) {
        return Err(ScaffoldError::rejected(diagnostics));
    }

    let entities_file = entities_path.display().to_string();
    let artifacts = plan_artifacts(&entities, config, &entities_file, &options.scope)?;
    info!(
        entities = entities.len(),
        artifacts = artifacts.len(),
        output = %config.output_dir.display(),
        "generation planned"
    );

    let mut report = write_artifacts(&config.output_dir, &artifacts, options);
    report.diagnostics = diagnostics;
    Ok(report)
}

/// Render every artifact selected by `scope`, in a fixed order.
pub fn plan_artifacts(
    entities: &[ResolvedEntity],
    config: &ScaffoldConfig,
    entities_file: &str,
    scope: &GenerationScope,
) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    if scope.scaffold {
        artifacts.extend(scaffold_artifacts(entities, config, entities_file)?);
    }
    for entity in entities {
        if scope.models {
            artifacts.push(Artifact::new(
                format!("app/entities/{}.py", entity.module_name),
                ArtifactKind::Model,
                emit_model(entity)?,
            ));
        }
        if scope.repositories {
            artifacts.push(Artifact::new(
                format!("app/repositories/{}_repository.py", entity.module_name),
                ArtifactKind::Repository,
                emit_repository(entity)?,
            ));
        }
        if scope.routers {
            artifacts.push(Artifact::new(
                format!("app/routers/{}.py", entity.module_name),
                ArtifactKind::Router,
                emit_router(entity)?,
            ));
        }
    }
    if scope.main {
        artifacts.push(Artifact::new("app/main.py", ArtifactKind::Main, emit_main(entities)?));
    }

    Ok(artifacts)
}

fn scaffold_artifacts(
    entities: &[ResolvedEntity],
    config: &ScaffoldConfig,
    entities_file: &str,
) -> Result<Vec<Artifact>> {
    use ArtifactKind::Support;

    let mut artifacts: Vec<Artifact> = PACKAGES
        .iter()
        .map(|pkg| Artifact::new(format!("{pkg}/__init__.py"), ArtifactKind::Package, String::new()))
        .collect();

    let settings = SettingsTemplateData {
        project_name: python_str_literal(&config.project_name),
        version: python_str_literal(&config.version),
        database_url: python_str_literal(&config.database_url),
        algorithm: python_str_literal(&config.algorithm),
        access_token_expire_minutes: config.access_token_expire_minutes,
        admin_email: python_str_literal(&config.admin_email),
    };
    let env = EnvTemplateData {
        project_name: config.project_name.clone(),
        version: config.version.clone(),
        database_url: config.database_url.clone(),
        secret_key: config.secret_key.clone(),
        algorithm: config.algorithm.clone(),
        access_token_expire_minutes: config.access_token_expire_minutes,
        admin_email: config.admin_email.clone(),
        admin_password: config.admin_password.clone(),
    };
    let seed = SeedUsersTemplateData {
        admin_roles: python_str_literal(&admin_roles(entities).join(",")),
    };

    let mut requirements = config.requirements.join("\n");
    requirements.push('\n');

    artifacts.extend([
        Artifact::new(
            "app/repositories/base_repository.py",
            Support,
            render_artifact(&BaseRepositoryTemplate, "base repository")?,
        ),
        Artifact::new(
            "app/utils/core/config.py",
            Support,
            render_artifact(&settings, "settings")?,
        ),
        Artifact::new(
            "app/utils/core/database.py",
            Support,
            render_artifact(&DatabaseTemplate, "database session")?,
        ),
        Artifact::new("app/utils/auth/auth.py", Support, render_artifact(&AuthTemplate, "auth helpers")?),
        Artifact::new("app/utils/auth/roles.py", Support, render_artifact(&RolesTemplate, "role checks")?),
        Artifact::new(
            "app/entities/auth/user.py",
            Support,
            render_artifact(&AuthUserTemplate, "user model")?,
        ),
        Artifact::new(
            "app/repositories/auth/user_repository.py",
            Support,
            render_artifact(&UserRepositoryTemplate, "user repository")?,
        ),
        Artifact::new(
            "app/routers/auth.py",
            Support,
            render_artifact(&AuthRouterTemplate, "auth router")?,
        ),
        Artifact::new(
            "app/utils/seeds/seed_users.py",
            Support,
            render_artifact(&seed, "user seed")?,
        ),
        Artifact::new(".env", Support, render_artifact(&env, ".env")?),
        Artifact::new(".gitignore", Support, render_artifact(&GitignoreTemplate, ".gitignore")?),
        Artifact::new("requirements.txt", Support, requirements),
        Artifact::new(
            "README.md",
            Support,
            emit_readme(&config.project_name, entities_file, entities)?,
        ),
        Artifact {
            executable: true,
            ..Artifact::new("run.sh", Support, render_artifact(&RunShTemplate, "run.sh")?)
        },
        Artifact::new("run.bat", Support, render_artifact(&RunBatTemplate, "run.bat")?),
    ]);

    Ok(artifacts)
}

/// Roles granted to the seeded administrator: the base roles plus every role
/// named in an access policy.
pub fn admin_roles(entities: &[ResolvedEntity]) -> Vec<String> {
    let mut roles: BTreeSet<&str> = BASE_ADMIN_ROLES.iter().copied().collect();
    for entity in entities {
        let access = &entity.access;
        for set in [&access.read_roles, &access.write_roles, &access.delete_roles] {
            if !set.is_any() {
                roles.extend(set.iter());
            }
        }
    }
    // "admin" first: it is the active role the seed assigns.
    let mut ordered = vec!["admin".to_string()];
    ordered.extend(roles.into_iter().filter(|r| *r != "admin").map(str::to_string));
    ordered
}

/// Write artifacts under `output_dir`.
///
/// Derived artifacts always replace what is on disk. Support files are
/// skipped when present unless `force`. A failed write is recorded and the
/// remaining artifacts are still written.
pub fn write_artifacts(
    output_dir: &Path,
    artifacts: &[Artifact],
    options: &GenerationOptions,
) -> GenerationReport {
    let mut report = GenerationReport {
        output_dir: output_dir.to_path_buf(),
        ..GenerationReport::default()
    };

    for artifact in artifacts {
        let target = output_dir.join(&artifact.path);

        if !artifact.kind.is_derived() && !options.force && target.exists() {
            println!(
                "ℹ️  {} already present (use --force to overwrite)",
                artifact.path.display()
            );
            report.skipped.push(artifact.path.clone());
            continue;
        }

        if options.dry_run {
            println!("📝 Would write {}", artifact.path.display());
            report.planned.push(artifact.path.clone());
            continue;
        }

        match write_one(&target, artifact) {
            Ok(()) => {
                println!("✅ Generated {}", artifact.path.display());
                report.written.push(artifact.path.clone());
            }
            Err(err) => {
                error!(path = %target.display(), error = %err, "failed to write artifact");
                report.failures.push(ArtifactFailure {
                    path: artifact.path.clone(),
                    error: err,
                });
            }
        }
    }

    report
}

fn write_one(target: &Path, artifact: &Artifact) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| ScaffoldError::io(parent, e))?;
    }
    fs::write(target, &artifact.contents).map_err(|e| ScaffoldError::io(target, e))?;
    if artifact.executable {
        make_executable(target)?;
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| ScaffoldError::io(path, e))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).map_err(|e| ScaffoldError::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
