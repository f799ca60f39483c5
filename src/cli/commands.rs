use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, ScaffoldConfig, ENV_ENTITIES_FILE};
use crate::dsl::load_definitions;
use crate::error::ScaffoldError;
use crate::generator::{
    bootstrap_venv, generate_project, resolve_catalog, GenerationOptions, GenerationReport,
    GenerationScope, ResolvedEntity,
};
use crate::linter::{
    has_errors, has_warnings, lint_catalog, lint_file, print_diagnostics, sort_diagnostics,
    Diagnostic, Severity,
};
use crate::logging::{init_logging, LogConfig};

/// Definition file used when neither a flag nor the environment names one.
pub const DEFAULT_ENTITIES_FILE: &str = "entities.txt";

/// Command-line interface for entity-scaffold
///
/// Without a subcommand, runs `generate` with its defaults.
#[derive(Parser, Debug)]
#[command(name = "entity-scaffold", version)]
#[command(about = "Generate a FastAPI + SQLModel backend from an entity definition file", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the project tree from an entity definition file
    Generate(GenerateArgs),
    /// Check an entity definition file
    ///
    /// Reports unknown types, unparsable modifiers, header problems,
    /// invalid or reserved names, relations without `.fk` and constraints
    /// that do not apply to their field type.
    Lint {
        /// Entity definition file
        #[arg(short, long)]
        entities: Option<PathBuf>,

        /// Exit with an error code if any warning is found
        #[arg(long, default_value_t = false)]
        fail_on_warning: bool,

        /// Show only errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
    /// Print the resolved entities and diagnostics as JSON
    Inspect {
        /// Entity definition file
        #[arg(short, long)]
        entities: Option<PathBuf>,
    },
}

/// Arguments of `generate`
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Entity definition file (default: entities.txt)
    #[arg(short, long)]
    pub entities: Option<PathBuf>,

    /// Output directory for the generated project
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file; defaults to scaffold.toml beside the entities file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Application title written to the settings
    #[arg(long)]
    pub project_name: Option<String>,

    /// Overwrite existing support files
    #[arg(short, long, default_value_t = false)]
    pub force: bool,

    /// Perform a dry run: show what would be written without touching files
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Limit regeneration to specific parts (comma-separated or repeated)
    #[arg(long, value_enum, num_args = 1.., value_delimiter = ',')]
    pub only: Option<Vec<OnlyPart>>,

    /// Create a virtual environment and install requirements afterwards
    #[arg(long, default_value_t = false)]
    pub venv: bool,
}

/// Parts selectable with `--only`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnlyPart {
    /// Settings, database, auth, seeds, packages and launch scripts
    Scaffold,
    /// Table models
    Models,
    /// Repository classes
    Repositories,
    /// FastAPI routers
    Routers,
    /// app/main.py router registry
    Main,
}

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Parse arguments, set up logging and run.
pub fn run_cli() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    if let Err(err) = init_logging(&log_config) {
        eprintln!("⚠️  Logging disabled: {err}");
    }

    match run(cli) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Generate(GenerateArgs::default()));

    match command {
        Commands::Generate(args) => run_generate(&args),
        Commands::Lint {
            entities,
            fail_on_warning,
            errors_only,
        } => {
            let path = entities_path(entities.as_deref());
            let mut diagnostics = lint_file(&path)
                .with_context(|| format!("failed to lint {}", path.display()))?;
            let failed = has_errors(&diagnostics) || (fail_on_warning && has_warnings(&diagnostics));
            if errors_only {
                diagnostics.retain(|d| d.severity == Severity::Error);
            }
            print_diagnostics(&diagnostics);
            Ok(if failed { Outcome::Failure } else { Outcome::Success })
        }
        Commands::Inspect { entities } => {
            let path = entities_path(entities.as_deref());
            let report = inspect(&path)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(Outcome::Success)
        }
    }
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<Outcome> {
    let config = resolve_generate_config(args)?;
    let options = GenerationOptions {
        force: args.force,
        dry_run: args.dry_run,
        scope: map_only_to_scope(args.only.as_deref()),
    };

    let report = match generate_project(&config.entities_file, &config, &options) {
        Ok(report) => report,
        Err(ScaffoldError::DefinitionErrors { diagnostics, .. }) => {
            print_diagnostics(&diagnostics);
            eprintln!(
                "❌ {} has errors; nothing was generated",
                config.entities_file.display()
            );
            return Ok(Outcome::Failure);
        }
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("failed to generate from {}", config.entities_file.display())))
        }
    };
    print_report(&report, args.dry_run);

    if !report.is_success() {
        return Ok(Outcome::Failure);
    }
    if args.venv && !args.dry_run {
        bootstrap_venv(&config.output_dir).context("virtual environment bootstrap failed")?;
        println!("🧪 Virtual environment ready");
    }
    Ok(Outcome::Success)
}

fn print_report(report: &GenerationReport, dry_run: bool) {
    if !report.diagnostics.is_empty() {
        print_diagnostics(&report.diagnostics);
    }
    for failure in &report.failures {
        eprintln!("❌ {}: {}", failure.path.display(), failure.error);
    }
    if dry_run {
        println!(
            "📝 Dry run: {} file(s) would be written, {} skipped",
            report.planned.len(),
            report.skipped.len()
        );
    } else {
        println!(
            "🎉 {} written, {} skipped, {} failed → {}",
            report.written.len(),
            report.skipped.len(),
            report.failures.len(),
            report.output_dir.display()
        );
    }
}

/// Layer configuration for `generate`: defaults, `scaffold.toml`, `SCAFFOLD_*`
/// variables, then flags.
pub fn resolve_generate_config(args: &GenerateArgs) -> anyhow::Result<ScaffoldConfig> {
    let candidate = entities_path(args.entities.as_deref());
    let mut config =
        load_config(args.config.as_deref(), &candidate).context("failed to load configuration")?;
    if let Some(entities) = &args.entities {
        config.entities_file = entities.clone();
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(name) = &args.project_name {
        config.project_name = name.clone();
    }
    Ok(config)
}

/// Definition file from the flag, then `SCAFFOLD_ENTITIES_FILE`, then the default.
fn entities_path(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| {
            env::var(ENV_ENTITIES_FILE)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENTITIES_FILE))
}

/// Map `--only` to a generation scope; no flag selects everything.
pub fn map_only_to_scope(only: Option<&[OnlyPart]>) -> GenerationScope {
    let Some(parts) = only else {
        return GenerationScope::all();
    };
    let mut scope = GenerationScope::none();
    for part in parts {
        match part {
            OnlyPart::Scaffold => scope.scaffold = true,
            OnlyPart::Models => scope.models = true,
            OnlyPart::Repositories => scope.repositories = true,
            OnlyPart::Routers => scope.routers = true,
            OnlyPart::Main => scope.main = true,
        }
    }
    scope
}

/// JSON document printed by `inspect`
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub entities: Vec<ResolvedEntity>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse and resolve a definition file without generating anything.
pub fn inspect(path: &Path) -> anyhow::Result<InspectReport> {
    let (catalog, mut diagnostics) =
        load_definitions(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (entities, resolve_diagnostics) = resolve_catalog(&catalog);
    diagnostics.extend(resolve_diagnostics);
    diagnostics.extend(lint_catalog(&catalog));
    sort_diagnostics(&mut diagnostics);
    Ok(InspectReport {
        entities,
        diagnostics,
    })
}
