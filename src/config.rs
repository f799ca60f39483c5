//! # Scaffold Configuration
//!
//! Settings for a generation run, read from `scaffold.toml`:
//!
//! ```toml
//! project_name = "Shop API"
//! entities_file = "entities.txt"
//! output_dir = "shop"
//! database_url = "postgresql://shop@localhost/shop"
//! admin_email = "ops@shop.test"
//! ```
//!
//! Every key is optional. Values are layered, later wins:
//!
//! 1. built-in defaults
//! 2. `scaffold.toml` (explicit `--config`, or the file beside the entities file)
//! 3. `SCAFFOLD_*` environment variables
//! 4. command-line flags

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScaffoldError};

/// Name of the configuration file looked up beside the entities file.
pub const CONFIG_FILE_NAME: &str = "scaffold.toml";

/// Environment variables that override file values.
pub const ENV_ENTITIES_FILE: &str = "SCAFFOLD_ENTITIES_FILE";
pub const ENV_OUTPUT_DIR: &str = "SCAFFOLD_OUTPUT_DIR";
pub const ENV_PROJECT_NAME: &str = "SCAFFOLD_PROJECT_NAME";
pub const ENV_DATABASE_URL: &str = "SCAFFOLD_DATABASE_URL";

/// Python packages written to `requirements.txt` unless configured.
pub const DEFAULT_REQUIREMENTS: &[&str] = &[
    "fastapi",
    "uvicorn[standard]",
    "sqlmodel",
    "pydantic-settings",
    "python-jose[cryptography]",
    "passlib[argon2]",
    "python-multipart",
    "python-dotenv",
    "httpx",
    "pytest",
];

/// Settings of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaffoldConfig {
    /// Application title, also used for `PROJECT_NAME`
    pub project_name: String,
    /// Application version
    pub version: String,
    /// Entity definition file
    pub entities_file: PathBuf,
    /// Root of the generated project
    pub output_dir: PathBuf,
    /// SQLAlchemy URL written to `.env` and the settings defaults
    pub database_url: String,
    /// Token signing key written to `.env`
    pub secret_key: String,
    /// Token signing algorithm
    pub algorithm: String,
    /// Access token lifetime
    pub access_token_expire_minutes: u32,
    /// Administrator account created on first start
    pub admin_email: String,
    pub admin_password: String,
    /// Lines of `requirements.txt`
    pub requirements: Vec<String>,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        ScaffoldConfig {
            project_name: "FastAPI Project".to_string(),
            version: "0.1.0".to_string(),
            entities_file: PathBuf::from("entities.txt"),
            output_dir: PathBuf::from("."),
            database_url: "sqlite:///./app.db".to_string(),
            secret_key: "change-me".to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            admin_email: "admin@example.com".to_string(),
            admin_password: "admin".to_string(),
            requirements: DEFAULT_REQUIREMENTS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl ScaffoldConfig {
    /// Load a configuration file.
    ///
    /// Returns `Ok(None)` when the file does not exist, an error when it
    /// exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|e| ScaffoldError::io(path, e))?;
        let config = toml::from_str(&contents).map_err(|source| ScaffoldError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_ENTITIES_FILE) {
            self.entities_file = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_PROJECT_NAME) {
            self.project_name = v;
        }
        if let Some(v) = get(ENV_DATABASE_URL) {
            self.database_url = v;
        }
    }

    /// Apply `SCAFFOLD_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }
}

/// Look for `scaffold.toml` in the directory of the entities file.
pub fn auto_detect_config_path(entities_path: &Path) -> Option<PathBuf> {
    let dir = match entities_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.exists().then_some(candidate)
}

/// Resolve the configuration file to load.
///
/// Priority:
/// 1. Explicitly provided path (via CLI), even if missing so the caller can report it
/// 2. `scaffold.toml` beside the entities file
/// 3. None (defaults only)
pub fn resolve_config_path(explicit_path: Option<&Path>, entities_path: &Path) -> Option<PathBuf> {
    match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => auto_detect_config_path(entities_path),
    }
}

/// Defaults, then the resolved file, then the environment.
///
/// An explicit path that does not exist is an error; a missing auto-detected
/// file is not.
pub fn load_config(explicit_path: Option<&Path>, entities_path: &Path) -> Result<ScaffoldConfig> {
    let mut config = match resolve_config_path(explicit_path, entities_path) {
        Some(path) => match ScaffoldConfig::load(&path)? {
            Some(config) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                config
            }
            None if explicit_path.is_some() => {
                return Err(ScaffoldError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "configuration file not found"),
                ));
            }
            None => ScaffoldConfig::default(),
        },
        None => ScaffoldConfig::default(),
    };
    config.apply_env();
    Ok(config)
}
