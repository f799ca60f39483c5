mod generate;
mod venv;

pub use generate::{
    admin_roles, generate_project, plan_artifacts, write_artifacts, Artifact, ArtifactFailure,
    ArtifactKind, GenerationOptions, GenerationReport, GenerationScope,
};
pub use venv::{bootstrap_venv, venv_pip, PYTHON_BIN_ENV};
