use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context};

/// Overrides the interpreter used to create the virtual environment.
pub const PYTHON_BIN_ENV: &str = "SCAFFOLD_PYTHON_BIN";

/// Create `venv/` inside `project_dir` and install `requirements.txt` into it.
///
/// Returns the path of the virtual environment.
pub fn bootstrap_venv(project_dir: &Path) -> anyhow::Result<PathBuf> {
    // Allow tests to override the interpreter without mutating PATH
    let python = env::var(PYTHON_BIN_ENV).unwrap_or_else(|_| default_python().to_string());
    let venv_dir = project_dir.join("venv");

    println!("🧪 Creating virtual environment at {}", venv_dir.display());
    let status = Command::new(&python)
        .args(["-m", "venv", "venv"])
        .current_dir(project_dir)
        .status()
        .with_context(|| format!("failed to run {python}"))?;
    if !status.success() {
        bail!("`{python} -m venv venv` failed ({status})");
    }

    let pip = venv_pip(&venv_dir);
    println!("📦 Installing requirements with {}", pip.display());
    let status = Command::new(&pip)
        .args(["install", "-r", "requirements.txt"])
        .current_dir(project_dir)
        .status()
        .with_context(|| format!("failed to run {}", pip.display()))?;
    if !status.success() {
        bail!("`pip install -r requirements.txt` failed ({status})");
    }

    Ok(venv_dir)
}

/// Location of `pip` inside a virtual environment.
pub fn venv_pip(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts").join("pip.exe")
    } else {
        venv_dir.join("bin").join("pip")
    }
}

fn default_python() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::{Mutex, OnceLock};

    // Serialize environment mutations to avoid test races
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn write_stub(path: &Path, body: &str) {
        fs::write(path, body).unwrap();
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }

    fn with_python<T>(stub: &Path, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let old = env::var(PYTHON_BIN_ENV).ok();
        env::set_var(PYTHON_BIN_ENV, stub);
        let result = f();
        match old {
            Some(v) => env::set_var(PYTHON_BIN_ENV, v),
            None => env::remove_var(PYTHON_BIN_ENV),
        }
        result
    }

    #[test]
    fn test_bootstrap_runs_venv_then_pip() {
        let bin = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let stub = bin.path().join("python");
        // The fake interpreter lays out venv/bin/pip, which records its arguments.
        write_stub(
            &stub,
            "#!/bin/sh\n\
             mkdir -p venv/bin\n\
             printf '#!/bin/sh\\necho \"$@\" > pip-args\\n' > venv/bin/pip\n\
             chmod +x venv/bin/pip\n",
        );

        let venv = with_python(&stub, || bootstrap_venv(project.path())).unwrap();
        assert_eq!(venv, project.path().join("venv"));
        let args = fs::read_to_string(project.path().join("pip-args")).unwrap();
        assert_eq!(args.trim(), "install -r requirements.txt");
    }

    #[test]
    fn test_bootstrap_reports_interpreter_failure() {
        let bin = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let stub = bin.path().join("python");
        write_stub(&stub, "#!/bin/sh\nexit 3\n");

        let err = with_python(&stub, || bootstrap_venv(project.path())).unwrap_err();
        assert!(err.to_string().contains("-m venv"));
    }

    #[test]
    fn test_bootstrap_reports_pip_failure() {
        let bin = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let stub = bin.path().join("python");
        write_stub(
            &stub,
            "#!/bin/sh\nmkdir -p venv/bin\nprintf '#!/bin/sh\\nexit 1\\n' > venv/bin/pip\nchmod +x venv/bin/pip\n",
        );

        let err = with_python(&stub, || bootstrap_venv(project.path())).unwrap_err();
        assert!(err.to_string().contains("pip install"));
    }

    #[test]
    fn test_missing_interpreter_is_error() {
        let project = tempfile::tempdir().unwrap();
        let missing = project.path().join("no-such-python");
        assert!(with_python(&missing, || bootstrap_venv(project.path())).is_err());
    }

    #[test]
    fn test_venv_pip_location() {
        assert_eq!(venv_pip(Path::new("/p/venv")), PathBuf::from("/p/venv/bin/pip"));
    }
}
