//! Isolated environment resolution and bootstrap.
//!
//! This is the only place in the workspace that performs disk and process
//! I/O: directory creation, the dependency manifest, and virtual-environment
//! provisioning all happen here, once, under the bridge's initialization.

use crate::error::{BridgeError, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Override for the isolated environment root, consulted once at bridge
/// initialization.
pub const ENV_ROOT_VAR: &str = "HFBRIDGE_HOME";

const MANIFEST_NAME: &str = "requirements.txt";
const INSTALL_MARKER: &str = ".deps-installed";

const MANIFEST: &str = "\
transformers>=4.40
torch>=2.2
sentence-transformers>=2.7
pillow>=10.0
huggingface-hub>=0.23
";

/// Paths of the isolated execution environment.
#[derive(Debug, Clone)]
pub struct RuntimeEnv {
    root: PathBuf,
    venv_dir: PathBuf,
    manifest_path: PathBuf,
}

impl RuntimeEnv {
    /// Resolve the environment from the override variable or the per-user
    /// application-data directory.
    pub fn resolve() -> Self {
        Self::from_root(root_from(std::env::var_os(ENV_ROOT_VAR)))
    }

    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let venv_dir = root.join("venv");
        let manifest_path = root.join(MANIFEST_NAME);
        Self {
            root,
            venv_dir,
            manifest_path,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn venv_dir(&self) -> &Path {
        &self.venv_dir
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Materialize the environment: root directory, dependency manifest,
    /// virtual environment, and installed dependencies. Idempotent; each
    /// step is skipped when its artifact already exists.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        if !self.manifest_path.exists() {
            tracing::info!(path = %self.manifest_path.display(), "writing dependency manifest");
            fs::write(&self.manifest_path, MANIFEST)?;
        }

        let venv_python = self.venv_python();
        if !venv_python.exists() {
            tracing::info!(path = %self.venv_dir.display(), "creating virtual environment");
            run_step(
                Command::new(host_python())
                    .arg("-m")
                    .arg("venv")
                    .arg(&self.venv_dir),
                "virtual environment creation",
            )?;
        }

        let marker = self.venv_dir.join(INSTALL_MARKER);
        if !marker.exists() {
            tracing::info!("installing runtime dependencies (first run; this downloads packages)");
            run_step(
                Command::new(&venv_python)
                    .arg("-m")
                    .arg("pip")
                    .arg("install")
                    .arg("--quiet")
                    .arg("-r")
                    .arg(&self.manifest_path),
                "dependency installation",
            )?;
            fs::write(&marker, "")?;
        }

        Ok(())
    }

    /// Interpreter inside the virtual environment.
    pub fn venv_python(&self) -> PathBuf {
        if cfg!(windows) {
            self.venv_dir.join("Scripts").join("python.exe")
        } else {
            self.venv_dir.join("bin").join("python")
        }
    }

    /// Locate the virtual environment's site-packages directory.
    pub fn site_packages(&self) -> Result<PathBuf> {
        if cfg!(windows) {
            let candidate = self.venv_dir.join("Lib").join("site-packages");
            if candidate.is_dir() {
                return Ok(candidate);
            }
        } else {
            let lib = self.venv_dir.join("lib");
            if let Ok(entries) = fs::read_dir(&lib) {
                for entry in entries.flatten() {
                    let name = entry.file_name();
                    if name.to_string_lossy().starts_with("python") {
                        let candidate = entry.path().join("site-packages");
                        if candidate.is_dir() {
                            return Ok(candidate);
                        }
                    }
                }
            }
        }
        Err(BridgeError::initialization(format!(
            "no site-packages directory under {}",
            self.venv_dir.display()
        )))
    }
}

fn host_python() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

fn run_step(command: &mut Command, what: &str) -> Result<()> {
    let output = command
        .output()
        .map_err(|e| BridgeError::initialization(format!("{what} failed to start: {e}")))?;
    if !output.status.success() {
        return Err(BridgeError::initialization(format!(
            "{what} failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

fn root_from(overridden: Option<OsString>) -> PathBuf {
    if let Some(value) = overridden {
        let trimmed = value.to_string_lossy().trim().to_string();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hfbridge")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_variable_wins_when_set() {
        let root = root_from(Some(OsString::from(" /opt/hfbridge ")));
        assert_eq!(root, PathBuf::from("/opt/hfbridge"));
    }

    #[test]
    fn empty_override_falls_back_to_user_data_dir() {
        let root = root_from(Some(OsString::from("   ")));
        assert!(root.ends_with("hfbridge"));
        let root = root_from(None);
        assert!(root.ends_with("hfbridge"));
    }

    #[test]
    fn environment_paths_hang_off_the_root() {
        let env = RuntimeEnv::from_root("/tmp/hfb");
        assert_eq!(env.venv_dir(), Path::new("/tmp/hfb/venv"));
        assert_eq!(env.manifest_path(), Path::new("/tmp/hfb/requirements.txt"));
    }

    #[test]
    fn site_packages_is_discovered_inside_the_venv() {
        let dir = tempfile::tempdir().unwrap();
        let env = RuntimeEnv::from_root(dir.path());
        assert!(env.site_packages().is_err());

        let sp = if cfg!(windows) {
            env.venv_dir().join("Lib").join("site-packages")
        } else {
            env.venv_dir()
                .join("lib")
                .join("python3.12")
                .join("site-packages")
        };
        fs::create_dir_all(&sp).unwrap();
        assert_eq!(env.site_packages().unwrap(), sp);
    }
}
