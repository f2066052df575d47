use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use walkdir::WalkDir;

use crate::logging;
use crate::model::Mode;

pub const LEGACY_X86_64_EXECUTABLE: &str = "/opt/1C/v8.3/x86_64/1cv8";
pub const FALLBACK_EXECUTABLE: &str = "/opt/1C/v8.3/i386/1cv8";
const EXECUTABLE_NAME: &str = "1cv8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    EmptyName,
    MissingExecutable(PathBuf),
    SpawnFailed { program: PathBuf, message: String },
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "empty entry name"),
            Self::MissingExecutable(path) => {
                write!(f, "executable does not exist: {}", path.display())
            }
            Self::SpawnFailed { program, message } => {
                write!(f, "failed to start {}: {message}", program.display())
            }
        }
    }
}

impl std::error::Error for LaunchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.to_string_lossy().into_owned());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Mode token first, then the templated arguments with `placeholder` suffixed by the
/// entry name.
pub fn build_launch_command(
    executable: &Path,
    mode: Mode,
    launch_args: &[String],
    placeholder: &str,
    entry_name: &str,
) -> Result<LaunchCommand, LaunchError> {
    let name = entry_name.trim();
    if name.is_empty() {
        return Err(LaunchError::EmptyName);
    }

    let mut args = Vec::with_capacity(launch_args.len() + 1);
    args.push(mode.as_token().to_string());
    for arg in launch_args {
        if arg == placeholder {
            args.push(format!("{arg}{name}"));
        } else {
            args.push(arg.clone());
        }
    }

    Ok(LaunchCommand {
        program: executable.to_path_buf(),
        args,
    })
}

/// Picks the platform binary: explicit override, legacy x86_64 layout, newest
/// versioned install under `install_roots`, then the fixed i386 path.
pub fn resolve_executable(configured: Option<&Path>, install_roots: &[PathBuf]) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }

    let legacy = Path::new(LEGACY_X86_64_EXECUTABLE);
    if legacy.is_file() {
        return legacy.to_path_buf();
    }

    newest_install(install_roots).unwrap_or_else(|| PathBuf::from(FALLBACK_EXECUTABLE))
}

pub fn newest_install(install_roots: &[PathBuf]) -> Option<PathBuf> {
    install_roots
        .iter()
        .flat_map(|root| discover_installs(root))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, path)| path)
}

/// Finds `<root>/<arch>/<version>/1cv8` binaries, keyed by numeric version.
pub fn discover_installs(root: &Path) -> Vec<(Vec<u32>, PathBuf)> {
    if !root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(root)
        .max_depth(3)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == EXECUTABLE_NAME)
        .filter_map(|entry| {
            let version = entry
                .path()
                .parent()
                .and_then(|dir| dir.file_name())
                .and_then(|name| name.to_str())
                .and_then(parse_version)?;
            Some((version, entry.into_path()))
        })
        .collect()
}

fn parse_version(raw: &str) -> Option<Vec<u32>> {
    raw.split('.')
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()
        .filter(|parts| !parts.is_empty())
}

pub trait ProcessSpawner {
    fn spawn(&self, command: &LaunchCommand) -> Result<(), LaunchError>;
}

/// Starts the command detached from our stdio. A background thread waits on the
/// child so a long-running provider does not accumulate zombies.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, command: &LaunchCommand) -> Result<(), LaunchError> {
        if !command.program.exists() {
            return Err(LaunchError::MissingExecutable(command.program.clone()));
        }

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| LaunchError::SpawnFailed {
                program: command.program.clone(),
                message: error.to_string(),
            })?;

        let program = command.program.clone();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => logging::warn(
                "launched process exited",
                &[
                    ("program", program.display().to_string()),
                    ("status", status.to_string()),
                ],
            ),
            Ok(_) => {}
            Err(error) => logging::warn(
                "launched process wait failed",
                &[
                    ("program", program.display().to_string()),
                    ("error", error.to_string()),
                ],
            ),
        });

        Ok(())
    }
}
