use anyhow::{Context, Result, anyhow};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn default_log_path() -> PathBuf {
    // Use XDG data directory or fallback
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobfinder") {
        proj_dirs.data_dir().join("jobfinder.log")
    } else {
        PathBuf::from("jobfinder.log")
    }
}

/// Logs to a file; the terminal belongs to the UI while browsing.
pub fn init_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}

pub fn init_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}
