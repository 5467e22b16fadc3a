//! Path Utilities
//!
//! Input discovery and output directory helpers for the batch entry point.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Find every `*.log` file directly inside `dir`, sorted by path.
pub fn find_log_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::config(format!(
            "Inputs directory not found: {}",
            dir.display()
        )));
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{}/*.log", escaped);
    let entries = glob::glob(&pattern)
        .map_err(|e| AppError::config(format!("Invalid log pattern {}: {}", pattern, e)))?;

    let mut logs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    logs.sort();
    Ok(logs)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensure the parent directory of `file` exists
pub fn ensure_parent_dir(file: &Path) -> AppResult<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
