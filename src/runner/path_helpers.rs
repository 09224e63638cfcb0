//! Path resolution helpers for the runner module.
//!
//! Centralises descriptor path logic so the main runner module stays focused
//! on command dispatch.

use crate::cli::Cli;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;

use super::RunnerError;

fn utf8(path: &Path) -> Result<Utf8PathBuf, RunnerError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|path| RunnerError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

/// Determine the descriptor path respecting the CLI's directory option.
///
/// # Errors
/// Returns [`RunnerError::NonUtf8Path`] when the CLI `file` or `directory`
/// paths are not valid UTF-8.
pub(super) fn resolve_manifest_path(cli: &Cli) -> Result<Utf8PathBuf, RunnerError> {
    let file = utf8(&cli.file)?;
    match &cli.directory {
        Some(dir) if file.is_relative() => Ok(utf8(dir)?.join(file)),
        _ => Ok(file),
    }
}

pub(super) fn ensure_manifest_exists(path: &Utf8Path) -> Result<(), RunnerError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RunnerError::ManifestNotFound {
            path: path.to_path_buf(),
        })
    }
}
