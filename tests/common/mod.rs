//! Shared helpers for integration tests.
//!
//! Integration tests under `tests/` compile as independent crates. This module
//! is included via `mod common;` in individual test files to share fixtures and
//! helpers while keeping test modules small and avoiding duplication.

use anyhow::{Context, Result};
use prjgraph::{manifest, resolver::Resolver};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path of a descriptor fixture under `tests/data`.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Create a temporary project whose `prjgraph.yml` is a copy of `fixture`.
pub fn project_with(fixture: &str) -> Result<(TempDir, PathBuf)> {
    let temp = tempfile::tempdir().context("create temp dir for test descriptor")?;
    let descriptor = temp.path().join(manifest::DEFAULT_DESCRIPTOR);
    std::fs::copy(fixture_path(fixture), &descriptor)
        .with_context(|| format!("copy {fixture} to {}", descriptor.display()))?;
    Ok((temp, descriptor))
}

/// Parse a fixture and register its targets.
pub fn load_fixture(fixture: &str) -> Result<Resolver> {
    let path = fixture_path(fixture);
    let descriptor = manifest::from_path(&path)?;
    manifest::load_resolver(
        &descriptor,
        &manifest::ManifestName::new(path.display().to_string()),
    )
}
