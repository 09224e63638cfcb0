//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly.

// The unused_assignments lint fires in some Rust versions on miette/thiserror
// derive expansions, so `#[expect]` cannot be used here.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised during command execution.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The descriptor file does not exist at the expected path.
    #[error("descriptor not found at {path}")]
    #[diagnostic(
        code(prjgraph::runner::manifest_not_found),
        help("Create a prjgraph.yml, or pass its location with -f/--file or -C/--directory.")
    )]
    ManifestNotFound {
        /// The path that was attempted.
        path: Utf8PathBuf,
    },

    /// A path given on the command line is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    #[diagnostic(code(prjgraph::runner::non_utf8_path))]
    NonUtf8Path {
        /// Lossy rendering of the rejected path.
        path: String,
    },

    /// `plan` was run without roots on a descriptor without defaults.
    #[error("no roots given and {descriptor} declares no defaults")]
    #[diagnostic(
        code(prjgraph::runner::no_roots),
        help("Name a target, e.g. `prjgraph plan app`, or add a `defaults` list.")
    )]
    NoRoots {
        /// Descriptor that was loaded.
        descriptor: Utf8PathBuf,
    },
}
