//! Translates descriptor parsing errors into actionable diagnostics.
//!
//! This module wraps raw parser outputs in domain-friendly types:
//! [`ManifestSource`] retains the YAML content, [`ManifestName`] labels the
//! origin, and mapping helpers ([`map_yaml_error`], [`map_data_error`])
//! convert parser and deserialisation failures into [`miette`] diagnostics
//! with spans, hints, and stable diagnostic codes.

use miette::Diagnostic;
use semver::Version;
use thiserror::Error;

use crate::target::DeclarationError;

mod yaml;

pub use yaml::map_yaml_error;

/// YAML source content for a descriptor.
///
/// # Examples
/// ```rust
/// use prjgraph::manifest::ManifestSource;
/// let source = ManifestSource::from("foo: 1");
/// assert_eq!(source.as_str(), "foo: 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestSource(String);

impl ManifestSource {
    /// Construct a new source buffer from any owned string type.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self(src.into())
    }

    /// View the stored source contents as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ManifestSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ManifestSource {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Display name for a descriptor used in diagnostics.
///
/// # Examples
/// ```rust
/// use prjgraph::manifest::ManifestName;
/// let name = ManifestName::new("prjgraph.yml");
/// assert_eq!(name.as_str(), "prjgraph.yml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestName(String);

impl ManifestName {
    /// Construct a label describing the descriptor being processed.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Access the label as a borrowed string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ManifestName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ManifestName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ManifestName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Error raised when a descriptor cannot be turned into declarations.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// Parsing failed and produced the supplied diagnostic.
    #[error("failed to parse {name}")]
    #[diagnostic(code(prjgraph::manifest::parse))]
    Parse {
        /// Descriptor label.
        name: ManifestName,
        /// Underlying diagnostic reported by the parser.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },

    /// The descriptor declares a format version this build cannot read.
    #[error("{name} declares prjgraph_version {version}, expected {supported}.x")]
    #[diagnostic(
        code(prjgraph::manifest::version),
        help("update prjgraph or migrate the descriptor")
    )]
    UnsupportedVersion {
        /// Descriptor label.
        name: ManifestName,
        /// Declared version.
        version: Version,
        /// Supported major version.
        supported: u64,
    },

    /// A target entry failed validation.
    #[error("invalid target #{index} in {name}")]
    #[diagnostic(code(prjgraph::manifest::target))]
    Declaration {
        /// Descriptor label.
        name: ManifestName,
        /// One-based position of the entry in the `targets` list.
        index: usize,
        /// Validation failure.
        #[source]
        #[diagnostic_source]
        source: DeclarationError,
    },
}

#[derive(Debug, Error, Diagnostic)]
#[error("{name} does not match the descriptor schema: {source}")]
#[diagnostic(code(prjgraph::manifest::structure))]
struct DataDiagnostic {
    #[source]
    source: serde_json::Error,
    name: ManifestName,
}

/// Map a [`serde_json`] structural error into a diagnostic without a source
/// span. `serde_json` does not report byte offsets for data validation
/// failures, so the resulting diagnostic only carries the descriptor name and
/// error message.
#[must_use]
pub fn map_data_error(
    err: serde_json::Error,
    name: &ManifestName,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    Box::new(DataDiagnostic {
        source: err,
        name: name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result, ensure};
    use serde_json::Value;

    #[test]
    fn map_data_error_formats_message_and_code() -> Result<()> {
        let name = ManifestName::new("test.json");
        let err = serde_json::from_str::<Value>("{\"key\":}")
            .expect_err("expected serde_json parse error");
        let details = err.to_string();
        let diag = map_data_error(err, &name);
        let message = diag.to_string();
        ensure!(
            message == format!("test.json does not match the descriptor schema: {details}"),
            "unexpected message: {message}"
        );
        let code = diag
            .code()
            .map(|c| c.to_string())
            .context("structure diagnostic should expose a code")?;
        ensure!(
            code == "prjgraph::manifest::structure",
            "unexpected diagnostic code {code}"
        );
        Ok(())
    }

    #[test]
    fn declaration_error_is_exposed_as_diagnostic_source() -> Result<()> {
        let wrapped = ManifestError::Declaration {
            name: ManifestName::new("prjgraph.yml"),
            index: 2,
            source: DeclarationError::EmptyName,
        };
        ensure!(
            wrapped.to_string() == "invalid target #2 in prjgraph.yml",
            "unexpected outer message: {wrapped}"
        );
        let inner_code = wrapped
            .diagnostic_source()
            .and_then(|inner| inner.code())
            .map(|c| c.to_string())
            .context("declaration diagnostic should expose a source code")?;
        ensure!(
            inner_code == "prjgraph::declaration::empty_name",
            "unexpected inner code {inner_code}"
        );
        Ok(())
    }
}
