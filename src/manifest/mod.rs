//! Descriptor loading helpers.
//!
//! A `prjgraph.yml` descriptor is parsed in two stages. `serde_saphyr` first
//! reads the YAML into a [`ManifestValue`], so syntax errors can be reported
//! with a source span, and the value is then deserialised into the typed
//! [`Descriptor`]. Diagnostics wrap descriptor identifiers in
//! [`ManifestName`] and YAML source strings in [`ManifestSource`].
//!
//! [`declarations`] validates every target entry, turning the descriptor
//! into the [`TargetDeclaration`]s the resolver consumes.

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::{
    ast::Descriptor,
    resolver::Resolver,
    target::TargetDeclaration,
};

mod diagnostics;
mod hints;

/// JSON representation of a descriptor after YAML parsing.
pub type ManifestValue = serde_json::Value;

/// Major descriptor format version understood by this build.
pub const SUPPORTED_MAJOR_VERSION: u64 = 1;

/// File name looked up when no descriptor path is given.
pub const DEFAULT_DESCRIPTOR: &str = "prjgraph.yml";

pub use diagnostics::{
    ManifestError, ManifestName, ManifestSource, map_data_error, map_yaml_error,
};

fn from_str_named(yaml: &str, name: &ManifestName) -> Result<Descriptor> {
    let doc: ManifestValue = serde_saphyr::from_str(yaml).map_err(|e| ManifestError::Parse {
        name: name.clone(),
        source: map_yaml_error(e, &ManifestSource::from(yaml), name),
    })?;

    let descriptor: Descriptor =
        serde_json::from_value(doc).map_err(|e| ManifestError::Parse {
            name: name.clone(),
            source: map_data_error(e, name),
        })?;

    if descriptor.prjgraph_version.major != SUPPORTED_MAJOR_VERSION {
        return Err(ManifestError::UnsupportedVersion {
            name: name.clone(),
            version: descriptor.prjgraph_version,
            supported: SUPPORTED_MAJOR_VERSION,
        }
        .into());
    }
    tracing::debug!(
        descriptor = %name,
        targets = descriptor.targets.len(),
        "parsed descriptor"
    );
    Ok(descriptor)
}

/// Parse a descriptor from a YAML string.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, does not match the descriptor
/// schema, or declares an unsupported format version.
///
/// # Examples
///
/// ```rust
/// let yaml = "prjgraph_version: 1.0.0\ntargets:\n  - name: app\n    cpp_source: main.cpp\n";
/// let descriptor = prjgraph::manifest::from_str(yaml).expect("parse");
/// assert_eq!(descriptor.targets.len(), 1);
/// ```
pub fn from_str(yaml: &str) -> Result<Descriptor> {
    from_str_named(yaml, &ManifestName::new(DEFAULT_DESCRIPTOR))
}

/// Load a [`Descriptor`] from the given file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: impl AsRef<Path>) -> Result<Descriptor> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref)
        .with_context(|| format!("failed to read {}", path_ref.display()))?;
    from_str_named(&data, &ManifestName::new(path_ref.display().to_string()))
}

/// Validate every target entry of `descriptor`, keeping their order.
///
/// # Errors
///
/// Returns [`ManifestError::Declaration`] for the first invalid entry.
pub fn declarations(
    descriptor: &Descriptor,
    name: &ManifestName,
) -> Result<Vec<TargetDeclaration>, ManifestError> {
    descriptor
        .targets
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            TargetDeclaration::try_from(raw).map_err(|source| ManifestError::Declaration {
                name: name.clone(),
                index: idx + 1,
                source,
            })
        })
        .collect()
}

/// Validate and register every target of `descriptor`.
///
/// # Errors
///
/// Returns an error when an entry fails validation or registration.
pub fn load_resolver(descriptor: &Descriptor, name: &ManifestName) -> Result<Resolver> {
    let declarations = declarations(descriptor, name)?;
    let resolver = Resolver::from_declarations(declarations)
        .with_context(|| format!("registering targets from {name}"))?;
    Ok(resolver)
}
