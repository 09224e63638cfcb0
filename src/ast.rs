//! Project descriptor Abstract Syntax Tree structures.
//!
//! This module defines the data structures used to represent a parsed
//! `prjgraph.yml` descriptor. The YAML is first read into a JSON value by
//! [`crate::manifest`] and then deserialised into these types, so the schema
//! is enforced in a single place.
//!
//! The following example shows how to deserialise a minimal descriptor:
//!
//! ```rust
//! use prjgraph::ast::{Descriptor, StringOrList};
//!
//! let json = serde_json::json!({
//!     "prjgraph_version": "1.0.0",
//!     "targets": [{ "name": "hello", "cpp_source": "main.cpp" }],
//! });
//! let descriptor: Descriptor = serde_json::from_value(json).expect("parse");
//! assert_eq!(descriptor.targets[0].name, "hello");
//! assert_eq!(
//!     descriptor.targets[0].cpp_source,
//!     StringOrList::String("main.cpp".into())
//! );
//! ```

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::target::TargetKind;

/// Top-level descriptor parsed from a `prjgraph.yml` file.
///
/// ```yaml
/// prjgraph_version: "1.0.0"
/// targets:
///   - name: sample.so_5.mboxes
///     required_prj: [ace/dll.rb, so_5/prj.rb]
///     cpp_source: main.cpp
/// defaults: [sample.so_5.mboxes]
/// ```
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Descriptor {
    /// Semantic version of the descriptor format.
    pub prjgraph_version: Version,

    /// Target declarations in the order they were written.
    #[serde(default)]
    pub targets: Vec<RawTarget>,

    /// Targets planned when no root is supplied on the command line.
    #[serde(default)]
    pub defaults: Vec<String>,
}

/// A single target exactly as written in the descriptor.
///
/// Nothing here is validated yet; see
/// [`TargetDeclaration`](crate::target::TargetDeclaration) for the checked
/// form.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawTarget {
    /// Logical target name.
    pub name: String,

    /// What the target produces. Defaults to an executable.
    #[serde(default)]
    pub kind: TargetKind,

    /// Descriptor path other targets may use to require this one.
    #[serde(default)]
    pub prj: Option<String>,

    /// Sub-projects that must be built first, by descriptor path or name.
    #[serde(default)]
    pub required_prj: StringOrList,

    /// Source files compiled into the target.
    #[serde(default, alias = "sources")]
    pub cpp_source: StringOrList,
}

/// A helper for fields that accept either a single string or a list of
/// strings.
///
/// It mirrors YAML syntax where a scalar or sequence is allowed. Empty values
/// deserialise to `StringOrList::Empty`.
///
/// ```yaml
/// # Scalar
/// cpp_source: main.cpp
/// # Sequence
/// cpp_source:
///   - main.cpp
///   - util.cpp
/// ```
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrList {
    /// No value provided.
    #[default]
    Empty,
    /// A single string item.
    String(String),
    /// A list of string items.
    List(Vec<String>),
}

impl StringOrList {
    /// Borrow every item in written order.
    ///
    /// ```rust
    /// use prjgraph::ast::StringOrList;
    ///
    /// let list = StringOrList::List(vec!["a".into(), "b".into()]);
    /// assert_eq!(list.items(), vec!["a", "b"]);
    /// assert!(StringOrList::Empty.items().is_empty());
    /// ```
    #[must_use]
    pub fn items(&self) -> Vec<&str> {
        match self {
            Self::Empty => Vec::new(),
            Self::String(s) => vec![s.as_str()],
            Self::List(v) => v.iter().map(String::as_str).collect(),
        }
    }
}
