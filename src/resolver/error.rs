//! Error types raised while registering and resolving targets.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Structural configuration defects found by the [`Resolver`](super::Resolver).
///
/// Every variant is terminal for the current invocation. None of them are
/// retried because they describe the declarations, not a transient state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ResolveError {
    /// Two declarations share a name.
    #[error("target '{name}' is declared more than once")]
    #[diagnostic(
        code(prjgraph::resolve::duplicate_target),
        help("rename one of the declarations or remove the duplicate")
    )]
    DuplicateTarget {
        /// Name declared twice.
        name: String,
    },

    /// Two declarations claim the same descriptor path.
    #[error("target '{name}' claims descriptor path '{path}' already declared by '{existing}'")]
    #[diagnostic(code(prjgraph::resolve::duplicate_project))]
    DuplicateProject {
        /// Declaration rejected by the registry.
        name: String,
        /// Contested descriptor path.
        path: Utf8PathBuf,
        /// Declaration that registered the path first.
        existing: String,
    },

    /// A reference matches no declaration.
    #[error("{}", unresolved_message(.reference, .dependent.as_deref()))]
    #[diagnostic(
        code(prjgraph::resolve::unresolved_dependency),
        help("declare the missing target or fix the reference")
    )]
    UnresolvedDependency {
        /// Reference that failed to resolve.
        reference: String,
        /// Target whose `required_prj` list holds the reference, if any.
        dependent: Option<String>,
    },

    /// A reference matches one target by descriptor path and another by name.
    #[error(
        "reference '{reference}' is ambiguous: descriptor path of '{by_path}' and name of '{by_name}'"
    )]
    #[diagnostic(
        code(prjgraph::resolve::ambiguous_reference),
        help("rename the target or its descriptor path so each reference has one meaning")
    )]
    AmbiguousReference {
        /// Reference with two meanings.
        reference: String,
        /// Target whose descriptor path matches.
        by_path: String,
        /// Target whose name matches.
        by_name: String,
        /// Target whose `required_prj` list holds the reference, if any.
        dependent: Option<String>,
    },

    /// The dependency graph contains a cycle.
    #[error("cyclic dependency: {}", .cycle.join(" -> "))]
    #[diagnostic(
        code(prjgraph::resolve::cyclic_dependency),
        help("break the cycle by removing one of the required_prj entries")
    )]
    CyclicDependency {
        /// Target names along the cycle; the first name is repeated at the end.
        cycle: Vec<String>,
    },
}

impl ResolveError {
    /// Stable snake-case identifier of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateTarget { .. } => "duplicate_target",
            Self::DuplicateProject { .. } => "duplicate_project",
            Self::UnresolvedDependency { .. } => "unresolved_dependency",
            Self::AmbiguousReference { .. } => "ambiguous_reference",
            Self::CyclicDependency { .. } => "cyclic_dependency",
        }
    }

    /// Name of the target the error should be reported against.
    ///
    /// References that fail without a dependent, such as an unknown root,
    /// report the reference itself.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::DuplicateTarget { name } | Self::DuplicateProject { name, .. } => name.as_str(),
            Self::UnresolvedDependency {
                reference,
                dependent,
            }
            | Self::AmbiguousReference {
                reference,
                dependent,
                ..
            } => dependent.as_deref().unwrap_or(reference.as_str()),
            Self::CyclicDependency { cycle } => cycle.first().map_or("", String::as_str),
        }
    }

    pub(super) fn with_dependent(self, name: &str) -> Self {
        match self {
            Self::UnresolvedDependency {
                reference,
                dependent: None,
            } => Self::UnresolvedDependency {
                reference,
                dependent: Some(name.to_owned()),
            },
            Self::AmbiguousReference {
                reference,
                by_path,
                by_name,
                dependent: None,
            } => Self::AmbiguousReference {
                reference,
                by_path,
                by_name,
                dependent: Some(name.to_owned()),
            },
            other => other,
        }
    }
}

fn unresolved_message(reference: &str, dependent: Option<&str>) -> String {
    dependent.map_or_else(
        || format!("unknown target '{reference}'"),
        |name| format!("target '{name}' requires '{reference}', which is not declared"),
    )
}
