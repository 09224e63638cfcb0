//! Typed target declarations.
//!
//! A [`TargetDeclaration`] is the validated form of a descriptor entry. All
//! structural checks happen while it is built, so the resolver only ever sees
//! well-formed declarations and can focus on the graph itself.
//!
//! ```rust
//! use prjgraph::target::{TargetDeclaration, TargetKind};
//!
//! let exe = TargetDeclaration::builder("sample.so_5.mboxes")
//!     .kind(TargetKind::Executable)
//!     .prj("sample/so_5/mboxes/prj.rb")
//!     .require("ace/dll.rb")
//!     .require("so_5/prj.rb")
//!     .source("main.cpp")
//!     .build()
//!     .expect("valid declaration");
//! assert_eq!(exe.required(), ["ace/dll.rb", "so_5/prj.rb"]);
//! assert_eq!(exe.source_paths()[0], "sample/so_5/mboxes/main.cpp");
//! ```

use std::collections::HashSet;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::RawTarget;

/// What a target produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A linked program.
    #[default]
    Executable,
    /// An archive of object files.
    StaticLibrary,
    /// A dynamically loaded library.
    SharedLibrary,
    /// A grouping of other targets with no sources of its own.
    Composite,
}

impl TargetKind {
    /// Stable identifier used in descriptors and rendered output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Executable => "executable",
            Self::StaticLibrary => "static_library",
            Self::SharedLibrary => "shared_library",
            Self::Composite => "composite",
        }
    }

    /// Whether targets of this kind may list source files.
    #[must_use]
    pub const fn compiles_sources(self) -> bool {
        !matches!(self, Self::Composite)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural defects found while validating a single declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DeclarationError {
    /// The target name is empty.
    #[error("target name must not be empty")]
    #[diagnostic(code(prjgraph::declaration::empty_name))]
    EmptyName,

    /// The target name contains whitespace.
    #[error("target name '{name}' must not contain whitespace")]
    #[diagnostic(code(prjgraph::declaration::invalid_name))]
    InvalidName {
        /// Offending name.
        name: String,
    },

    /// The `prj` path is present but empty.
    #[error("target '{name}' declares an empty descriptor path")]
    #[diagnostic(code(prjgraph::declaration::empty_prj))]
    EmptyPrj {
        /// Declaring target.
        name: String,
    },

    /// A `required_prj` entry is empty.
    #[error("target '{name}' requires an empty reference")]
    #[diagnostic(code(prjgraph::declaration::empty_reference))]
    EmptyReference {
        /// Declaring target.
        name: String,
    },

    /// The target requires itself by name or by its own descriptor path.
    #[error("target '{name}' requires itself")]
    #[diagnostic(
        code(prjgraph::declaration::self_requirement),
        help("remove the target from its own required_prj list")
    )]
    SelfRequirement {
        /// Declaring target.
        name: String,
    },

    /// The same reference appears twice in one `required_prj` list.
    #[error("target '{name}' requires '{reference}' more than once")]
    #[diagnostic(code(prjgraph::declaration::duplicate_requirement))]
    DuplicateRequirement {
        /// Declaring target.
        name: String,
        /// Repeated reference.
        reference: String,
    },

    /// A source path is empty.
    #[error("target '{name}' lists an empty source path")]
    #[diagnostic(code(prjgraph::declaration::empty_source))]
    EmptySource {
        /// Declaring target.
        name: String,
    },

    /// The same source file is listed twice.
    #[error("target '{name}' lists source '{path}' more than once")]
    #[diagnostic(code(prjgraph::declaration::duplicate_source))]
    DuplicateSource {
        /// Declaring target.
        name: String,
        /// Repeated source path.
        path: Utf8PathBuf,
    },

    /// A composite target lists sources.
    #[error("composite target '{name}' cannot compile sources")]
    #[diagnostic(
        code(prjgraph::declaration::composite_sources),
        help("move the sources into a library or executable target and require it")
    )]
    CompositeWithSources {
        /// Declaring target.
        name: String,
    },
}

/// A validated, immutable target declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDeclaration {
    name: String,
    kind: TargetKind,
    prj: Option<Utf8PathBuf>,
    required: Vec<String>,
    sources: Vec<Utf8PathBuf>,
}

impl TargetDeclaration {
    /// Start building a declaration called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> DeclarationBuilder {
        DeclarationBuilder::new(name)
    }

    /// Unique target name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the target produces.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Descriptor path under which other targets may require this one.
    #[must_use]
    pub fn prj(&self) -> Option<&Utf8Path> {
        self.prj.as_deref()
    }

    /// Required sub-project references in declaration order.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Source paths exactly as declared.
    #[must_use]
    pub fn sources(&self) -> &[Utf8PathBuf] {
        &self.sources
    }

    /// Source paths joined onto the directory holding the descriptor.
    ///
    /// Absolute sources and targets without a `prj` path are returned
    /// unchanged.
    #[must_use]
    pub fn source_paths(&self) -> Vec<Utf8PathBuf> {
        let base = self.prj.as_deref().and_then(Utf8Path::parent);
        self.sources
            .iter()
            .map(|source| match base {
                Some(dir) if !dir.as_str().is_empty() => dir.join(source),
                _ => source.clone(),
            })
            .collect()
    }
}

impl TryFrom<&RawTarget> for TargetDeclaration {
    type Error = DeclarationError;

    fn try_from(raw: &RawTarget) -> Result<Self, Self::Error> {
        let mut builder = Self::builder(raw.name.as_str()).kind(raw.kind);
        if let Some(prj) = &raw.prj {
            builder = builder.prj(prj.as_str());
        }
        builder
            .requires(raw.required_prj.items())
            .sources(raw.cpp_source.items())
            .build()
    }
}

/// Collects the parts of a [`TargetDeclaration`] and validates them in
/// [`DeclarationBuilder::build`].
#[derive(Debug, Clone)]
pub struct DeclarationBuilder {
    name: String,
    kind: TargetKind,
    prj: Option<String>,
    required: Vec<String>,
    sources: Vec<String>,
}

impl DeclarationBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TargetKind::default(),
            prj: None,
            required: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Set the target kind.
    #[must_use]
    pub const fn kind(mut self, kind: TargetKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the descriptor path.
    #[must_use]
    pub fn prj(mut self, path: impl Into<String>) -> Self {
        self.prj = Some(path.into());
        self
    }

    /// Append one required sub-project reference.
    #[must_use]
    pub fn require(mut self, reference: impl Into<String>) -> Self {
        self.required.push(reference.into());
        self
    }

    /// Append several required sub-project references.
    #[must_use]
    pub fn requires<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(references.into_iter().map(Into::into));
        self
    }

    /// Append one source path.
    #[must_use]
    pub fn source(mut self, path: impl Into<String>) -> Self {
        self.sources.push(path.into());
        self
    }

    /// Append several source paths.
    #[must_use]
    pub fn sources<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Validate the collected parts.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError`] for the first structural defect found.
    pub fn build(self) -> Result<TargetDeclaration, DeclarationError> {
        let Self {
            name,
            kind,
            prj,
            required,
            sources,
        } = self;

        if name.is_empty() {
            return Err(DeclarationError::EmptyName);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(DeclarationError::InvalidName { name });
        }
        let prj = match prj {
            Some(path) if path.trim().is_empty() => {
                return Err(DeclarationError::EmptyPrj { name });
            }
            Some(path) => Some(Utf8PathBuf::from(path)),
            None => None,
        };

        let mut seen = HashSet::new();
        for reference in &required {
            if reference.trim().is_empty() {
                return Err(DeclarationError::EmptyReference { name });
            }
            let is_self = *reference == name
                || prj.as_deref() == Some(Utf8Path::new(reference.as_str()));
            if is_self {
                return Err(DeclarationError::SelfRequirement { name });
            }
            if !seen.insert(reference.as_str()) {
                return Err(DeclarationError::DuplicateRequirement {
                    reference: reference.clone(),
                    name,
                });
            }
        }

        if !kind.compiles_sources() && !sources.is_empty() {
            return Err(DeclarationError::CompositeWithSources { name });
        }
        let mut paths: Vec<Utf8PathBuf> = Vec::with_capacity(sources.len());
        for source in sources {
            if source.trim().is_empty() {
                return Err(DeclarationError::EmptySource { name });
            }
            let path = Utf8PathBuf::from(source);
            if paths.contains(&path) {
                return Err(DeclarationError::DuplicateSource { name, path });
            }
            paths.push(path);
        }

        Ok(TargetDeclaration {
            name,
            kind,
            prj,
            required,
            sources: paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StringOrList;
    use rstest::rstest;

    #[rstest]
    fn builder_keeps_declaration_order() {
        let decl = TargetDeclaration::builder("app")
            .require("zlib")
            .require("alpha")
            .sources(["b.cpp", "a.cpp"])
            .build()
            .expect("valid");
        assert_eq!(decl.required(), ["zlib", "alpha"]);
        assert_eq!(
            decl.sources(),
            [Utf8PathBuf::from("b.cpp"), Utf8PathBuf::from("a.cpp")]
        );
        assert_eq!(decl.kind(), TargetKind::Executable);
    }

    #[rstest]
    #[case(TargetDeclaration::builder(""), DeclarationError::EmptyName)]
    #[case(
        TargetDeclaration::builder("my app"),
        DeclarationError::InvalidName { name: "my app".into() }
    )]
    #[case(
        TargetDeclaration::builder("app").prj("  "),
        DeclarationError::EmptyPrj { name: "app".into() }
    )]
    #[case(
        TargetDeclaration::builder("app").require(""),
        DeclarationError::EmptyReference { name: "app".into() }
    )]
    #[case(
        TargetDeclaration::builder("app").require("app"),
        DeclarationError::SelfRequirement { name: "app".into() }
    )]
    #[case(
        TargetDeclaration::builder("app").prj("app/prj.rb").require("app/prj.rb"),
        DeclarationError::SelfRequirement { name: "app".into() }
    )]
    #[case(
        TargetDeclaration::builder("app").requires(["lib", "lib"]),
        DeclarationError::DuplicateRequirement { name: "app".into(), reference: "lib".into() }
    )]
    #[case(
        TargetDeclaration::builder("app").source(""),
        DeclarationError::EmptySource { name: "app".into() }
    )]
    #[case(
        TargetDeclaration::builder("app").sources(["main.cpp", "main.cpp"]),
        DeclarationError::DuplicateSource { name: "app".into(), path: "main.cpp".into() }
    )]
    #[case(
        TargetDeclaration::builder("all").kind(TargetKind::Composite).source("x.cpp"),
        DeclarationError::CompositeWithSources { name: "all".into() }
    )]
    fn builder_rejects_malformed_declarations(
        #[case] builder: DeclarationBuilder,
        #[case] expected: DeclarationError,
    ) {
        assert_eq!(builder.build().expect_err("invalid"), expected);
    }

    #[rstest]
    #[case(Some("so_5/prj.rb"), "so_5/so_5.cpp")]
    #[case(Some("prj.rb"), "so_5.cpp")]
    #[case(None, "so_5.cpp")]
    fn source_paths_are_relative_to_descriptor(#[case] prj: Option<&str>, #[case] expected: &str) {
        let mut builder = TargetDeclaration::builder("so_5").kind(TargetKind::SharedLibrary);
        if let Some(path) = prj {
            builder = builder.prj(path);
        }
        let decl = builder.source("so_5.cpp").build().expect("valid");
        assert_eq!(decl.source_paths(), vec![Utf8PathBuf::from(expected)]);
    }

    #[rstest]
    fn raw_target_converts_with_kind_and_lists() {
        let raw = RawTarget {
            name: "so_5".into(),
            kind: TargetKind::SharedLibrary,
            prj: Some("so_5/prj.rb".into()),
            required_prj: StringOrList::String("ace/dll.rb".into()),
            cpp_source: StringOrList::List(vec!["rt.cpp".into(), "disp.cpp".into()]),
        };
        let decl = TargetDeclaration::try_from(&raw).expect("valid");
        assert_eq!(decl.name(), "so_5");
        assert_eq!(decl.kind(), TargetKind::SharedLibrary);
        assert_eq!(decl.prj(), Some(Utf8Path::new("so_5/prj.rb")));
        assert_eq!(decl.required(), ["ace/dll.rb"]);
        assert_eq!(decl.sources().len(), 2);
    }

    #[rstest]
    fn kind_display_matches_descriptor_spelling() {
        assert_eq!(TargetKind::SharedLibrary.to_string(), "shared_library");
        assert!(!TargetKind::Composite.compiles_sources());
    }
}
