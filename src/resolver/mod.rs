//! Target graph resolution.
//!
//! The [`Resolver`] is a registry of validated [`TargetDeclaration`]s. It
//! resolves `required_prj` references, walks the dependency graph depth first
//! and emits a [`BuildPlan`] in which every dependency precedes its
//! dependents. Sibling dependencies are visited in declaration order, so the
//! same registry always yields the same plan.
//!
//! A reference resolves by descriptor path first and by target name second.
//! When the two lookups name different targets the reference is rejected as
//! ambiguous instead of picking one.
//!
//! # Examples
//!
//! ```
//! use prjgraph::resolver::Resolver;
//! use prjgraph::target::{TargetDeclaration, TargetKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut resolver = Resolver::new();
//! resolver.register(TargetDeclaration::builder("dll").build()?)?;
//! resolver.register(TargetDeclaration::builder("so_5").build()?)?;
//! resolver.register(
//!     TargetDeclaration::builder("sample.so_5.mboxes")
//!         .kind(TargetKind::Executable)
//!         .requires(["dll", "so_5"])
//!         .source("main.cpp")
//!         .build()?,
//! )?;
//! let plan = resolver.build_plan("sample.so_5.mboxes")?;
//! assert_eq!(plan.names(), ["dll", "so_5", "sample.so_5.mboxes"]);
//! # Ok(()) }
//! ```

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

use crate::target::TargetDeclaration;

mod error;
mod plan;
mod walk;

pub use error::ResolveError;
pub use plan::{BuildPlan, PlanStep};

use walk::PlanWalker;

/// A resolved `required_prj` relationship between two registered targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge<'a> {
    /// Target holding the reference.
    pub from: &'a TargetDeclaration,
    /// Target the reference resolves to.
    pub to: &'a TargetDeclaration,
}

/// Registry of target declarations for a single build invocation.
#[derive(Debug, Default)]
pub struct Resolver {
    targets: IndexMap<String, TargetDeclaration>,
    projects: HashMap<Utf8PathBuf, usize>,
}

impl Resolver {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every declaration in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolveError`] raised by [`Resolver::register`].
    pub fn from_declarations<I>(declarations: I) -> Result<Self, ResolveError>
    where
        I: IntoIterator<Item = TargetDeclaration>,
    {
        let mut resolver = Self::new();
        for declaration in declarations {
            resolver.register(declaration)?;
        }
        Ok(resolver)
    }

    /// Insert a declaration into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::DuplicateTarget`] when the name is taken and
    /// [`ResolveError::DuplicateProject`] when the descriptor path is.
    pub fn register(&mut self, declaration: TargetDeclaration) -> Result<(), ResolveError> {
        if self.targets.contains_key(declaration.name()) {
            return Err(ResolveError::DuplicateTarget {
                name: declaration.name().to_owned(),
            });
        }
        if let Some(path) = declaration.prj() {
            if let Some(existing) = self
                .projects
                .get(path)
                .and_then(|&idx| self.targets.get_index(idx))
            {
                return Err(ResolveError::DuplicateProject {
                    name: declaration.name().to_owned(),
                    path: path.to_path_buf(),
                    existing: existing.0.clone(),
                });
            }
            self.projects.insert(path.to_path_buf(), self.targets.len());
        }
        tracing::debug!(
            name = declaration.name(),
            kind = %declaration.kind(),
            prj = ?declaration.prj(),
            "registered target"
        );
        self.targets
            .insert(declaration.name().to_owned(), declaration);
        Ok(())
    }

    /// Look up the declaration a reference points to.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnresolvedDependency`] when nothing matches and
    /// [`ResolveError::AmbiguousReference`] when the descriptor path and the
    /// name match different targets.
    pub fn resolve(&self, reference: &str) -> Result<&TargetDeclaration, ResolveError> {
        let by_path = self
            .projects
            .get(Utf8Path::new(reference))
            .and_then(|&idx| self.targets.get_index(idx))
            .map(|(_, target)| target);
        let by_name = self.targets.get(reference);
        match (by_path, by_name) {
            (Some(path_hit), Some(name_hit)) if path_hit.name() != name_hit.name() => {
                Err(ResolveError::AmbiguousReference {
                    reference: reference.to_owned(),
                    by_path: path_hit.name().to_owned(),
                    by_name: name_hit.name().to_owned(),
                    dependent: None,
                })
            }
            (Some(target), _) | (None, Some(target)) => Ok(target),
            (None, None) => Err(ResolveError::UnresolvedDependency {
                reference: reference.to_owned(),
                dependent: None,
            }),
        }
    }

    /// Plan `root` and everything it transitively requires.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnresolvedDependency`] or
    /// [`ResolveError::AmbiguousReference`] for references that do not resolve
    /// to exactly one target, and [`ResolveError::CyclicDependency`] with the
    /// full cycle path when the graph reachable from `root` is cyclic.
    pub fn build_plan(&self, root: &str) -> Result<BuildPlan<'_>, ResolveError> {
        self.build_plan_for([root])
    }

    /// Plan several roots at once.
    ///
    /// Roots are walked in the order given and shared dependencies appear
    /// once, at the position where they were first needed.
    ///
    /// # Errors
    ///
    /// See [`Resolver::build_plan`].
    pub fn build_plan_for<I, S>(&self, roots: I) -> Result<BuildPlan<'_>, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut walker = PlanWalker::new(self);
        let mut requested = Vec::new();
        for root in roots {
            let root = root.as_ref();
            let target = self.resolve(root)?;
            walker.visit(target)?;
            requested.push(root.to_owned());
        }
        let plan = BuildPlan::new(requested, walker.into_steps());
        tracing::debug!(roots = ?plan.roots(), steps = plan.len(), "built plan");
        Ok(plan)
    }

    /// Direct dependencies of the target `reference` points to, in
    /// declaration order. A target reached by both its path and its name is
    /// listed once.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when `reference` or one of its
    /// requirements does not resolve.
    pub fn dependencies_of(
        &self,
        reference: &str,
    ) -> Result<Vec<&TargetDeclaration>, ResolveError> {
        let target = self.resolve(reference)?;
        let mut dependencies: Vec<&TargetDeclaration> = Vec::with_capacity(target.required().len());
        for dep in target.required() {
            let resolved = self
                .resolve(dep)
                .map_err(|err| err.with_dependent(target.name()))?;
            if !dependencies.iter().any(|known| known.name() == resolved.name()) {
                dependencies.push(resolved);
            }
        }
        Ok(dependencies)
    }

    /// Every dependency edge, ordered by dependent then by declaration order.
    ///
    /// Each `(from, to)` pair appears once even when `from` reaches `to`
    /// through several references.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] for the first reference that does not
    /// resolve.
    pub fn edges(&self) -> Result<Vec<DependencyEdge<'_>>, ResolveError> {
        let mut edges: Vec<DependencyEdge<'_>> = Vec::new();
        for from in self.targets.values() {
            let first = edges.len();
            for reference in from.required() {
                let to = self
                    .resolve(reference)
                    .map_err(|err| err.with_dependent(from.name()))?;
                let known = edges
                    .get(first..)
                    .is_some_and(|own| own.iter().any(|edge| edge.to.name() == to.name()));
                if !known {
                    edges.push(DependencyEdge { from, to });
                }
            }
        }
        Ok(edges)
    }

    /// Iterate over registered declarations in registration order.
    pub fn targets(&self) -> impl Iterator<Item = &TargetDeclaration> {
        self.targets.values()
    }

    /// Declaration registered under `name`, ignoring descriptor paths.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TargetDeclaration> {
        self.targets.get(name)
    }

    /// Number of registered declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
