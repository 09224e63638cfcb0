//! Dependency-ordered build plans.

use serde::Serialize;

use crate::target::TargetDeclaration;

/// One target in a [`BuildPlan`] together with its resolved dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep<'a> {
    /// The declaration to build.
    pub target: &'a TargetDeclaration,
    /// Names of the targets this one requires, in declaration order.
    pub dependencies: Vec<&'a str>,
}

impl PlanStep<'_> {
    /// Name of the planned target.
    #[must_use]
    pub fn name(&self) -> &str {
        self.target.name()
    }
}

/// Targets ordered so every dependency precedes its dependents.
///
/// Each target appears at most once. The plan borrows the declarations held
/// by the [`Resolver`](super::Resolver) that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan<'a> {
    roots: Vec<String>,
    steps: Vec<PlanStep<'a>>,
}

impl<'a> BuildPlan<'a> {
    pub(super) const fn new(roots: Vec<String>, steps: Vec<PlanStep<'a>>) -> Self {
        Self { roots, steps }
    }

    /// Root targets the plan was built for, as requested.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Steps in build order.
    #[must_use]
    pub fn steps(&self) -> &[PlanStep<'a>] {
        &self.steps
    }

    /// Iterate over planned declarations in build order.
    pub fn iter(&self) -> impl Iterator<Item = &'a TargetDeclaration> + '_ {
        self.steps.iter().map(|step| step.target)
    }

    /// Planned target names in build order.
    #[must_use]
    pub fn names(&self) -> Vec<&'a str> {
        self.steps.iter().map(|step| step.target.name()).collect()
    }

    /// Zero-based build position of `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.target.name() == name)
    }

    /// Whether `name` is part of the plan.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of planned targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan holds no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<'p, 'a> IntoIterator for &'p BuildPlan<'a> {
    type Item = &'p PlanStep<'a>;
    type IntoIter = std::slice::Iter<'p, PlanStep<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
