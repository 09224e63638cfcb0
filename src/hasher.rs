//! Plan fingerprinting.
//!
//! This module provides the [`PlanHasher`] type used to compute a stable
//! SHA-256 digest for a [`BuildPlan`]. Downstream drivers compare the digest
//! between invocations to tell whether the build order or inputs changed.
//!
//! # Examples
//!
//! ```
//! use prjgraph::hasher::PlanHasher;
//! use prjgraph::resolver::Resolver;
//! use prjgraph::target::TargetDeclaration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Resolver::from_declarations([TargetDeclaration::builder("app").build()?])?;
//! let plan = resolver.build_plan("app")?;
//! let digest = PlanHasher::hash(&plan);
//! assert_eq!(digest.len(), 64);
//! # Ok(()) }
//! ```

use sha2::{Digest, Sha256};

use crate::resolver::{BuildPlan, PlanStep};

/// Computes stable digests for [`BuildPlan`] values.
pub struct PlanHasher;

impl PlanHasher {
    /// Calculate the hex-encoded hash of a plan.
    #[must_use]
    pub fn hash(plan: &BuildPlan<'_>) -> String {
        let mut hasher = Sha256::new();
        Self::update_with_len(&mut hasher, &plan.len().to_le_bytes());
        for step in plan {
            Self::hash_step(&mut hasher, step);
        }
        format!("{:x}", hasher.finalize())
    }

    fn hash_step(hasher: &mut Sha256, step: &PlanStep<'_>) {
        let target = step.target;
        Self::update_with_len(hasher, target.name().as_bytes());
        Self::update_with_len(hasher, target.kind().as_str().as_bytes());
        Self::update_list(hasher, step.dependencies.iter().map(|d| d.as_bytes()));
        Self::update_list(
            hasher,
            target.source_paths().iter().map(|p| p.as_str().as_bytes()),
        );
    }

    fn update_list<'b>(hasher: &mut Sha256, items: impl ExactSizeIterator<Item = &'b [u8]>) {
        hasher.update(items.len().to_le_bytes());
        for item in items {
            Self::update_with_len(hasher, item);
        }
    }

    fn update_with_len(hasher: &mut Sha256, bytes: &[u8]) {
        hasher.update(bytes.len().to_le_bytes());
        hasher.update(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolver;
    use crate::target::{TargetDeclaration, TargetKind};

    fn resolver(kind: TargetKind, sources: &[&str]) -> Resolver {
        Resolver::from_declarations([
            TargetDeclaration::builder("lib")
                .kind(kind)
                .sources(sources.iter().copied())
                .build()
                .expect("valid"),
            TargetDeclaration::builder("app")
                .require("lib")
                .build()
                .expect("valid"),
        ])
        .expect("register")
    }

    #[test]
    fn hash_is_stable_for_identical_plans() {
        let a = resolver(TargetKind::StaticLibrary, &["a.cpp"]);
        let b = resolver(TargetKind::StaticLibrary, &["a.cpp"]);
        let left = PlanHasher::hash(&a.build_plan("app").expect("plan"));
        let right = PlanHasher::hash(&b.build_plan("app").expect("plan"));
        assert_eq!(left, right);
    }

    #[test]
    fn hash_changes_with_kind_and_sources() {
        let base = resolver(TargetKind::StaticLibrary, &["a.cpp"]);
        let shared = resolver(TargetKind::SharedLibrary, &["a.cpp"]);
        let more = resolver(TargetKind::StaticLibrary, &["a.cpp", "b.cpp"]);
        let base_hash = PlanHasher::hash(&base.build_plan("app").expect("plan"));
        assert_ne!(
            base_hash,
            PlanHasher::hash(&shared.build_plan("app").expect("plan"))
        );
        assert_ne!(
            base_hash,
            PlanHasher::hash(&more.build_plan("app").expect("plan"))
        );
    }

    #[test]
    fn length_prefix_separates_adjacent_fields() {
        let mut joined = Sha256::new();
        PlanHasher::update_with_len(&mut joined, b"ab");
        PlanHasher::update_with_len(&mut joined, b"c");
        let mut split = Sha256::new();
        PlanHasher::update_with_len(&mut split, b"a");
        PlanHasher::update_with_len(&mut split, b"bc");
        assert_ne!(joined.finalize(), split.finalize());
    }
}
