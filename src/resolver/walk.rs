//! Depth-first plan construction with cycle detection.

use std::collections::HashMap;

use crate::target::TargetDeclaration;

use super::{PlanStep, ResolveError, Resolver};

/// Tracks the visitation state of a node during traversal.
///
/// Nodes absent from the state map have not been reached yet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

/// A target whose requirements are still being walked.
struct Frame<'a> {
    target: &'a TargetDeclaration,
    /// Index of the next requirement to resolve.
    next: usize,
    dependencies: Vec<&'a str>,
}

/// Walks `required_prj` edges and records targets in post-order.
pub(super) struct PlanWalker<'a> {
    resolver: &'a Resolver,
    stack: Vec<&'a str>,
    states: HashMap<&'a str, VisitState>,
    steps: Vec<PlanStep<'a>>,
}

impl<'a> PlanWalker<'a> {
    pub(super) fn new(resolver: &'a Resolver) -> Self {
        Self {
            resolver,
            stack: Vec::new(),
            states: HashMap::new(),
            steps: Vec::new(),
        }
    }

    pub(super) fn into_steps(self) -> Vec<PlanStep<'a>> {
        self.steps
    }

    /// Walk everything reachable from `target` and append it in post-order.
    ///
    /// The traversal keeps its own frame stack, so chain depth is bounded by
    /// memory rather than by the thread's call stack.
    pub(super) fn visit(&mut self, target: &'a TargetDeclaration) -> Result<(), ResolveError> {
        let mut frames = Vec::new();
        self.enter(target, &mut frames)?;

        while let Some(frame) = frames.last_mut() {
            let current: &'a TargetDeclaration = frame.target;
            let Some(reference) = current.required().get(frame.next) else {
                if let Some(done) = frames.pop() {
                    self.finish(done.target, done.dependencies);
                }
                continue;
            };
            frame.next += 1;
            let dependency = self
                .resolver
                .resolve(reference)
                .map_err(|err| err.with_dependent(current.name()))?;
            if !frame.dependencies.contains(&dependency.name()) {
                frame.dependencies.push(dependency.name());
            }
            self.enter(dependency, &mut frames)?;
        }
        Ok(())
    }

    /// Mark `target` as in progress and push its frame, unless it is already
    /// planned. Re-entering a target that is still in progress is a cycle.
    fn enter(
        &mut self,
        target: &'a TargetDeclaration,
        frames: &mut Vec<Frame<'a>>,
    ) -> Result<(), ResolveError> {
        let name = target.name();
        match self.states.get(name) {
            Some(VisitState::Visited) => Ok(()),
            Some(VisitState::Visiting) => Err(self.cycle_through(name)),
            None => {
                self.states.insert(name, VisitState::Visiting);
                self.stack.push(name);
                frames.push(Frame {
                    target,
                    next: 0,
                    dependencies: Vec::with_capacity(target.required().len()),
                });
                Ok(())
            }
        }
    }

    fn finish(&mut self, target: &'a TargetDeclaration, dependencies: Vec<&'a str>) {
        let name = target.name();
        self.stack.pop();
        self.states.insert(name, VisitState::Visited);
        tracing::debug!(target_name = name, position = self.steps.len(), "planned target");
        self.steps.push(PlanStep {
            target,
            dependencies,
        });
    }

    fn cycle_through(&self, name: &str) -> ResolveError {
        let start = self
            .stack
            .iter()
            .position(|n| *n == name)
            .unwrap_or_else(|| {
                debug_assert!(false, "visiting node must be on the stack");
                0
            });
        let mut cycle: Vec<String> = self
            .stack
            .iter()
            .skip(start)
            .map(|n| (*n).to_owned())
            .collect();
        cycle.push(name.to_owned());
        ResolveError::CyclicDependency { cycle }
    }

    #[cfg(test)]
    fn is_visited(&self, name: &str) -> bool {
        matches!(self.states.get(name), Some(VisitState::Visited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str, deps: &[&str]) -> TargetDeclaration {
        TargetDeclaration::builder(name)
            .requires(deps.iter().copied())
            .build()
            .expect("valid declaration")
    }

    fn resolver(decls: Vec<TargetDeclaration>) -> Resolver {
        Resolver::from_declarations(decls).expect("register")
    }

    #[test]
    fn walker_marks_nodes_visited_after_traversal() {
        let graph = resolver(vec![decl("a", &["b"]), decl("b", &[])]);
        let root = graph.resolve("a").expect("root");
        let mut walker = PlanWalker::new(&graph);
        walker.visit(root).expect("acyclic");
        assert!(walker.is_visited("a"));
        assert!(walker.is_visited("b"));
        assert!(
            walker.stack.is_empty(),
            "stack should be empty after complete traversal",
        );
    }

    #[test]
    fn walker_reports_cycle_from_reentry_point() {
        let graph = resolver(vec![
            decl("root", &["a"]),
            decl("a", &["b"]),
            decl("b", &["c"]),
            decl("c", &["a"]),
        ]);
        let root = graph.resolve("root").expect("root");
        let mut walker = PlanWalker::new(&graph);
        let err = walker.visit(root).expect_err("cycle");
        assert_eq!(
            err,
            ResolveError::CyclicDependency {
                cycle: vec!["a".into(), "b".into(), "c".into(), "a".into()],
            }
        );
    }

    #[test]
    fn walker_records_dependencies_once() {
        let dll = TargetDeclaration::builder("dll")
            .prj("ace/dll.rb")
            .build()
            .expect("valid");
        let graph = resolver(vec![dll, decl("app", &["ace/dll.rb", "dll"])]);
        let root = graph.resolve("app").expect("root");
        let mut walker = PlanWalker::new(&graph);
        walker.visit(root).expect("acyclic");
        let steps = walker.into_steps();
        let app = steps.last().expect("app step");
        assert_eq!(app.dependencies, vec!["dll"]);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn walker_attaches_dependent_to_unresolved_reference() {
        let graph = resolver(vec![decl("app", &["missing"])]);
        let root = graph.resolve("app").expect("root");
        let mut walker = PlanWalker::new(&graph);
        let err = walker.visit(root).expect_err("unresolved");
        assert_eq!(
            err,
            ResolveError::UnresolvedDependency {
                reference: "missing".into(),
                dependent: Some("app".into()),
            }
        );
    }
}
