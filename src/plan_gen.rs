//! Plan and graph renderers.
//!
//! This module turns a [`BuildPlan`] or a whole [`Resolver`] into the textual
//! forms handed to downstream tools: a plain list of target names, a JSON
//! document for compiler drivers, and a Graphviz DOT graph. Output order
//! follows plan order or registration order, never hash order, so repeated
//! runs produce byte-identical text.

use std::fmt::{self, Display, Formatter};

use camino::Utf8PathBuf;
use itertools::Itertools;
use serde::Serialize;

use crate::hasher::PlanHasher;
use crate::resolver::{BuildPlan, DependencyEdge, Resolver};
use crate::target::{TargetDeclaration, TargetKind};

/// Plan rendered as one target name per line, in build order.
pub struct PlanText<'p, 'a>(pub &'p BuildPlan<'a>);

impl Display for PlanText<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for name in self.0.names() {
            writeln!(f, "{name}")?;
        }
        Ok(())
    }
}

/// Registered targets rendered as `name kind [prj]` lines.
pub struct TargetList<'r>(pub &'r Resolver);

impl Display for TargetList<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for target in self.0.targets() {
            write!(f, "{} {}", target.name(), target.kind())?;
            if let Some(prj) = target.prj() {
                write!(f, " {prj}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Dependency graph in Graphviz DOT format.
///
/// Edges point from a dependent to the target it requires.
pub struct DotGraph<'a> {
    targets: Vec<&'a TargetDeclaration>,
    edges: Vec<DependencyEdge<'a>>,
}

impl<'a> DotGraph<'a> {
    /// Capture every registered target and edge.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`](crate::resolver::ResolveError) when a
    /// reference does not resolve.
    pub fn new(resolver: &'a Resolver) -> Result<Self, crate::resolver::ResolveError> {
        Ok(Self {
            targets: resolver.targets().collect(),
            edges: resolver.edges()?,
        })
    }
}

impl Display for DotGraph<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph prjgraph {{")?;
        for target in &self.targets {
            writeln!(
                f,
                "  \"{}\" [shape={}];",
                escape_dot(target.name()),
                shape_for(target.kind())
            )?;
        }
        for edge in &self.edges {
            writeln!(
                f,
                "  \"{}\" -> \"{}\";",
                escape_dot(edge.from.name()),
                escape_dot(edge.to.name())
            )?;
        }
        writeln!(f, "}}")
    }
}

const fn shape_for(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Executable => "box",
        TargetKind::StaticLibrary | TargetKind::SharedLibrary => "ellipse",
        TargetKind::Composite => "folder",
    }
}

fn escape_dot(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// JSON view of a plan step.
#[derive(Debug, Serialize)]
struct StepDocument<'a> {
    name: &'a str,
    kind: TargetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    prj: Option<&'a str>,
    dependencies: &'a [&'a str],
    sources: Vec<Utf8PathBuf>,
}

/// JSON view of a whole plan.
#[derive(Debug, Serialize)]
struct PlanDocument<'a> {
    roots: &'a [String],
    fingerprint: String,
    steps: Vec<StepDocument<'a>>,
}

/// Serialise a plan for an external compiler driver.
///
/// Each step lists its resolved dependencies and its sources relative to the
/// descriptor root. The `fingerprint` field is [`PlanHasher::hash`].
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn plan_json(plan: &BuildPlan<'_>) -> Result<String, serde_json::Error> {
    let steps = plan
        .steps()
        .iter()
        .map(|step| StepDocument {
            name: step.target.name(),
            kind: step.target.kind(),
            prj: step.target.prj().map(camino::Utf8Path::as_str),
            dependencies: &step.dependencies,
            sources: step.target.source_paths(),
        })
        .collect();
    serde_json::to_string_pretty(&PlanDocument {
        roots: plan.roots(),
        fingerprint: PlanHasher::hash(plan),
        steps,
    })
}

#[derive(Debug, Serialize)]
struct EdgeDocument<'a> {
    from: &'a str,
    to: &'a str,
}

#[derive(Debug, Serialize)]
struct GraphDocument<'a> {
    targets: &'a [&'a TargetDeclaration],
    edges: Vec<EdgeDocument<'a>>,
}

/// Serialise the captured graph as JSON.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn graph_json(graph: &DotGraph<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&GraphDocument {
        targets: &graph.targets,
        edges: graph
            .edges
            .iter()
            .map(|edge| EdgeDocument {
                from: edge.from.name(),
                to: edge.to.name(),
            })
            .collect(),
    })
}

/// Serialise registered declarations as a JSON array.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn targets_json(resolver: &Resolver) -> Result<String, serde_json::Error> {
    let targets: Vec<&TargetDeclaration> = resolver.targets().collect();
    serde_json::to_string_pretty(&targets)
}

/// Summarise a plan on a single line for log output.
#[must_use]
pub fn plan_summary(plan: &BuildPlan<'_>) -> String {
    plan.names().iter().join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn mboxes() -> Resolver {
        Resolver::from_declarations([
            TargetDeclaration::builder("dll")
                .kind(TargetKind::SharedLibrary)
                .prj("ace/dll.rb")
                .build()
                .expect("valid"),
            TargetDeclaration::builder("so_5")
                .kind(TargetKind::SharedLibrary)
                .prj("so_5/prj.rb")
                .require("ace/dll.rb")
                .build()
                .expect("valid"),
            TargetDeclaration::builder("sample.so_5.mboxes")
                .prj("sample/so_5/mboxes/prj.rb")
                .requires(["ace/dll.rb", "so_5/prj.rb"])
                .source("main.cpp")
                .build()
                .expect("valid"),
        ])
        .expect("register")
    }

    #[test]
    fn plan_text_lists_names_in_build_order() {
        let resolver = mboxes();
        let plan = resolver.build_plan("sample.so_5.mboxes").expect("plan");
        assert_eq!(
            PlanText(&plan).to_string(),
            "dll\nso_5\nsample.so_5.mboxes\n"
        );
        assert_eq!(plan_summary(&plan), "dll -> so_5 -> sample.so_5.mboxes");
    }

    #[test]
    fn dot_graph_renders_nodes_and_edges() {
        let resolver = mboxes();
        let graph = DotGraph::new(&resolver).expect("graph");
        assert_snapshot!(graph.to_string().trim_end(), @r#"
        digraph prjgraph {
          "dll" [shape=ellipse];
          "so_5" [shape=ellipse];
          "sample.so_5.mboxes" [shape=box];
          "so_5" -> "dll";
          "sample.so_5.mboxes" -> "dll";
          "sample.so_5.mboxes" -> "so_5";
        }
        "#);
    }

    #[test]
    fn target_list_shows_kind_and_descriptor() {
        let resolver = mboxes();
        assert_snapshot!(TargetList(&resolver).to_string().trim_end(), @r"
        dll shared_library ace/dll.rb
        so_5 shared_library so_5/prj.rb
        sample.so_5.mboxes executable sample/so_5/mboxes/prj.rb
        ");
    }

    #[test]
    fn plan_json_carries_resolved_sources_and_dependencies() {
        let resolver = mboxes();
        let plan = resolver.build_plan("sample.so_5.mboxes").expect("plan");
        let json = plan_json(&plan).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["roots"], serde_json::json!(["sample.so_5.mboxes"]));
        assert_eq!(value["fingerprint"], PlanHasher::hash(&plan));
        let root = &value["steps"][2];
        assert_eq!(root["name"], "sample.so_5.mboxes");
        assert_eq!(root["kind"], "executable");
        assert_eq!(root["dependencies"], serde_json::json!(["dll", "so_5"]));
        assert_eq!(
            root["sources"],
            serde_json::json!(["sample/so_5/mboxes/main.cpp"])
        );
        assert!(value["steps"][0].get("sources").is_some());
    }

    #[test]
    fn dot_graph_draws_one_edge_per_dependency() {
        let resolver = Resolver::from_declarations([
            TargetDeclaration::builder("dll")
                .prj("ace/dll.rb")
                .build()
                .expect("valid"),
            TargetDeclaration::builder("app")
                .requires(["ace/dll.rb", "dll"])
                .build()
                .expect("valid"),
        ])
        .expect("register");
        let dot = DotGraph::new(&resolver).expect("graph").to_string();
        assert_eq!(dot.matches("\"app\" -> \"dll\";").count(), 1, "{dot}");
    }

    #[test]
    fn dot_names_are_escaped() {
        assert_eq!(escape_dot(r#"we"ird\name"#), r#"we\"ird\\name"#);
    }

    #[test]
    fn graph_json_lists_edges() {
        let resolver = mboxes();
        let graph = DotGraph::new(&resolver).expect("graph");
        let value: serde_json::Value =
            serde_json::from_str(&graph_json(&graph).expect("json")).expect("valid json");
        assert_eq!(
            value["edges"][0],
            serde_json::json!({ "from": "so_5", "to": "dll" })
        );
        assert_eq!(value["targets"][2]["name"], "sample.so_5.mboxes");
    }
}
