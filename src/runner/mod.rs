//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the descriptor, registers its targets and writes the requested view
//! to the supplied output stream. [`exit_code`] and [`report_error`] turn a
//! failure into the process exit status and the text shown to the user.

mod error;
mod path_helpers;

pub use error::RunnerError;

use crate::cli::{Cli, Commands, OutputFormat, PlanArgs};
use crate::diagnostics;
use crate::manifest::{self, ManifestName};
use crate::plan_gen::{self, DotGraph, PlanText, TargetList};
use crate::resolver::{ResolveError, Resolver};
use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, info};

use path_helpers::{ensure_manifest_exists, resolve_manifest_path};

/// Exit status for structural resolution failures.
pub const EXIT_RESOLVE_ERROR: u8 = 2;
/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Execute the parsed [`Cli`] command, writing its output to `out`.
///
/// # Errors
///
/// Returns an error if the descriptor cannot be loaded, a target does not
/// resolve, or writing the output fails.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let manifest_path = resolve_manifest_path(cli)?;
    ensure_manifest_exists(&manifest_path)?;
    let descriptor = manifest::from_path(&manifest_path)?;
    let resolver = manifest::load_resolver(&descriptor, &ManifestName::new(manifest_path.as_str()))?;
    info!(
        descriptor = %manifest_path,
        targets = resolver.len(),
        "loaded descriptor"
    );

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Plan(PlanArgs::default()));
    let rendered = match command {
        Commands::Plan(args) => {
            let roots = if args.roots.is_empty() {
                descriptor.defaults
            } else {
                args.roots
            };
            render_plan(&resolver, &roots, &manifest_path, cli.format)?
        }
        Commands::Graph => render_graph(&resolver, cli.format)?,
        Commands::Targets => match cli.format {
            OutputFormat::Text => TargetList(&resolver).to_string(),
            OutputFormat::Json => with_newline(plan_gen::targets_json(&resolver)?),
        },
    };
    out.write_all(rendered.as_bytes())
        .context("writing command output")?;
    out.flush().context("flushing command output")
}

fn render_plan(
    resolver: &Resolver,
    roots: &[String],
    manifest_path: &Utf8Path,
    format: OutputFormat,
) -> Result<String> {
    if roots.is_empty() {
        return Err(RunnerError::NoRoots {
            descriptor: manifest_path.to_path_buf(),
        }
        .into());
    }
    let plan = resolver.build_plan_for(roots)?;
    info!(roots = ?plan.roots(), steps = plan.len(), "planned build");
    debug!(plan = %plan_gen::plan_summary(&plan));
    Ok(match format {
        OutputFormat::Text => PlanText(&plan).to_string(),
        OutputFormat::Json => with_newline(plan_gen::plan_json(&plan)?),
    })
}

fn render_graph(resolver: &Resolver, format: OutputFormat) -> Result<String> {
    let graph = DotGraph::new(resolver)?;
    Ok(match format {
        OutputFormat::Text => graph.to_string(),
        OutputFormat::Json => with_newline(plan_gen::graph_json(&graph)?),
    })
}

fn with_newline(mut text: String) -> String {
    text.push('\n');
    text
}

/// Map a failure to the process exit status.
///
/// Resolution errors exit with [`EXIT_RESOLVE_ERROR`]; everything else,
/// including I/O and descriptor validation errors, with [`EXIT_FAILURE`].
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ResolveError>().is_some() {
        EXIT_RESOLVE_ERROR
    } else {
        EXIT_FAILURE
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    target: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct ErrorDocument<'a> {
    error: ErrorBody<'a>,
}

/// Write a user-facing report of `err`.
///
/// Resolution errors are printed as `error[<kind>]: <message>` followed by
/// the offending target, and in JSON mode also written to `out` as an error
/// document. Other failures are rendered as miette reports on `err_out`.
///
/// # Errors
///
/// Returns an error if writing to either stream fails.
pub fn report_error(
    err: &anyhow::Error,
    format: OutputFormat,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> io::Result<()> {
    let Some(resolve) = err.downcast_ref::<ResolveError>() else {
        return writeln!(err_out, "{}", diagnostics::render_error(err).trim_end());
    };
    writeln!(err_out, "error[{}]: {resolve}", resolve.kind())?;
    writeln!(err_out, "  target: {}", resolve.target())?;
    if format == OutputFormat::Json {
        let cycle = match resolve {
            ResolveError::CyclicDependency { cycle } => Some(cycle.as_slice()),
            _ => None,
        };
        let document = ErrorDocument {
            error: ErrorBody {
                kind: resolve.kind(),
                target: resolve.target(),
                message: resolve.to_string(),
                cycle,
            },
        };
        serde_json::to_writer_pretty(&mut *out, &document)?;
        writeln!(out)?;
    }
    Ok(())
}
