//! Diagnostics utilities.
//!
//! The runner propagates failures as [`anyhow::Error`], which hides the
//! [`miette::Diagnostic`] implementations of the library error types. These
//! helpers find the first diagnostic in an error chain and render it with
//! miette's graphical handler, so descriptor errors keep their source spans,
//! codes and help text when printed.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};

use crate::{
    manifest::ManifestError, resolver::ResolveError, runner::RunnerError,
    target::DeclarationError,
};

/// Return the first link of `err`'s chain that carries diagnostic metadata.
#[must_use]
pub fn find_diagnostic(err: &anyhow::Error) -> Option<&(dyn Diagnostic + 'static)> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<ManifestError>()
            .map(|e| e as &dyn Diagnostic)
            .or_else(|| cause.downcast_ref::<DeclarationError>().map(|e| e as &dyn Diagnostic))
            .or_else(|| cause.downcast_ref::<ResolveError>().map(|e| e as &dyn Diagnostic))
            .or_else(|| cause.downcast_ref::<RunnerError>().map(|e| e as &dyn Diagnostic))
    })
}

/// Render a diagnostic without ANSI colours.
#[must_use]
pub fn render_diagnostic(diag: &dyn Diagnostic) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut out = String::new();
    if handler.render_report(&mut out, diag).is_err() {
        return diag.to_string();
    }
    out
}

/// Render `err` for the terminal.
///
/// Context attached with [`anyhow::Context`] is printed first, followed by the
/// rendered diagnostic when the chain contains one, or the plain cause chain
/// otherwise.
#[must_use]
pub fn render_error(err: &anyhow::Error) -> String {
    let Some(diag) = find_diagnostic(err) else {
        return format!("{err:#}");
    };
    let context: Vec<String> = err
        .chain()
        .take_while(|cause| !std::ptr::addr_eq(*cause, diag))
        .map(ToString::to_string)
        .collect();
    let rendered = render_diagnostic(diag);
    if context.is_empty() {
        rendered
    } else {
        format!("{}\n{rendered}", context.join(": "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use camino::Utf8PathBuf;

    #[test]
    fn finds_diagnostic_below_context() {
        let err = Err::<(), _>(RunnerError::ManifestNotFound {
            path: Utf8PathBuf::from("missing/prjgraph.yml"),
        })
        .context("loading descriptor")
        .expect_err("error");
        let diag = find_diagnostic(&err).expect("diagnostic");
        assert_eq!(
            diag.code().map(|c| c.to_string()).as_deref(),
            Some("prjgraph::runner::manifest_not_found")
        );
    }

    #[test]
    fn render_error_keeps_context_and_help() {
        let err = Err::<(), _>(RunnerError::ManifestNotFound {
            path: Utf8PathBuf::from("missing/prjgraph.yml"),
        })
        .context("loading descriptor")
        .expect_err("error");
        let text = render_error(&err);
        assert!(text.starts_with("loading descriptor\n"), "{text}");
        assert!(text.contains("descriptor not found at missing/prjgraph.yml"));
        assert!(text.contains("Create a prjgraph.yml"), "{text}");
    }

    #[test]
    fn plain_errors_fall_back_to_the_cause_chain() {
        let err = anyhow::anyhow!("disk on fire").context("writing plan");
        assert!(find_diagnostic(&err).is_none());
        assert_eq!(render_error(&err), "writing plan: disk on fire");
    }
}
