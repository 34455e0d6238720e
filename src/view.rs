//! Presentation of results and diagnostics.

use std::path::Path;

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::command::ViewType;
use crate::error::ScaffoldError;
use crate::render::{human, json, RenderedResource};
use crate::schema::{Diagnostic, DiagnosticSeverity};

/// Format a rendered resource for the selected view.
pub fn format_resource(
    view_type: ViewType,
    resource: &RenderedResource,
) -> Result<String, ScaffoldError> {
    match view_type {
        ViewType::Human => Ok(human::format(resource)),
        ViewType::Json => Ok(json::format(resource)?),
    }
}

/// Format diagnostics for the selected view.
///
/// The human view prints one paragraph per diagnostic. The JSON view prints
/// one JSON object per line.
pub fn format_diagnostics(view_type: ViewType, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        match view_type {
            ViewType::Human => write_human_diagnostic(&mut out, diagnostic),
            ViewType::Json => {
                // Serializing plain strings and numbers cannot fail.
                if let Ok(line) = serde_json::to_string(diagnostic) {
                    out.push_str(&line);
                    out.push('\n');
                }
            },
        }
    }
    out
}

fn write_human_diagnostic(out: &mut String, diagnostic: &Diagnostic) {
    let label = match diagnostic.severity {
        DiagnosticSeverity::Error => "Error",
        DiagnosticSeverity::Warning => "Warning",
    };
    out.push_str(&format!("{label}: {}\n", diagnostic.summary));

    if diagnostic.subject.is_some() || diagnostic.attribute.is_some() {
        out.push('\n');
    }
    if let Some(subject) = &diagnostic.subject {
        out.push_str(&format!("  on {subject}\n"));
    }
    if let Some(attribute) = &diagnostic.attribute {
        out.push_str(&format!("  with {attribute}\n"));
    }
    if let Some(detail) = diagnostic.detail.as_deref().filter(|d| !d.is_empty()) {
        out.push('\n');
        out.push_str(detail);
        out.push('\n');
    }
    out.push('\n');
}

/// Write generated text to `path`, or stdout when `path` is `None`.
///
/// Files are appended to, never truncated. When the file already holds
/// content, a blank line separates it from the new text.
pub async fn write_output(path: Option<&Path>, text: &str) -> Result<(), ScaffoldError> {
    let Some(path) = path else {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;
        return Ok(());
    };

    let existing = match tokio::fs::metadata(path).await {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
        Err(e) => return Err(e.into()),
    };

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    if existing > 0 {
        file.write_all(b"\n").await?;
    }
    file.write_all(text.as_bytes()).await?;
    file.flush().await?;

    debug!(path = %path.display(), bytes = text.len(), "wrote generated configuration");
    Ok(())
}
