//! Print command implementation
//!
//! Renders the selected catalog queries and formats them for output.

use ujquery_core::catalog::NamedQuery;
use ujquery_core::{K8sAuditFieldSet, QueryDesc, machine_print_queries, pretty_print_queries};

use crate::config::Format;
use crate::error::CliError;

/// Renders `queries` over `index` and returns the formatted output
pub fn render(
    queries: &[&NamedQuery],
    index: &str,
    registry: &K8sAuditFieldSet,
    format: Format,
) -> Result<String, CliError> {
    let descs = queries
        .iter()
        .map(|q| q.describe(index, registry))
        .collect::<Result<Vec<QueryDesc>, _>>()?;

    tracing::debug!(count = descs.len(), %index, %format, "rendered queries");

    Ok(match format {
        Format::Pretty => {
            let mut out = pretty_print_queries(&descs);
            if !out.is_empty() {
                out.push('\n');
            }
            out
        }
        Format::Machine => machine_print_queries(&descs),
    })
}

/// Run the print command
pub fn run(
    queries: &[&NamedQuery],
    index: &str,
    registry: &K8sAuditFieldSet,
    format: Format,
) -> Result<(), CliError> {
    use std::io::Write;

    let out = render(queries, index, registry, format)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(out.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| CliError::IoError(e.to_string()))
}
