//! Printing one or more queries for humans or for other programs.

use crate::catalog::QueryDesc;

/// Queries at least this long are split at every stage when pretty printed
const LONG_QUERY: usize = 60;

const INDENT: &str = "    ";

/// Prints `queries` in a human-readable format: each title underlined,
/// followed by the indented query.
pub fn pretty_print_queries(queries: &[QueryDesc]) -> String {
    let mut out = String::new();
    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&query.title);
        out.push('\n');
        out.push_str(&"-".repeat(query.title.len()));
        out.push('\n');
        pretty_print_query(&mut out, &query.query);
    }
    out
}

fn pretty_print_query(out: &mut String, query: &str) {
    if query.len() < LONG_QUERY {
        out.push_str(INDENT);
        out.push_str(query);
        return;
    }
    for (i, line) in query.split('|').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(INDENT);
        if i > 0 {
            out.push('|');
        }
        out.push_str(line);
    }
}

/// Prints `queries` in a compact, machine-readable format where queries are
/// separated by NUL (`"\0"`) characters.
pub fn machine_print_queries(queries: &[QueryDesc]) -> String {
    let mut out = String::new();
    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            out.push('\0');
        }
        out.push_str(&query.query);
    }
    out
}
