//! List command implementation
//!
//! Shows the names and titles of the catalog queries.

use ujquery_core::catalog::NamedQuery;

use crate::output;

/// Formats one line per query: the selection name, then its title
pub fn lines(queries: &[&NamedQuery]) -> Vec<String> {
    let width = queries.iter().map(|q| q.name.len()).max().unwrap_or(0);
    queries
        .iter()
        .map(|q| {
            let name = format!("{:width$}", q.name);
            format!("  {}  {}", output::label(&name), q.title)
        })
        .collect()
}

/// Run the list command
pub fn run(queries: &[&NamedQuery]) {
    println!("{}", output::heading("User journey queries"));
    println!();
    for line in lines(queries) {
        println!("{line}");
    }
    println!();
    println!("{}", output::muted(&format!("{} query(s)", queries.len())));
}
