//! ujquery CLI - prints user journey queries for K8s API audit logs
//!
//! The binary renders the query catalog against the user journey field set
//! and prints it for humans or, with `-0`, as NUL-separated query text.
//!
//! # Configuration
//!
//! An optional `ujquery.toml` in the working directory (or `--config PATH`):
//!
//! ```toml
//! index = "federated:rh_rhtap_stage_audit"
//! format = "machine"
//! queries = ["application", "component"]
//!
//! [fields.userId]
//! src_fields = ["user.username"]
//! sub_obj = "properties"
//! ```
//!
//! Command-line flags and `UJQUERY_INDEX` take precedence over the file.
//!
//! # Commands
//!
//! - `ujquery` - Print every configured query
//! - `ujquery --query NAME` - Print only the named queries
//! - `ujquery list` - List query names and titles

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use config::{Config, Error as ConfigError, Format};
pub use error::CliError;
