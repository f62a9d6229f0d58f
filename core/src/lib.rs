//! Compiles declarative field mappings and search predicates into log-search
//! queries extracting user journey events from K8s API audit records.

pub mod builder;
pub mod catalog;
pub mod error;
pub mod fieldset;
pub mod filter;
pub mod helpers;
pub mod journey;
pub mod print;
pub mod registry;
pub mod tracing;

// Re-export key types and traits
pub use builder::UserJourneyQuery;
pub use catalog::{CATALOG, DEFAULT_INDEX, NamedQuery, QueryDesc};
pub use error::{QueryGenError, Result};
pub use fieldset::{EXCLUDE_FIELDS_CMD, FieldSet, FieldSpec, Resolution};
pub use filter::{Filter, StatusConditionFilter, StatusConditionOpts, TektonTaskResultFilter};
pub use journey::{COMMON_FIELDS, default_registry};
pub use print::{machine_print_queries, pretty_print_queries};
pub use registry::{K8sApiId, K8sAuditFieldSet};
