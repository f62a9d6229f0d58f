//! # ujquery
//!
//! Generates log-search queries that turn K8s API audit records into
//! structured user journey events.
//!
//! ## Quick Start
//!
//! ```rust
//! use ujquery::prelude::*;
//!
//! # fn main() -> ujquery::Result<()> {
//! let query = UserJourneyQuery::user_journey("my_index")
//!     .for_api(K8sApiId::new("tekton.dev", "pipelineruns"))
//!     .with_predicate(r#"verb=update "objectRef.subresource"="status""#)
//!     .with_filter(StatusConditionFilter::new("Succeeded").with_statuses(["True"]))
//!     .with_event_expr(r#""PipelineRun succeeded""#)
//!     .with_fields(["status_reason", "userId"])
//!     .render()?;
//!
//! assert!(query.starts_with(r#"search index="my_index" log_type=audit"#));
//! assert!(query.ends_with("|fields - _*"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! | Layer      | Type                  | Overrides            |
//! |------------|-----------------------|----------------------|
//! | Global     | `K8sAuditFieldSet`    | -                    |
//! | Per API    | `K8sAuditFieldSet`    | global               |
//! | Filters    | `Filter::field_set`   | per API, earlier filters |

pub use ujquery_core::*;

/// Everything needed to build and print queries.
pub mod prelude {
    pub use ujquery_core::catalog::{self, QueryDesc};
    pub use ujquery_core::journey::{self, default_registry};
    pub use ujquery_core::{
        FieldSet, FieldSpec, Filter, K8sApiId, K8sAuditFieldSet, QueryGenError,
        StatusConditionFilter, TektonTaskResultFilter, UserJourneyQuery, machine_print_queries,
        pretty_print_queries,
    };
}
