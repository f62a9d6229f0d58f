//! Tracing utilities for query generation observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the rendered query text and the
/// number of requested output fields.
///
/// ```ignore
/// ujq_trace_query!(&query, fields.len());
/// ```
#[macro_export]
macro_rules! ujq_trace_query {
    ($query:expr, $field_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(query = %$query, fields = $field_count, "ujquery.render");
    };
}

/// Emit a warn-level tracing event for a requested field missing from the
/// effective field set.
///
/// ```ignore
/// ujq_trace_unknown_field!(field);
/// ```
#[macro_export]
macro_rules! ujq_trace_unknown_field {
    ($field:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(field = %$field, "ujquery.unknown_field");
    };
}
