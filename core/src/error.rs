use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryGenError {
    /// A requested output field has no entry in the effective field set
    #[error("no field specification for: \"{0}\"")]
    UnknownField(CompactString),
}

/// Result type for query generation
pub type Result<T> = std::result::Result<T, QueryGenError>;
