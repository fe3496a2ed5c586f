//! Error types for the traceability core
//!
//! Parsing, classification and analysis never fail on record content; the
//! only errors here come from callers handing in malformed arguments.

/// Errors raised by core operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// String is not an identifier token (alnum, underscore, hyphen)
    #[error("invalid record identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Link type key not one of the recognised relation keys
    #[error("unknown link type: '{0}'")]
    UnknownLinkType(String),

    /// A category filter named categories absent from the graph
    #[error("unknown categories in filter: {}", .0.join(", "))]
    UnknownCategory(Vec<String>),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
