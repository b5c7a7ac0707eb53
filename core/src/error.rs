//! Error types for gridq.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The binding names no usable data source.
    #[error("table binding has no usable data source")]
    Unconfigured,

    /// Network or non-2xx failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server envelope carried `success: false`.
    #[error("query failed: {0}")]
    Envelope(String),
}

/// Result type alias for gridq operations.
pub type QueryResult<T> = Result<T, QueryError>;
