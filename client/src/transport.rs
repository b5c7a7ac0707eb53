//! Transport seam: the single async boundary.
//!
//! Network dispatch is an opaque external capability. The core compiles
//! requests and interprets responses for exactly one attempt; retry and
//! backoff belong to whoever owns the transport.

use futures::future::BoxFuture;
use gridq_core::error::QueryError;
use gridq_core::request::QueryRequest;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {0}")]
    Status(u16),
}

impl From<TransportError> for QueryError {
    fn from(err: TransportError) -> Self {
        QueryError::Transport(err.to_string())
    }
}

/// Performs one attempt of a compiled request and returns the raw response
/// body for the resolver to parse.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: QueryRequest,
    ) -> BoxFuture<'_, Result<serde_json::Value, TransportError>>;
}
