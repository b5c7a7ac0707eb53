//! # gridq-client
//!
//! The cached consumption layer over [`gridq_core`]: one flow serves the
//! server-rendered seed, client re-fetches, and filter-option lookups.
//!
//! ```text
//! TableBinding + TableState → compile → QueryCache → Transport → parse → rows
//! ```
//!
//! ```rust,ignore
//! use gridq_client::TableClient;
//!
//! let client = TableClient::new(transport);
//! let data = client.fetch(&binding, &state).await?;
//! ```

pub mod cache;
pub mod client;
pub mod debounce;
pub mod options;
pub mod transport;

pub use cache::{CacheConfig, CacheStats, QueryCache};
pub use client::{TableClient, TableClientBuilder};
pub use debounce::Debouncer;
pub use options::OptionsResolver;
pub use transport::{Transport, TransportError};
