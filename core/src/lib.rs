//! Declarative table-query compiler and result resolver.
//!
//! Build data requests as typed values, not strings. A persisted
//! [`TableBinding`](binding::TableBinding) plus the live
//! [`TableState`](state::TableState) of a rendered table compiles into a
//! [`QueryRequest`](request::QueryRequest) against one of two backend
//! dialects, and raw JSON responses parse back into rows and a total.
//!
//! ```ignore
//! use gridq_core::prelude::*;
//!
//! let request = compile(&binding, &TableState::default());
//! let data = parse_response(&raw_json)?;
//! ```

pub mod binding;
pub mod compile;
pub mod error;
pub mod key;
pub mod options;
pub mod request;
pub mod resolve;
pub mod state;

pub use compile::compile;

pub mod prelude {
    pub use crate::binding::*;
    pub use crate::compile::compile;
    pub use crate::error::*;
    pub use crate::key::QueryKey;
    pub use crate::options::{dependency_signature, normalize_options, options_request};
    pub use crate::request::*;
    pub use crate::resolve::{TableData, cell_value, parse_response};
    pub use crate::state::TableState;
}
