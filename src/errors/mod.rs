//! Domain error types for the model graph engine
//!
//! Two families live here:
//!
//! - **GraphError**: failures that abort the current operation and roll back
//!   its transaction (`NotFound`, `Conflict`, `Timeout`, store failures).
//! - **IntegrityWarning**: pre-existing data problems discovered while copying
//!   a graph. They are collected and returned next to a successful result and
//!   never fail the operation.
//!
//! # Examples
//!
//! ```rust
//! use eagraph::errors::{EntityKind, GraphError};
//!
//! let err = GraphError::not_found(EntityKind::Model, "m-1");
//! assert!(err.is_not_found());
//! assert_eq!(err.error_code(), "NOT_FOUND");
//! ```

pub mod graph;
pub mod warning;

pub use graph::{EntityKind, GraphError};
pub use warning::IntegrityWarning;

/// Result type alias for engine operations
pub type GraphResult<T> = Result<T, GraphError>;
