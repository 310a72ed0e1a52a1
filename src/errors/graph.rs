//! Errors that abort an engine operation.
//!
//! Every variant returned from a public operation means the surrounding
//! transaction was rolled back.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of row an error or warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Model,
    Element,
    Relationship,
    View,
    ElementType,
    RelationshipType,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Model => "Model",
            EntityKind::Element => "Element",
            EntityKind::Relationship => "Relationship",
            EntityKind::View => "View",
            EntityKind::ElementType => "Element type",
            EntityKind::RelationshipType => "Relationship type",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum GraphError {
    /// Referenced row is absent
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    /// Non-cascading delete blocked by dependents
    #[error("{entity} '{id}' cannot be deleted: {reason}")]
    Conflict {
        entity: EntityKind,
        id: String,
        reason: String,
    },

    /// Operation exceeded the caller-supplied deadline and was rolled back
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Underlying store or transaction failure
    #[error("Store error: {0}")]
    Store(#[from] sea_orm::DbErr),

    /// Identifier generation could not produce a fresh id
    #[error("Identifier allocation failed after {attempts} attempts")]
    IdAllocation { attempts: usize },

    /// A write would break the graph invariant
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

impl GraphError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        GraphError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(entity: EntityKind, id: impl Into<String>, reason: impl Into<String>) -> Self {
        GraphError::Conflict {
            entity,
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, GraphError::Conflict { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GraphError::Timeout(_))
    }

    /// Store-class failures: transport, transaction, or id allocation
    pub fn is_store_error(&self) -> bool {
        matches!(self, GraphError::Store(_) | GraphError::IdAllocation { .. })
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::NotFound { .. } => "NOT_FOUND",
            GraphError::Conflict { .. } => "CONFLICT",
            GraphError::Timeout(_) => "TIMEOUT",
            GraphError::Store(_) | GraphError::IdAllocation { .. } => "STORE_ERROR",
            GraphError::InvalidReference(_) => "VALIDATION_FAILED",
        }
    }
}
