use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-fatal integrity problem found in a source graph while copying it.
///
/// Warnings describe data that was already broken before the operation began.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    /// Relationship endpoint outside the source model; the relationship was skipped
    DanglingEndpoint {
        relationship_id: String,
        missing_element_id: String,
    },
    /// View referenced an element outside the source model; the reference was dropped
    DroppedViewReference { view_id: String, element_id: String },
    /// Element type no longer in the metamodel; the element was copied as-is
    UnknownElementType { element_id: String, type_id: String },
    /// Relationship type no longer in the metamodel; the relationship was copied as-is
    UnknownRelationshipType {
        relationship_id: String,
        relationship_type_id: String,
    },
    /// Version label already used elsewhere in the same lineage
    DuplicateVersionLabel { label: String, existing_model_id: String },
}

impl IntegrityWarning {
    pub fn code(&self) -> &'static str {
        match self {
            IntegrityWarning::DanglingEndpoint { .. } => "DANGLING_ENDPOINT",
            IntegrityWarning::DroppedViewReference { .. } => "DROPPED_VIEW_REFERENCE",
            IntegrityWarning::UnknownElementType { .. } => "UNKNOWN_ELEMENT_TYPE",
            IntegrityWarning::UnknownRelationshipType { .. } => "UNKNOWN_RELATIONSHIP_TYPE",
            IntegrityWarning::DuplicateVersionLabel { .. } => "DUPLICATE_VERSION_LABEL",
        }
    }
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityWarning::DanglingEndpoint {
                relationship_id,
                missing_element_id,
            } => write!(
                f,
                "relationship {} skipped: endpoint {} is not in the source model",
                relationship_id, missing_element_id
            ),
            IntegrityWarning::DroppedViewReference {
                view_id,
                element_id,
            } => write!(
                f,
                "view {} dropped stale reference to element {}",
                view_id, element_id
            ),
            IntegrityWarning::UnknownElementType {
                element_id,
                type_id,
            } => write!(
                f,
                "element {} references unknown element type {}",
                element_id, type_id
            ),
            IntegrityWarning::UnknownRelationshipType {
                relationship_id,
                relationship_type_id,
            } => write!(
                f,
                "relationship {} references unknown relationship type {}",
                relationship_id, relationship_type_id
            ),
            IntegrityWarning::DuplicateVersionLabel {
                label,
                existing_model_id,
            } => write!(
                f,
                "version label '{}' is already used by model {} in this lineage",
                label, existing_model_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display_and_code() {
        let warning = IntegrityWarning::DroppedViewReference {
            view_id: "v1".to_string(),
            element_id: "e9".to_string(),
        };
        assert_eq!(warning.to_string(), "view v1 dropped stale reference to element e9");
        assert_eq!(warning.code(), "DROPPED_VIEW_REFERENCE");
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = IntegrityWarning::DanglingEndpoint {
            relationship_id: "r1".to_string(),
            missing_element_id: "x".to_string(),
        };
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(value["kind"], "dangling_endpoint");
        assert_eq!(value["relationship_id"], "r1");
    }
}
