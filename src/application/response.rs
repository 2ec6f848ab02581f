//! JSON payloads of the client-facing actions
//!
//! Success: `{success, node?, parentOptions}`.
//! Failure: `{success: false, message, errors?, savedNodeId?}`.

use serde::Serialize;

use crate::application::{ApplicationError, FieldError};
use crate::domain::{NodeId, ParentOptions, SaveOutcome, SavedNode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<SavedNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_options: Option<ParentOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    /// Set when the record was saved but could not be placed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_node_id: Option<NodeId>,
}

impl ActionResponse {
    pub fn saved(outcome: &SaveOutcome) -> Self {
        Self {
            success: true,
            node: Some(outcome.node.clone()),
            parent_options: Some(outcome.parent_options.clone()),
            message: None,
            errors: Vec::new(),
            saved_node_id: None,
        }
    }

    pub fn options(parent_options: &ParentOptions) -> Self {
        Self {
            success: true,
            node: None,
            parent_options: Some(parent_options.clone()),
            message: None,
            errors: Vec::new(),
            saved_node_id: None,
        }
    }

    pub fn failure(error: &ApplicationError) -> Self {
        let saved_node_id = match error {
            ApplicationError::PlacementFailed { node_id, .. } => Some(*node_id),
            _ => None,
        };
        Self {
            success: false,
            node: None,
            parent_options: None,
            message: Some(error.to_string()),
            errors: error.field_errors().to_vec(),
            saved_node_id,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
