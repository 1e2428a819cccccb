//! Palette drag payloads.
//!
//! Decoding is kept apart from dispatch: a payload only names a tool, and the editor routes it
//! through the same operations as every other command.

use pedigree_core::{IndividualId, Sex};
use serde::{Deserialize, Serialize};

pub const TOOL_MIME: &str = "application/pedigree-tool";

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("unsupported drag data type: {0}")]
    UnsupportedMime(String),
    #[error("malformed tool payload")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ToolPayload {
    Individual {
        #[serde(default)]
        sex: Option<Sex>,
    },
    LinkPartner,
    AddParents,
    LinkChild,
    LinkSibling,
}

impl ToolPayload {
    pub fn decode(mime: &str, data: &str) -> Result<Self, PayloadError> {
        if mime.trim() != TOOL_MIME {
            return Err(PayloadError::UnsupportedMime(mime.to_string()));
        }
        Ok(serde_json::from_str(data)?)
    }

    pub fn encode(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Link tools need a node under the pointer; only `Individual` works on free space.
    pub fn needs_node(&self) -> bool {
        !matches!(self, Self::Individual { .. })
    }
}

/// Where a payload landed, in SVG coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTarget {
    pub x: f64,
    pub y: f64,
    /// The node within hit distance of the drop point, if any.
    pub node: Option<IndividualId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Individuals created by the drop, in creation order.
    Created(Vec<IndividualId>),
    /// A link tool was dropped on free space.
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_kebab_case_tool_names() {
        let p = ToolPayload::decode(TOOL_MIME, r#"{"type":"link-partner"}"#).unwrap();
        assert_eq!(p, ToolPayload::LinkPartner);
        let p = ToolPayload::decode(TOOL_MIME, r#"{"type":"individual","sex":"F"}"#).unwrap();
        assert_eq!(p, ToolPayload::Individual { sex: Some(Sex::F) });
        let p = ToolPayload::decode(TOOL_MIME, r#"{"type":"individual"}"#).unwrap();
        assert_eq!(p, ToolPayload::Individual { sex: None });
    }

    #[test]
    fn rejects_foreign_mime_and_unknown_tools() {
        assert!(matches!(
            ToolPayload::decode("text/plain", r#"{"type":"link-child"}"#),
            Err(PayloadError::UnsupportedMime(_))
        ));
        assert!(matches!(
            ToolPayload::decode(TOOL_MIME, r#"{"type":"pregnancy"}"#),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn encode_matches_decode() {
        let text = ToolPayload::AddParents.encode().unwrap();
        assert_eq!(text, r#"{"type":"add-parents"}"#);
    }
}
