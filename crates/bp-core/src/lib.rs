#![forbid(unsafe_code)]

//! Shared model for Blueprint graphs.
//!
//! A [`Blueprint`] is the aggregate produced by the parser and handed to the
//! store: an ordered node list, an ordered edge list, the verbatim input and a
//! free-form metadata map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Leading keyword that authorizes parsing.
pub const DEFAULT_SENTINEL: &str = "mordo";

/// Title given to freshly parsed blueprints.
pub const DEFAULT_TITLE: &str = "Blueprint z rozmowy";

/// Title used for stored records that carry none.
pub const PLACEHOLDER_TITLE: &str = "Blueprint";

pub type Metadata = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dashed,
}

impl EdgeStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
        }
    }

    /// Arrow token that produces this style in the source text.
    #[must_use]
    pub const fn arrow_token(self) -> &'static str {
        match self {
            Self::Solid => "-->",
            Self::Dashed => "-.->",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// Reserved for subgraph membership; the parser never fills it.
    #[serde(default)]
    pub group: Option<String>,
}

impl GraphNode {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            group: None,
        }
    }

    /// A node known only from an edge endpoint: its label is its id.
    #[must_use]
    pub fn implicit(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            group: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Blueprint {
    pub title: String,
    pub raw_text: String,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Blueprint {
    #[must_use]
    pub fn empty(title: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            raw_text: raw_text.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Replace the title, keeping everything else.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BlueprintErrorCode {
    #[default]
    InvalidInput,
}

impl BlueprintErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "blueprint/error/invalid-input",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum BlueprintError {
    /// The text does not start with the sentinel keyword.
    #[error("{message}")]
    InvalidInput { message: String },
}

impl BlueprintError {
    #[must_use]
    pub fn missing_sentinel(sentinel: &str) -> Self {
        Self::InvalidInput {
            message: format!("Wiadomość musi zaczynać się od '{sentinel}'"),
        }
    }

    #[must_use]
    pub const fn code(&self) -> BlueprintErrorCode {
        match self {
            Self::InvalidInput { .. } => BlueprintErrorCode::InvalidInput,
        }
    }

    /// Whether the failure is the caller's fault rather than the server's.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

/// Why a line inside the graph block was dropped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SkipReason {
    /// A `[` with no `]` after it on a node line.
    #[default]
    UnclosedBracket,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnclosedBracket => "blueprint/skip/unclosed-bracket",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SkippedLine {
    /// 1-based line number in the input text.
    pub line: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        Blueprint, BlueprintError, BlueprintErrorCode, EdgeStyle, GraphEdge, GraphNode,
        SkipReason,
    };

    #[test]
    fn edge_style_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(EdgeStyle::Dashed).expect("serialize style"),
            json!("dashed")
        );
        assert_eq!(EdgeStyle::Solid.as_str(), "solid");
        assert_eq!(EdgeStyle::Dashed.arrow_token(), "-.->");
    }

    #[test]
    fn implicit_node_uses_id_as_label() {
        let node = GraphNode::implicit("FB");
        assert_eq!(node.id, "FB");
        assert_eq!(node.label, "FB");
        assert_eq!(node.group, None);
    }

    #[test]
    fn blueprint_json_shape_matches_wire_contract() {
        let mut blueprint = Blueprint::empty("t", "mordo");
        blueprint.nodes.push(GraphNode::new("A", "Acme Corp"));
        blueprint.edges.push(GraphEdge {
            source: "A".to_string(),
            target: "B".to_string(),
            label: None,
            style: EdgeStyle::Solid,
        });

        let value = serde_json::to_value(&blueprint).expect("serialize blueprint");
        assert_eq!(
            value,
            json!({
                "title": "t",
                "raw_text": "mordo",
                "nodes": [{"id": "A", "label": "Acme Corp", "group": null}],
                "edges": [{"source": "A", "target": "B", "label": null, "style": "solid"}],
                "metadata": {}
            })
        );
    }

    #[test]
    fn edge_decodes_with_default_style_and_label() {
        let edge: GraphEdge =
            serde_json::from_value(json!({"source": "A", "target": "B"})).expect("decode edge");
        assert_eq!(edge.style, EdgeStyle::Solid);
        assert_eq!(edge.label, None);
    }

    #[test]
    fn with_title_keeps_graph() {
        let mut blueprint = Blueprint::empty("old", "mordo");
        blueprint.nodes.push(GraphNode::implicit("A"));
        let renamed = blueprint.with_title("new");
        assert_eq!(renamed.title, "new");
        assert!(renamed.find_node("A").is_some());
        assert!(!renamed.is_empty());
    }

    #[test]
    fn missing_sentinel_is_client_error() {
        let error = BlueprintError::missing_sentinel("mordo");
        assert!(error.is_client_error());
        assert_eq!(error.code(), BlueprintErrorCode::InvalidInput);
        assert_eq!(error.to_string(), "Wiadomość musi zaczynać się od 'mordo'");
        assert_eq!(error.code().as_str(), "blueprint/error/invalid-input");
    }

    #[test]
    fn skip_reason_codes_are_namespaced() {
        assert_eq!(
            SkipReason::UnclosedBracket.as_str(),
            "blueprint/skip/unclosed-bracket"
        );
    }
}
