//! Blueprint repository on top of a [`DocumentStore`].

use bp_core::{Blueprint, GraphEdge, GraphNode, Metadata, PLACEHOLDER_TITLE};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{DocumentStore, ID_FIELD, StoreError};

pub const BLUEPRINT_COLLECTION: &str = "blueprint";

/// Stored shape, lenient about anything optional. Unknown fields such as
/// `_id` and the timestamps are dropped by serde.
#[derive(Debug, Deserialize)]
struct BlueprintRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    raw_text: Option<String>,
    #[serde(default)]
    nodes: Option<Vec<GraphNode>>,
    #[serde(default)]
    edges: Option<Vec<GraphEdge>>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl From<BlueprintRecord> for Blueprint {
    fn from(record: BlueprintRecord) -> Self {
        Self {
            title: record
                .title
                .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
            raw_text: record.raw_text.unwrap_or_default(),
            nodes: record.nodes.unwrap_or_default(),
            edges: record.edges.unwrap_or_default(),
            metadata: record.metadata.unwrap_or_default(),
        }
    }
}

/// Persist `blueprint` unchanged and return its new id.
pub fn save_blueprint<S>(store: &S, blueprint: &Blueprint) -> Result<String, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let document = serde_json::to_value(blueprint).map_err(StoreError::Serialize)?;
    let id = store.create_document(BLUEPRINT_COLLECTION, document)?;
    info!(
        "Saved blueprint {id} ({} nodes, {} edges) to {} store",
        blueprint.nodes.len(),
        blueprint.edges.len(),
        store.backend()
    );
    Ok(id)
}

/// Every stored blueprint, oldest first.
pub fn list_blueprints<S>(store: &S) -> Result<Vec<Blueprint>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    store
        .list_documents(BLUEPRINT_COLLECTION)?
        .iter()
        .map(blueprint_from_record)
        .collect()
}

pub fn blueprint_from_record(record: &Value) -> Result<Blueprint, StoreError> {
    let location = match record.get(ID_FIELD).and_then(Value::as_str) {
        Some(id) => format!("{BLUEPRINT_COLLECTION}/{id}"),
        None => BLUEPRINT_COLLECTION.to_string(),
    };
    BlueprintRecord::deserialize(record)
        .map(Blueprint::from)
        .map_err(|error| StoreError::decode(location, error))
}

#[cfg(test)]
mod tests {
    use bp_core::{Blueprint, EdgeStyle, GraphEdge, GraphNode, PLACEHOLDER_TITLE};
    use serde_json::json;

    use super::{blueprint_from_record, list_blueprints, save_blueprint};
    use crate::{DocumentStore, MemoryStore, StoreError};

    fn sample() -> Blueprint {
        let mut blueprint = Blueprint::empty("Holding structure", "mordo\ngraph TD\nA --> B");
        blueprint.nodes = vec![GraphNode::new("A", "Acme"), GraphNode::implicit("B")];
        blueprint.edges = vec![GraphEdge {
            source: "A".to_string(),
            target: "B".to_string(),
            label: Some("loan".to_string()),
            style: EdgeStyle::Dashed,
        }];
        blueprint
            .metadata
            .insert("source".to_string(), json!("chat"));
        blueprint
    }

    #[test]
    fn saved_blueprint_lists_back_equal() {
        let store = MemoryStore::new();
        let blueprint = sample();
        let id = save_blueprint(&store, &blueprint).expect("save");
        assert!(!id.is_empty());

        let listed = list_blueprints(&store).expect("list");
        assert_eq!(listed, vec![blueprint]);
    }

    #[test]
    fn works_through_trait_objects() {
        let store: Box<dyn DocumentStore> = Box::new(MemoryStore::new());
        save_blueprint(store.as_ref(), &sample()).expect("save");
        assert_eq!(list_blueprints(store.as_ref()).expect("list").len(), 1);
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let blueprint = blueprint_from_record(&json!({
            "_id": "abc",
            "created_at": "2026-01-01T00:00:00Z",
            "nodes": [{"id": "A", "label": "Acme"}],
            "edges": [{"source": "A", "target": "B"}]
        }))
        .expect("decode");

        assert_eq!(blueprint.title, PLACEHOLDER_TITLE);
        assert_eq!(blueprint.raw_text, "");
        assert!(blueprint.metadata.is_empty());
        assert_eq!(blueprint.nodes, vec![GraphNode::new("A", "Acme")]);
        assert_eq!(blueprint.edges[0].style, EdgeStyle::Solid);
        assert_eq!(blueprint.edges[0].label, None);
    }

    #[test]
    fn null_fields_are_treated_as_missing() {
        let blueprint =
            blueprint_from_record(&json!({"title": null, "metadata": null})).expect("decode");
        assert_eq!(blueprint.title, PLACEHOLDER_TITLE);
        assert!(blueprint.nodes.is_empty());
        assert!(blueprint.edges.is_empty());
    }

    #[test]
    fn malformed_node_is_a_decode_error_naming_the_record() {
        let error = blueprint_from_record(&json!({"_id": "abc", "nodes": [{"id": "A"}]}))
            .expect_err("label is required");
        let StoreError::Decode { location, .. } = error else {
            panic!("expected decode error");
        };
        assert_eq!(location, "blueprint/abc");
    }
}
