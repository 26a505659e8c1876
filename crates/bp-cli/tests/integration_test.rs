//! Integration tests for the Blueprint pipeline.
//!
//! These tests drive a message through parsing, persistence and listing the
//! way the CLI and the HTTP API do.

use bp_core::{Blueprint, EdgeStyle, GraphNode};
use bp_parser::{ParseOptions, parse, parse_with_report};
use bp_store::{
    BLUEPRINT_COLLECTION, DocumentStore, FileStore, MemoryStore, list_blueprints, save_blueprint,
};
use serde_json::json;

const CHAT_MESSAGE: &str = r#"Mordo, this is how the money moves:

```mermaid
graph TD
    subgraph HK [Hong Kong]
    A[TONY HK LTD]
    B[Globex Trading]
    end
    A -- "service agreement" --> B
    B -.-> FB
    FB[Family Trust]
    C --> A
```

Let me know what you think."#;

/// The worked examples from the parser contract, end to end.
#[test]
fn contract_examples() {
    let first = parse("mordo\ngraph TD\nA[Acme Corp]\nB[Globex]\nA --> B").expect("parse");
    assert_eq!(
        first.nodes,
        vec![GraphNode::new("A", "Acme Corp"), GraphNode::new("B", "Globex")]
    );
    assert_eq!(first.edges[0].label, None);
    assert_eq!(first.edges[0].style, EdgeStyle::Solid);

    let second = parse("mordo\ngraph TD\nA -.-> C").expect("parse");
    assert_eq!(
        second.nodes,
        vec![GraphNode::implicit("A"), GraphNode::implicit("C")]
    );
    assert_eq!(second.edges[0].style, EdgeStyle::Dashed);

    let third = parse("mordo\ngraph TD\nA -- \"loan\" --> B").expect("parse");
    assert_eq!(third.edges[0].label.as_deref(), Some("loan"));
    assert_eq!(third.edges[0].source, "A");
    assert_eq!(third.edges[0].target, "B");

    assert!(parse("hello world").is_err());

    let fifth = parse("mordo no graph here").expect("parse");
    assert!(fifth.is_empty());
}

/// A realistic chat message with a fenced block, a group and mixed edges.
#[test]
fn chat_message_with_fenced_block() {
    let outcome = parse_with_report(CHAT_MESSAGE, &ParseOptions::default()).expect("parse");
    let blueprint = &outcome.blueprint;

    let nodes: Vec<(&str, &str)> = blueprint
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node.label.as_str()))
        .collect();
    assert_eq!(
        nodes,
        vec![
            ("A", "TONY HK LTD"),
            ("B", "Globex Trading"),
            ("FB", "Family Trust"),
            ("C", "C"),
        ]
    );

    let edges: Vec<(&str, &str, Option<&str>, EdgeStyle)> = blueprint
        .edges
        .iter()
        .map(|edge| {
            (
                edge.source.as_str(),
                edge.target.as_str(),
                edge.label.as_deref(),
                edge.style,
            )
        })
        .collect();
    assert_eq!(
        edges,
        vec![
            ("A", "B", Some("service agreement"), EdgeStyle::Solid),
            ("B", "FB", None, EdgeStyle::Dashed),
            ("C", "A", None, EdgeStyle::Solid),
        ]
    );

    assert_eq!(outcome.report.block_line, Some(4));
    assert_eq!(outcome.report.groups, vec!["HK [Hong Kong]".to_string()]);
    assert!(outcome.report.skipped.is_empty());
}

/// Parsing the same text twice gives the same structure.
#[test]
fn parse_is_idempotent() {
    let first = parse(CHAT_MESSAGE).expect("parse");
    let second = parse(CHAT_MESSAGE).expect("parse");
    assert_eq!(first, second);
}

/// Concurrent parses share nothing.
#[test]
fn concurrent_parses_are_independent() {
    let handles: Vec<_> = (0..8)
        .map(|index| {
            std::thread::spawn(move || {
                let text = format!("mordo\ngraph TD\nN{index} --> M{index}");
                parse(&text).expect("parse")
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        let blueprint = handle.join().expect("parser thread");
        let ids: Vec<String> = blueprint.nodes.into_iter().map(|node| node.id).collect();
        assert_eq!(ids, vec![format!("N{index}"), format!("M{index}")]);
    }
}

/// parse -> retitle -> save -> reopen -> list on the file store.
#[test]
fn file_store_round_trip_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blueprint = parse(CHAT_MESSAGE)
        .expect("parse")
        .with_title("Hong Kong structure");

    let id = {
        let store = FileStore::open(dir.path()).expect("open store");
        save_blueprint(&store, &blueprint).expect("save")
    };
    assert!(!id.is_empty());

    let store = FileStore::open(dir.path()).expect("reopen store");
    let listed = list_blueprints(&store).expect("list");
    assert_eq!(listed, vec![blueprint]);

    let raw = store
        .list_documents(BLUEPRINT_COLLECTION)
        .expect("raw records");
    assert_eq!(raw[0]["_id"], json!(id));
}

/// Records written by other tools may miss optional fields.
#[test]
fn listing_tolerates_sparse_records() {
    let store = MemoryStore::new();
    store
        .create_document(
            BLUEPRINT_COLLECTION,
            json!({"nodes": [{"id": "A", "label": "Acme"}], "edges": []}),
        )
        .expect("create");
    save_blueprint(&store, &Blueprint::empty("Full", "mordo")).expect("save");

    let listed = list_blueprints(&store).expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].title, "Blueprint");
    assert_eq!(listed[0].raw_text, "");
    assert!(listed[0].metadata.is_empty());
    assert_eq!(listed[1].title, "Full");
}
