#![no_main]

use bp_parser::{ParseOptions, parse_with_report};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    let input = format!("mordo\ngraph TD\n{body}");
    let Ok(outcome) = parse_with_report(&input, &ParseOptions::default()) else {
        panic!("sentinel-prefixed input must parse");
    };

    let mut ids: Vec<&str> = outcome
        .blueprint
        .nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total, "node ids must be unique");

    for edge in &outcome.blueprint.edges {
        assert!(outcome.blueprint.find_node(&edge.source).is_some());
        assert!(outcome.blueprint.find_node(&edge.target).is_some());
    }

    let _ = serde_json::to_string(&outcome.blueprint);
});
