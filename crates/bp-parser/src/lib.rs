#![forbid(unsafe_code)]

//! Extracts a [`Blueprint`] graph from a Mermaid-style `graph` block embedded
//! in free-form text.
//!
//! The accepted grammar is deliberately small: `id[label]` node declarations,
//! `-->` (solid) and `-.->` (dashed) edges with an optional quoted label, and
//! inert `subgraph` / `end` markers. Lines that do not fit are dropped.

mod block;
mod builder;
mod classify;
mod edge;
mod gate;
mod node_table;

use bp_core::{Blueprint, BlueprintError, DEFAULT_SENTINEL, DEFAULT_TITLE, SkippedLine};
use serde::Serialize;
use serde_json::json;

use crate::block::{BlockState, split_lines};
use crate::builder::BlueprintBuilder;
use crate::classify::classify_line;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keyword the text must start with (case-insensitive).
    pub sentinel: String,
    /// Title assigned to the parsed blueprint.
    pub title: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// What the scanner saw besides the graph itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParseReport {
    /// 1-based line of the `graph ` declaration, if any.
    pub block_line: Option<usize>,
    /// Raw `subgraph` identifiers in the order they were opened.
    pub groups: Vec<String>,
    /// Group still open when the input ended.
    pub open_group: Option<String>,
    pub explicit_node_count: usize,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub blueprint: Blueprint,
    pub report: ParseReport,
}

/// Parse with the default sentinel and title.
pub fn parse(text: &str) -> Result<Blueprint, BlueprintError> {
    parse_with_options(text, &ParseOptions::default())
}

pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Blueprint, BlueprintError> {
    parse_with_report(text, options).map(|outcome| outcome.blueprint)
}

/// Parse and keep the scanner's report.
///
/// Fails only when the sentinel gate rejects the text. Missing `graph `
/// declarations and malformed lines still produce a (possibly empty) graph.
pub fn parse_with_report(
    text: &str,
    options: &ParseOptions,
) -> Result<ParseOutcome, BlueprintError> {
    gate::check_sentinel(text, &options.sentinel)?;

    let mut block = BlockState::default();
    let mut builder = BlueprintBuilder::default();

    for (index, line) in split_lines(text).enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if !block.advance(line_number, trimmed) {
            continue;
        }
        builder.apply(line_number, trimmed, classify_line(trimmed));
    }

    Ok(builder.finish(&options.title, text, block))
}

#[must_use]
pub fn parse_evidence_json(outcome: &ParseOutcome) -> String {
    json!({
        "title": outcome.blueprint.title,
        "block_line": outcome.report.block_line,
        "node_count": outcome.blueprint.nodes.len(),
        "explicit_node_count": outcome.report.explicit_node_count,
        "edge_count": outcome.blueprint.edges.len(),
        "group_count": outcome.report.groups.len(),
        "groups": outcome.report.groups,
        "skipped_count": outcome.report.skipped.len(),
        "skipped": outcome.report.skipped,
    })
    .to_string()
}
