use bp_core::{Blueprint, GraphEdge, SkipReason, SkippedLine};
use tracing::{debug, trace};

use crate::block::BlockState;
use crate::classify::LineKind;
use crate::node_table::NodeTable;
use crate::{ParseOutcome, ParseReport};

/// Per-call accumulator. Everything a parse touches lives here.
#[derive(Debug, Default)]
pub(crate) struct BlueprintBuilder {
    nodes: NodeTable,
    edges: Vec<GraphEdge>,
    groups: Vec<String>,
    active_group: Option<String>,
    skipped: Vec<SkippedLine>,
}

impl BlueprintBuilder {
    pub(crate) fn apply(&mut self, line_number: usize, trimmed: &str, kind: LineKind<'_>) {
        match kind {
            LineKind::GroupOpen(group) => {
                self.groups.push(group.to_string());
                self.active_group = Some(group.to_string());
            }
            LineKind::GroupClose => {
                self.active_group = None;
            }
            LineKind::Node(node) => {
                self.nodes.declare(node.id, node.label);
            }
            LineKind::Edge(edge) => {
                trace!(
                    "Line {line_number}: {} edge {:?} -> {:?}",
                    edge.style.as_str(),
                    edge.source,
                    edge.target
                );
                self.edges.push(GraphEdge {
                    source: edge.source.to_string(),
                    target: edge.target.to_string(),
                    label: edge.label.map(str::to_string),
                    style: edge.style,
                });
                self.nodes.reference(edge.source);
                self.nodes.reference(edge.target);
            }
            LineKind::Malformed(reason) => self.skip(line_number, trimmed, reason),
            LineKind::Ignored => {}
        }
    }

    pub(crate) fn finish(self, title: &str, raw_text: &str, block: BlockState) -> ParseOutcome {
        let report = ParseReport {
            block_line: block.declared_at(),
            groups: self.groups,
            open_group: self.active_group,
            explicit_node_count: self.nodes.explicit_count(),
            skipped: self.skipped,
        };

        debug!(
            "Parsed blueprint: block_line={:?}, nodes={}, edges={}, skipped={}",
            report.block_line,
            self.nodes.len(),
            self.edges.len(),
            report.skipped.len()
        );

        let mut blueprint = Blueprint::empty(title, raw_text);
        blueprint.nodes = self.nodes.into_nodes();
        blueprint.edges = self.edges;

        ParseOutcome { blueprint, report }
    }

    fn skip(&mut self, line: usize, text: &str, reason: SkipReason) {
        debug!("Line {line}: skipped ({}): {text}", reason.as_str());
        self.skipped.push(SkippedLine {
            line,
            text: text.to_string(),
            reason,
        });
    }
}
