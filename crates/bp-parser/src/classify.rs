use bp_core::SkipReason;

use crate::edge::{EdgeDecl, contains_arrow, parse_edge_line};

const GROUP_OPEN: &str = "subgraph ";
const GROUP_CLOSE: &str = "end";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeDecl<'a> {
    pub(crate) id: &'a str,
    pub(crate) label: &'a str,
}

/// What a single trimmed block line means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// Raw group identifier: everything after `subgraph `.
    GroupOpen(&'a str),
    GroupClose,
    Node(NodeDecl<'a>),
    Edge(EdgeDecl<'a>),
    Malformed(SkipReason),
    Ignored,
}

/// First matching rule wins: group open, group close, node, edge.
#[must_use]
pub(crate) fn classify_line(trimmed: &str) -> LineKind<'_> {
    if let Some(group) = trimmed.strip_prefix(GROUP_OPEN) {
        return LineKind::GroupOpen(group);
    }
    if trimmed.starts_with(GROUP_CLOSE) {
        return LineKind::GroupClose;
    }

    let has_arrow = contains_arrow(trimmed);
    if trimmed.contains('[') && trimmed.contains(']') && !has_arrow {
        return match parse_node_declaration(trimmed) {
            Ok(node) => LineKind::Node(node),
            Err(reason) => LineKind::Malformed(reason),
        };
    }
    if has_arrow {
        return parse_edge_line(trimmed).map_or(LineKind::Ignored, LineKind::Edge);
    }

    LineKind::Ignored
}

/// `id[label]`: the label ends at the first `]`, or at a nested `[` if that
/// comes sooner.
fn parse_node_declaration(line: &str) -> Result<NodeDecl<'_>, SkipReason> {
    let Some((head, rest)) = line.split_once('[') else {
        return Err(SkipReason::UnclosedBracket);
    };
    if !rest.contains(']') {
        return Err(SkipReason::UnclosedBracket);
    }
    let label_end = rest.find(['[', ']']).unwrap_or(rest.len());

    Ok(NodeDecl {
        id: head.trim(),
        label: &rest[..label_end],
    })
}

#[cfg(test)]
mod tests {
    use bp_core::{EdgeStyle, SkipReason};

    use super::{LineKind, NodeDecl, classify_line};

    fn node(id: &'static str, label: &'static str) -> LineKind<'static> {
        LineKind::Node(NodeDecl { id, label })
    }

    #[test]
    fn node_declaration() {
        assert_eq!(classify_line("A[TONY HK LTD]"), node("A", "TONY HK LTD"));
        assert_eq!(classify_line("B [Globex]"), node("B", "Globex"));
    }

    #[test]
    fn node_label_is_kept_verbatim() {
        assert_eq!(classify_line("A[ Acme ]"), node("A", " Acme "));
        assert_eq!(classify_line("A[]"), node("A", ""));
    }

    #[test]
    fn node_label_stops_at_nested_bracket() {
        assert_eq!(classify_line("A[x[y]z]"), node("A", "x"));
        assert_eq!(classify_line("A[x]trailing]"), node("A", "x"));
    }

    #[test]
    fn malformed_node_lines_are_flagged() {
        assert_eq!(
            classify_line("A]oops[x"),
            LineKind::Malformed(SkipReason::UnclosedBracket)
        );
    }

    #[test]
    fn node_without_id_keeps_empty_id() {
        assert_eq!(classify_line("[Orphan]"), node("", "Orphan"));
        assert_eq!(classify_line("  [ Spaced ]"), node("", " Spaced "));
    }

    #[test]
    fn edge_with_missing_endpoint_is_still_an_edge() {
        let LineKind::Edge(edge) = classify_line("--> B") else {
            panic!("expected edge");
        };
        assert_eq!(edge.source, "");
        assert_eq!(edge.target, "B");
    }

    #[test]
    fn bracketed_edge_line_is_an_edge_not_a_node() {
        let LineKind::Edge(edge) = classify_line("A[Acme] --> B[Globex]") else {
            panic!("expected edge");
        };
        assert_eq!(edge.source, "A[Acme]");
        assert_eq!(edge.target, "B[Globex]");
        assert_eq!(edge.style, EdgeStyle::Solid);
    }

    #[test]
    fn group_markers_take_priority() {
        assert_eq!(
            classify_line("subgraph HK [Hong Kong]"),
            LineKind::GroupOpen("HK [Hong Kong]")
        );
        assert_eq!(classify_line("end"), LineKind::GroupClose);
        assert_eq!(classify_line("subgraph"), LineKind::Ignored);
    }

    #[test]
    fn any_line_starting_with_end_closes_a_group() {
        assert_eq!(classify_line("endpoint --> X"), LineKind::GroupClose);
        assert_eq!(classify_line("ending[Label]"), LineKind::GroupClose);
    }

    #[test]
    fn irrelevant_lines_are_ignored() {
        assert_eq!(classify_line(""), LineKind::Ignored);
        assert_eq!(classify_line("just some prose"), LineKind::Ignored);
        assert_eq!(classify_line("A --- B"), LineKind::Ignored);
        assert_eq!(classify_line("A[unclosed"), LineKind::Ignored);
    }
}
