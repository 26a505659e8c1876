use bp_core::EdgeStyle;

/// Marker that may sit between a source id and its arrow to carry an inline
/// label, as in `A -- "text" --> B`.
const INLINE_LABEL_MARKER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeDecl<'a> {
    pub(crate) source: &'a str,
    pub(crate) target: &'a str,
    pub(crate) label: Option<&'a str>,
    pub(crate) style: EdgeStyle,
}

#[must_use]
pub(crate) fn contains_arrow(line: &str) -> bool {
    line.contains(EdgeStyle::Solid.arrow_token()) || line.contains(EdgeStyle::Dashed.arrow_token())
}

/// The dotted arrow wins whenever it appears anywhere on the line.
#[must_use]
pub(crate) fn detect_style(line: &str) -> EdgeStyle {
    if line.contains(EdgeStyle::Dashed.arrow_token()) {
        EdgeStyle::Dashed
    } else {
        EdgeStyle::Solid
    }
}

/// Parses a line containing an arrow token. Empty endpoints are kept as-is.
pub(crate) fn parse_edge_line(line: &str) -> Option<EdgeDecl<'_>> {
    let style = detect_style(line);
    let (left, right) = line.split_once(style.arrow_token())?;

    let source = left
        .split_once(INLINE_LABEL_MARKER)
        .map_or(left, |(head, _)| head)
        .trim();
    let target = right.split_whitespace().next().unwrap_or_default();

    Some(EdgeDecl {
        source,
        target,
        label: quoted_label(line),
        style,
    })
}

/// Text between the first and second `"`; nothing when the pair is incomplete.
fn quoted_label(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once('"')?;
    let (label, _) = rest.split_once('"')?;
    Some(label)
}
