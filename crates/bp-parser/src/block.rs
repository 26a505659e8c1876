/// Literal that opens the graph block. Case-sensitive, trailing space included.
pub(crate) const GRAPH_DECLARATION: &str = "graph ";

/// Line boundaries: ASCII breaks, the file/group/record separators, NEL and the
/// Unicode line and paragraph separators. `\r\n` counts as one break.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Splits on every line boundary, keeping the rest of each line intact. A
/// trailing break does not produce a final empty line.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = (!text.is_empty()).then_some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        let Some(at) = current.find(LINE_BREAKS) else {
            rest = None;
            return Some(current);
        };
        let (line, tail) = current.split_at(at);
        let tail = tail.strip_prefix("\r\n").unwrap_or_else(|| {
            let mut chars = tail.chars();
            chars.next();
            chars.as_str()
        });
        rest = (!tail.is_empty()).then_some(tail);
        Some(line)
    })
}

#[must_use]
pub(crate) fn is_graph_declaration(trimmed: &str) -> bool {
    trimmed.starts_with(GRAPH_DECLARATION)
}

/// Tracks whether the scanner has entered the graph block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum BlockState {
    #[default]
    Searching,
    Inside {
        declared_at: usize,
    },
}

impl BlockState {
    /// Feeds one trimmed line. Returns `true` when the line is block content
    /// that the classifier should look at.
    pub(crate) fn advance(&mut self, line_number: usize, trimmed: &str) -> bool {
        if is_graph_declaration(trimmed) {
            if *self == Self::Searching {
                *self = Self::Inside {
                    declared_at: line_number,
                };
            }
            return false;
        }
        matches!(self, Self::Inside { .. })
    }

    #[must_use]
    pub(crate) const fn declared_at(self) -> Option<usize> {
        match self {
            Self::Searching => None,
            Self::Inside { declared_at } => Some(declared_at),
        }
    }
}
