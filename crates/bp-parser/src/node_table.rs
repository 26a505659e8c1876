use bp_core::GraphNode;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeEntry {
    pub(crate) node: GraphNode,
    pub(crate) declared_explicitly: bool,
}

/// Insertion-ordered node table keyed by id.
///
/// A node's position is fixed the first time its id is seen. Explicit
/// declarations may rewrite the label later; implicit references never do.
#[derive(Debug, Default)]
pub(crate) struct NodeTable {
    entries: Vec<NodeEntry>,
    index_by_id: FxHashMap<String, usize>,
}

impl NodeTable {
    /// `id[label]`: insert, or overwrite the label in place.
    pub(crate) fn declare(&mut self, id: &str, label: &str) {
        if let Some(&index) = self.index_by_id.get(id) {
            let entry = &mut self.entries[index];
            entry.node.label = label.to_string();
            entry.declared_explicitly = true;
            return;
        }
        self.push(GraphNode::new(id, label), true);
    }

    /// Edge endpoint: insert with `label == id` unless already present.
    pub(crate) fn reference(&mut self, id: &str) {
        if !self.index_by_id.contains_key(id) {
            self.push(GraphNode::implicit(id), false);
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub(crate) fn explicit_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.declared_explicitly)
            .count()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: &str) -> Option<&NodeEntry> {
        self.index_by_id.get(id).map(|&index| &self.entries[index])
    }

    pub(crate) fn into_nodes(self) -> Vec<GraphNode> {
        self.entries.into_iter().map(|entry| entry.node).collect()
    }

    fn push(&mut self, node: GraphNode, declared_explicitly: bool) {
        self.index_by_id.insert(node.id.clone(), self.entries.len());
        self.entries.push(NodeEntry {
            node,
            declared_explicitly,
        });
    }
}
