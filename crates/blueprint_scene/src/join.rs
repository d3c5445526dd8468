//! Result of binding data to a selection

use crate::document::Document;
use crate::scene::{Datum, NodeId};
use crate::selection::Selection;

/// Entering, updating and exiting partitions of a data join.
///
/// Entering items carry their data index so the merged selection can follow
/// data order once they are materialized.
pub struct Join {
    doc: Document,
    parent: Option<NodeId>,
    enter: Vec<(usize, Datum)>,
    update: Vec<(usize, NodeId)>,
    exit: Vec<NodeId>,
}

impl Join {
    pub(crate) fn new(
        doc: Document,
        parent: Option<NodeId>,
        enter: Vec<(usize, Datum)>,
        update: Vec<(usize, NodeId)>,
        exit: Vec<NodeId>,
    ) -> Self {
        Self {
            doc,
            parent,
            enter,
            update,
            exit,
        }
    }

    /// Placeholders for data with no matching node
    pub fn enter(&self) -> EnterSelection {
        EnterSelection {
            doc: self.doc.clone(),
            parent: self.parent,
            data: self.enter.iter().map(|(_, d)| d.clone()).collect(),
        }
    }

    /// Nodes matched to data, in data order
    pub fn update(&self) -> Selection {
        let nodes = self.update.iter().map(|(_, n)| *n).collect();
        Selection::from_parts(self.doc.clone(), nodes, self.parent)
    }

    /// Nodes whose data disappeared, in document order
    pub fn exit(&self) -> Selection {
        Selection::from_parts(self.doc.clone(), self.exit.clone(), self.parent)
    }

    /// Materialized enter nodes merged with the update nodes in data order.
    ///
    /// `entered` is expected to hold one node per entering item, as returned
    /// by [`EnterSelection::append`]. Extra nodes are kept at the end.
    pub fn merge_entered(&self, entered: &Selection) -> Selection {
        let mut slots: Vec<(usize, NodeId)> = self
            .enter
            .iter()
            .map(|(i, _)| *i)
            .zip(entered.nodes().iter().copied())
            .chain(self.update.iter().copied())
            .collect();
        slots.sort_by_key(|(i, _)| *i);

        let mut nodes: Vec<NodeId> = slots.into_iter().map(|(_, n)| n).collect();
        for extra in entered.nodes().iter().skip(self.enter.len()) {
            nodes.push(*extra);
        }
        Selection::from_parts(self.doc.clone(), nodes, self.parent)
    }

    pub fn enter_len(&self) -> usize {
        self.enter.len()
    }

    pub fn update_len(&self) -> usize {
        self.update.len()
    }

    pub fn exit_len(&self) -> usize {
        self.exit.len()
    }
}

impl std::fmt::Debug for Join {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Join")
            .field("enter", &self.enter.len())
            .field("update", &self.update.len())
            .field("exit", &self.exit.len())
            .finish()
    }
}

/// Data waiting for nodes
pub struct EnterSelection {
    doc: Document,
    parent: Option<NodeId>,
    data: Vec<Datum>,
}

impl EnterSelection {
    /// Create one `tag` node per entering datum under the join's parent.
    ///
    /// Falls back to the document root when the join had no parent.
    pub fn append(&self, tag: &str) -> Selection {
        let mut scene = self.doc.scene_mut();
        let parent = self
            .parent
            .filter(|p| scene.contains(*p))
            .unwrap_or_else(|| scene.root());

        let mut nodes = Vec::with_capacity(self.data.len());
        for datum in &self.data {
            if let Some(node) = scene.append(parent, tag) {
                scene.set_datum(node, Some(datum.clone()));
                nodes.push(node);
            }
        }
        drop(scene);
        Selection::from_parts(self.doc.clone(), nodes, Some(parent))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
