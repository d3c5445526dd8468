//! Selections over the element tree
//!
//! A [`Selection`] is an ordered list of node ids plus the parent new nodes
//! are appended to when data enters. Methods that mutate return `&Self` so
//! calls chain. Closures receive the node's bound datum; nodes whose datum is
//! missing or of another type are skipped.
//!
//! No scene borrow is held while user closures run, so a closure may itself
//! read or mutate the document.

use std::any::Any;
use std::hash::Hash;
use std::rc::Rc;

use blueprint_core::AttrValue;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::document::Document;
use crate::join::Join;
use crate::scene::{Datum, NodeId, Selector};
use crate::transition::Transition;

#[derive(Clone)]
pub struct Selection {
    doc: Document,
    nodes: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Selection {
    pub(crate) fn from_parts(doc: Document, nodes: Vec<NodeId>, parent: Option<NodeId>) -> Self {
        Self { doc, nodes, parent }
    }

    /// An empty selection on `doc`
    pub fn empty(doc: &Document) -> Self {
        Self::from_parts(doc.clone(), Vec::new(), None)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Where entering nodes are appended
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Descendants of every node matching `selector`, in document order.
    ///
    /// The first node of this selection becomes the parent of the result.
    pub fn select_all(&self, selector: &str) -> Selection {
        let selector = Selector::parse(selector);
        let mut found = Vec::new();
        let mut seen = FxHashSet::default();
        for node in &self.nodes {
            for hit in self.doc.query(*node, &selector) {
                if seen.insert(hit) {
                    found.push(hit);
                }
            }
        }
        Selection::from_parts(self.doc.clone(), found, self.first())
    }

    /// Append a `tag` child to every node; children inherit the parent's datum
    pub fn append(&self, tag: &str) -> Selection {
        let mut scene = self.doc.scene_mut();
        let mut children = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let datum = scene.node(*node).and_then(|n| n.datum().cloned());
            if let Some(child) = scene.append(*node, tag) {
                scene.set_datum(child, datum);
                children.push(child);
            }
        }
        drop(scene);
        Selection::from_parts(self.doc.clone(), children, self.parent)
    }

    pub fn attr(&self, name: &str, value: impl Into<AttrValue>) -> &Self {
        let value = value.into();
        let mut scene = self.doc.scene_mut();
        for node in &self.nodes {
            scene.set_attr(*node, name, value.clone());
        }
        self
    }

    /// Set `name` from each node's datum and index
    pub fn attr_with<T, V, F>(&self, name: &str, f: F) -> &Self
    where
        T: 'static,
        V: Into<AttrValue>,
        F: Fn(&T, usize) -> V,
    {
        let values: Vec<(NodeId, AttrValue)> = self
            .bound()
            .into_iter()
            .enumerate()
            .filter_map(|(i, (node, datum))| {
                let datum = datum?;
                let datum = datum.downcast_ref::<T>()?;
                Some((node, f(datum, i).into()))
            })
            .collect();

        let mut scene = self.doc.scene_mut();
        for (node, value) in values {
            scene.set_attr(node, name, value);
        }
        self
    }

    pub fn remove_attr(&self, name: &str) -> &Self {
        let mut scene = self.doc.scene_mut();
        for node in &self.nodes {
            scene.remove_attr(*node, name);
        }
        self
    }

    pub fn text(&self, text: impl Into<String>) -> &Self {
        let text = text.into();
        let mut scene = self.doc.scene_mut();
        for node in &self.nodes {
            scene.set_text(*node, text.clone());
        }
        self
    }

    pub fn text_with<T, F>(&self, f: F) -> &Self
    where
        T: 'static,
        F: Fn(&T, usize) -> String,
    {
        let values: Vec<(NodeId, String)> = self
            .bound()
            .into_iter()
            .enumerate()
            .filter_map(|(i, (node, datum))| {
                let datum = datum?;
                Some((node, f(datum.downcast_ref::<T>()?, i)))
            })
            .collect();

        let mut scene = self.doc.scene_mut();
        for (node, text) in values {
            scene.set_text(node, text);
        }
        self
    }

    pub fn classed(&self, class: &str, on: bool) -> &Self {
        let mut scene = self.doc.scene_mut();
        for node in &self.nodes {
            scene.set_class(*node, class, on);
        }
        self
    }

    /// Call `f` with a one-node selection, the node's datum and its index
    pub fn each<T, F>(&self, mut f: F) -> &Self
    where
        T: 'static,
        F: FnMut(&Selection, &T, usize),
    {
        for (i, (node, datum)) in self.bound().into_iter().enumerate() {
            let Some(datum) = datum else { continue };
            let Some(datum) = datum.downcast_ref::<T>() else {
                continue;
            };
            let single = Selection::from_parts(self.doc.clone(), vec![node], self.parent);
            f(&single, datum, i);
        }
        self
    }

    /// Datum of the first node
    pub fn datum<T: 'static>(&self) -> Option<Rc<T>> {
        let datum = self.bound().into_iter().next()?.1?;
        Rc::downcast::<T>(datum).ok()
    }

    /// Bind `datum` to every node
    pub fn set_datum<T: 'static>(&self, datum: T) -> &Self {
        let datum: Datum = Rc::new(datum);
        let mut scene = self.doc.scene_mut();
        for node in &self.nodes {
            scene.set_datum(*node, Some(datum.clone()));
        }
        self
    }

    /// Data of every node bound with a `T`, in selection order
    pub fn data<T: 'static>(&self) -> Vec<Rc<T>> {
        self.bound()
            .into_iter()
            .filter_map(|(_, datum)| Rc::downcast::<T>(datum?).ok())
            .collect()
    }

    /// Current value of `name` on every node
    pub fn attr_values(&self, name: &str) -> Vec<Option<AttrValue>> {
        let scene = self.doc.scene();
        self.nodes
            .iter()
            .map(|node| scene.attr(*node, name).cloned())
            .collect()
    }

    /// Text of every node
    pub fn texts(&self) -> Vec<Option<String>> {
        let scene = self.doc.scene();
        self.nodes
            .iter()
            .map(|node| scene.node(*node).and_then(|n| n.text().map(str::to_string)))
            .collect()
    }

    /// Detach every node and its subtree, dropping their transitions
    pub fn remove(&self) -> &Self {
        for node in &self.nodes {
            self.doc.interrupt(*node, None);
        }
        let mut scene = self.doc.scene_mut();
        for node in &self.nodes {
            scene.remove(*node);
        }
        self
    }

    /// This selection's nodes followed by those of `other` not already present
    pub fn merge(&self, other: &Selection) -> Selection {
        let mut nodes = self.nodes.clone();
        let mut seen: FxHashSet<NodeId> = nodes.iter().copied().collect();
        for node in &other.nodes {
            if seen.insert(*node) {
                nodes.push(*node);
            }
        }
        Selection::from_parts(self.doc.clone(), nodes, self.parent.or(other.parent))
    }

    /// Key-based data join.
    ///
    /// Nodes are keyed by their current datum, data by `key`. A node whose
    /// datum is not a `T`, or whose key repeats an earlier node's, exits. A
    /// data item whose key was already matched enters. Matched nodes receive
    /// the new datum.
    pub fn data_by_key<T, K, F>(&self, data: &[T], key: F) -> Join
    where
        T: Clone + 'static,
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let bound = self.bound();
        let mut by_key: FxHashMap<K, usize> = FxHashMap::default();
        let mut exiting = vec![false; bound.len()];

        for (i, (_, datum)) in bound.iter().enumerate() {
            let node_key = datum
                .as_ref()
                .and_then(|d| d.downcast_ref::<T>())
                .map(&key);
            match node_key {
                Some(k) if !by_key.contains_key(&k) => {
                    by_key.insert(k, i);
                }
                _ => exiting[i] = true,
            }
        }

        let mut enter = Vec::new();
        let mut update = Vec::new();
        let mut scene = self.doc.scene_mut();
        for (index, item) in data.iter().enumerate() {
            let datum: Datum = Rc::new(item.clone());
            match by_key.remove(&key(item)) {
                Some(slot) => {
                    let node = bound[slot].0;
                    scene.set_datum(node, Some(datum));
                    update.push((index, node));
                }
                None => enter.push((index, datum)),
            }
        }
        drop(scene);

        for slot in by_key.into_values() {
            exiting[slot] = true;
        }
        let exit = bound
            .iter()
            .zip(&exiting)
            .filter(|(_, gone)| **gone)
            .map(|((node, _), _)| *node)
            .collect();

        self.finish_join(enter, update, exit)
    }

    /// Index-based data join: item `i` binds to node `i`
    pub fn data_by_index<T: Clone + 'static>(&self, data: &[T]) -> Join {
        let mut enter = Vec::new();
        let mut update = Vec::new();
        let mut scene = self.doc.scene_mut();
        for (index, item) in data.iter().enumerate() {
            let datum: Datum = Rc::new(item.clone());
            match self.nodes.get(index) {
                Some(node) => {
                    scene.set_datum(*node, Some(datum));
                    update.push((index, *node));
                }
                None => enter.push((index, datum)),
            }
        }
        drop(scene);

        let exit = self.nodes.iter().skip(data.len()).copied().collect();
        self.finish_join(enter, update, exit)
    }

    fn finish_join(
        &self,
        enter: Vec<(usize, Datum)>,
        update: Vec<(usize, NodeId)>,
        exit: Vec<NodeId>,
    ) -> Join {
        tracing::trace!(
            enter = enter.len(),
            update = update.len(),
            exit = exit.len(),
            "data joined"
        );
        Join::new(self.doc.clone(), self.parent, enter, update, exit)
    }

    /// Start an unnamed transition on every node
    pub fn transition(&self) -> Transition {
        self.transition_named("")
    }

    /// Start a transition in slot `name` on every node
    pub fn transition_named(&self, name: &str) -> Transition {
        Transition::new(self.clone(), name)
    }

    /// Drop active and pending transitions, all slots when `name` is `None`
    pub fn interrupt(&self, name: Option<&str>) -> &Self {
        for node in &self.nodes {
            self.doc.interrupt(*node, name);
        }
        self
    }

    fn bound(&self) -> Vec<(NodeId, Option<Rc<dyn Any>>)> {
        let scene = self.doc.scene();
        self.nodes
            .iter()
            .map(|node| (*node, scene.node(*node).and_then(|n| n.datum().cloned())))
            .collect()
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("nodes", &self.nodes)
            .field("parent", &self.parent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Bar {
        id: &'static str,
        value: f64,
    }

    fn bar(id: &'static str, value: f64) -> Bar {
        Bar { id, value }
    }

    fn draw(doc: &Document, data: &[Bar]) -> (usize, usize, usize) {
        let join = doc.select_all("rect").data_by_key(data, |b| b.id);
        let counts = (join.enter_len(), join.update_len(), join.exit_len());
        join.enter().append("rect");
        join.exit().remove();
        counts
    }

    #[test]
    fn test_attr_with_reads_bound_data() {
        let doc = Document::new("svg");
        let join = doc.select_all("rect").data_by_key(&[bar("a", 1.0), bar("b", 2.0)], |b| b.id);
        let rects = join.enter().append("rect");
        rects.attr_with("height", |b: &Bar, i| b.value * 10.0 + i as f64);

        assert_eq!(
            rects.attr_values("height"),
            [Some(10.0.into()), Some(21.0.into())]
        );
    }

    #[test]
    fn test_append_inherits_datum() {
        let doc = Document::new("svg");
        let g = doc.root().append("g");
        g.set_datum(bar("a", 3.0));
        let label = g.append("text");
        label.text_with(|b: &Bar, _| b.id.to_uppercase());
        assert_eq!(label.texts(), [Some("A".to_string())]);
    }

    #[test]
    fn test_keyed_join_partitions() {
        let doc = Document::new("svg");
        assert_eq!(draw(&doc, &[bar("a", 1.0), bar("b", 2.0), bar("c", 3.0)]), (3, 0, 0));
        assert_eq!(draw(&doc, &[bar("c", 4.0), bar("a", 5.0)]), (0, 2, 1));
        assert_eq!(draw(&doc, &[bar("a", 6.0), bar("d", 7.0)]), (1, 1, 1));

        let data = doc.select_all("rect").data::<Bar>();
        let ids: Vec<_> = data.iter().map(|b| b.id).collect();
        assert_eq!(ids, ["a", "d"]);
        assert_eq!(data[0].value, 6.0);
    }

    #[test]
    fn test_duplicate_keys() {
        let doc = Document::new("svg");
        assert_eq!(draw(&doc, &[bar("a", 1.0), bar("a", 2.0)]), (2, 0, 0));

        // The second "a" node exits, the second "a" item enters.
        let join = doc
            .select_all("rect")
            .data_by_key(&[bar("a", 3.0), bar("a", 4.0)], |b| b.id);
        assert_eq!((join.enter_len(), join.update_len(), join.exit_len()), (1, 1, 1));
    }

    #[test]
    fn test_foreign_datum_exits() {
        let doc = Document::new("svg");
        doc.root().append("rect").set_datum(42u32);
        let join = doc.select_all("rect").data_by_key(&[bar("a", 1.0)], |b| b.id);
        assert_eq!((join.enter_len(), join.update_len(), join.exit_len()), (1, 0, 1));
    }

    #[test]
    fn test_index_join() {
        let doc = Document::new("svg");
        let join = doc.select_all("circle").data_by_index(&[1, 2, 3]);
        join.enter().append("circle");

        let join = doc.select_all("circle").data_by_index(&[9]);
        assert_eq!((join.enter_len(), join.update_len(), join.exit_len()), (0, 1, 2));
        assert_eq!(*join.update().datum::<i32>().unwrap(), 9);
    }

    #[test]
    fn test_remove_and_merge() {
        let doc = Document::new("svg");
        let a = doc.root().append("rect");
        let b = doc.root().append("circle");
        let both = a.merge(&b).merge(&a);
        assert_eq!(both.len(), 2);

        a.remove();
        assert!(doc.select_all("rect").is_empty());
        assert_eq!(doc.select_all("*").len(), 1);
    }

    #[test]
    fn test_nested_matches_selected_once() {
        let doc = Document::new("svg");
        let outer = doc.root().append("g");
        let inner = outer.append("g");
        inner.append("rect");
        outer.append("rect");

        let rects = doc.select_all("g").select_all("rect");
        assert_eq!(rects.len(), 2);
        assert_eq!(rects.merge(&doc.select_all("rect")).len(), 2);
    }

    #[test]
    fn test_closures_may_touch_the_document() {
        let doc = Document::new("svg");
        let g = doc.root().append("g");
        g.set_datum(1u8);
        g.each(|node: &Selection, _: &u8, _| {
            node.append("rect").attr("x", 1.0);
        });
        assert_eq!(doc.select_all("rect").len(), 1);
    }
}
