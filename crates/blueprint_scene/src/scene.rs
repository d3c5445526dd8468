//! Retained element tree
//!
//! Nodes live in a slot map and are addressed by [`NodeId`]. A node has a tag,
//! ordered attributes, optional text, children and an optional bound datum.
//! The `class` attribute is a space-separated list, as in markup.

use std::any::Any;
use std::fmt::Write as _;
use std::rc::Rc;

use blueprint_core::AttrValue;
use indexmap::IndexMap;
use slotmap::{new_key_type, Key, SlotMap};

new_key_type! {
    /// Unique identifier for a node in a [`Scene`]
    pub struct NodeId;
}

impl NodeId {
    /// Stable integer form, used to key animations by node
    pub fn as_u64(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Data bound to a node by a join
pub type Datum = Rc<dyn Any>;

/// A single element
pub struct Node {
    tag: String,
    attrs: IndexMap<String, AttrValue>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    datum: Option<Datum>,
}

impl Node {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: IndexMap::new(),
            text: None,
            parent,
            children: Vec::new(),
            datum: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn datum(&self) -> Option<&Datum> {
        self.datum.as_ref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get("class")
            .and_then(AttrValue::as_text)
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

/// A simple selector: `*`, `tag`, `.class`, or `tag.class.other`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim();
        let mut parts = selector.split('.');
        let tag = parts
            .next()
            .filter(|t| !t.is_empty() && *t != "*")
            .map(str::to_string);
        let classes = parts.filter(|c| !c.is_empty()).map(str::to_string).collect();
        Self { tag, classes }
    }

    pub fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if node.tag != *tag {
                return false;
            }
        }
        self.classes.iter().all(|c| node.has_class(c))
    }
}

/// The element tree
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Scene {
    pub fn new(root_tag: &str) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(root_tag, None));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a new `tag` element as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, tag: &str) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.nodes.insert(Node::new(tag, Some(parent)));
        self.nodes[parent].children.push(id);
        Some(id)
    }

    /// Remove `id` and its subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(id) {
            return false;
        }
        if let Some(parent) = self.nodes[id].parent {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
        true
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        self.nodes.get(id)?.attrs.get(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: AttrValue) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attrs.insert(name.to_string(), value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attrs.shift_remove(name);
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: String) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.text = Some(text);
        }
    }

    pub fn set_datum(&mut self, id: NodeId, datum: Option<Datum>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.datum = datum;
        }
    }

    /// Add or remove `class` from the node's class list
    pub fn set_class(&mut self, id: NodeId, class: &str, on: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let mut list: Vec<String> = node
            .attrs
            .get("class")
            .and_then(AttrValue::as_text)
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let present = list.iter().any(|c| c == class);
        if on && !present {
            list.push(class.to_string());
        } else if !on && present {
            list.retain(|c| c != class);
        } else {
            return;
        }
        node.attrs
            .insert("class".to_string(), AttrValue::Text(list.join(" ")));
    }

    /// Descendants of `id` in document order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.nodes.get(id) else {
            return out;
        };
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.nodes.get(next) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Descendants of `id` matching `selector`, in document order
    pub fn select_all(&self, id: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|d| self.nodes.get(*d).is_some_and(|n| selector.matches(n)))
            .collect()
    }

    /// Indented markup dump of the tree
    pub fn markup(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, self.root, 0);
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, depth: usize) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", node.tag);
        for (name, value) in &node.attrs {
            let _ = write!(out, " {name}=\"{value}\"");
        }

        match (&node.text, node.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{text}</{}>", node.tag);
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{indent}  {text}");
                }
                for child in &node.children {
                    self.write_node(out, *child, depth + 1);
                }
                let _ = writeln!(out, "{indent}</{}>", node.tag);
            }
        }
    }
}
