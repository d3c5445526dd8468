//! Attribute transitions on a selection
//!
//! Creating a [`Transition`] schedules one tween per node right away. Timing
//! and target values can be configured until the tween starts on the first
//! frame past its delay; start values are read from the tree at that moment.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use blueprint_animation::{
    interpolate, Animation, Completion, Easing, Interpolator, Timing, TransitionEnd,
};
use blueprint_core::AttrValue;
use indexmap::IndexMap;

use crate::document::DocumentInner;
use crate::scene::NodeId;
use crate::selection::Selection;

#[derive(Default)]
struct TransitionSettings {
    timing: Timing,
    /// Target attributes per node, by position in the selection
    targets: Vec<IndexMap<String, AttrValue>>,
    remove: bool,
}

/// A configured animation over every node of a selection
pub struct Transition {
    selection: Selection,
    name: String,
    settings: Rc<RefCell<TransitionSettings>>,
    completions: Vec<Completion>,
}

impl Transition {
    pub(crate) fn new(selection: Selection, name: &str) -> Self {
        let settings = Rc::new(RefCell::new(TransitionSettings {
            targets: vec![IndexMap::new(); selection.len()],
            ..TransitionSettings::default()
        }));

        let doc = selection.document();
        let completions = selection
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let tween = NodeTween {
                    doc: doc.downgrade(),
                    node: *node,
                    index,
                    settings: settings.clone(),
                    interpolators: Vec::new(),
                };
                doc.schedule(*node, name, Box::new(tween))
            })
            .collect();

        Self {
            selection,
            name: name.to_string(),
            settings,
            completions,
        }
    }

    pub fn duration(&self, duration: Duration) -> &Self {
        self.settings.borrow_mut().timing.duration = duration;
        self
    }

    pub fn delay(&self, delay: Duration) -> &Self {
        self.settings.borrow_mut().timing.delay = delay;
        self
    }

    pub fn ease(&self, easing: Easing) -> &Self {
        self.settings.borrow_mut().timing.easing = easing;
        self
    }

    /// Animate `name` towards `value` on every node
    pub fn attr(&self, name: &str, value: impl Into<AttrValue>) -> &Self {
        let value = value.into();
        for target in self.settings.borrow_mut().targets.iter_mut() {
            target.insert(name.to_string(), value.clone());
        }
        self
    }

    /// Animate `name` towards a value computed from each node's datum.
    ///
    /// `f` runs now, not when the transition starts.
    pub fn attr_with<T, V, F>(&self, name: &str, f: F) -> &Self
    where
        T: 'static,
        V: Into<AttrValue>,
        F: Fn(&T, usize) -> V,
    {
        let mut values = Vec::new();
        self.selection.each(|_, datum: &T, i| {
            values.push((i, f(datum, i).into()));
        });

        let mut settings = self.settings.borrow_mut();
        for (i, value) in values {
            if let Some(target) = settings.targets.get_mut(i) {
                target.insert(name.to_string(), value);
            }
        }
        self
    }

    /// Remove the nodes once the transition ends
    pub fn remove(&self) -> &Self {
        self.settings.borrow_mut().remove = true;
        self
    }

    /// Resolves when every node finished or was interrupted.
    ///
    /// Ready immediately for an empty selection.
    pub fn end(&self) -> TransitionEnd {
        if self.completions.is_empty() {
            return TransitionEnd::ready();
        }
        TransitionEnd::new(self.completions.iter().cloned())
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("nodes", &self.selection.len())
            .field("timing", &self.settings.borrow().timing)
            .finish()
    }
}

struct NodeTween {
    doc: Weak<DocumentInner>,
    node: NodeId,
    index: usize,
    settings: Rc<RefCell<TransitionSettings>>,
    interpolators: Vec<(String, Interpolator)>,
}

impl Animation for NodeTween {
    fn timing(&self) -> Timing {
        self.settings.borrow().timing
    }

    fn start(&mut self) {
        let Some(doc) = self.doc.upgrade() else {
            return;
        };
        let scene = doc.scene.borrow();
        let settings = self.settings.borrow();
        let Some(targets) = settings.targets.get(self.index) else {
            return;
        };
        self.interpolators = targets
            .iter()
            .map(|(name, to)| {
                let from = scene.attr(self.node, name);
                (name.clone(), interpolate(from, to))
            })
            .collect();
    }

    fn apply(&mut self, t: f64) {
        let Some(doc) = self.doc.upgrade() else {
            return;
        };
        let mut scene = doc.scene.borrow_mut();
        for (name, interpolator) in &self.interpolators {
            scene.set_attr(self.node, name, interpolator.at(t));
        }
    }

    fn finish(&mut self) {
        if !self.settings.borrow().remove {
            return;
        }
        if let Some(doc) = self.doc.upgrade() {
            doc.scene.borrow_mut().remove(self.node);
        }
    }
}
