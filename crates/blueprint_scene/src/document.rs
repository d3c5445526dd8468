//! Document: a scene plus the clock that animates it

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use std::time::Duration;

use blueprint_animation::{Animation, AnimationScheduler, Completion};
use tokio::time::{interval, MissedTickBehavior};

use crate::scene::{NodeId, Scene, Selector};
use crate::selection::Selection;

pub(crate) struct DocumentInner {
    pub(crate) scene: RefCell<Scene>,
    pub(crate) scheduler: RefCell<AnimationScheduler>,
}

/// Shared handle to an element tree and its animation scheduler.
///
/// Cloning is cheap and every clone refers to the same tree. Transitions only
/// make progress when the document is advanced, ticked or driven.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    pub fn new(root_tag: &str) -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                scene: RefCell::new(Scene::new(root_tag)),
                scheduler: RefCell::new(AnimationScheduler::new()),
            }),
        }
    }

    /// Selection holding only the root element
    pub fn root(&self) -> Selection {
        let root = self.inner.scene.borrow().root();
        Selection::from_parts(self.clone(), vec![root], None)
    }

    /// Shorthand for `root().select_all(selector)`
    pub fn select_all(&self, selector: &str) -> Selection {
        self.root().select_all(selector)
    }

    /// Every element matching `selector`, searched from `from`
    pub(crate) fn query(&self, from: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.inner.scene.borrow().select_all(from, selector)
    }

    /// Read access to the tree. Do not hold the guard across `advance`.
    pub fn scene(&self) -> Ref<'_, Scene> {
        self.inner.scene.borrow()
    }

    pub(crate) fn scene_mut(&self) -> RefMut<'_, Scene> {
        self.inner.scene.borrow_mut()
    }

    pub(crate) fn schedule(
        &self,
        node: NodeId,
        name: &str,
        animation: Box<dyn Animation>,
    ) -> Completion {
        let (_, done) = self
            .inner
            .scheduler
            .borrow_mut()
            .schedule(node.as_u64(), name, animation);
        done
    }

    pub(crate) fn interrupt(&self, node: NodeId, name: Option<&str>) -> usize {
        self.inner
            .scheduler
            .borrow_mut()
            .interrupt(node.as_u64(), name)
    }

    pub(crate) fn downgrade(&self) -> Weak<DocumentInner> {
        Rc::downgrade(&self.inner)
    }

    /// Step every transition by `dt` on the document clock
    pub fn advance(&self, dt: Duration) {
        self.inner.scheduler.borrow_mut().advance(dt);
    }

    /// Step every transition by the wall-clock time since the last tick
    pub fn tick(&self) {
        self.inner.scheduler.borrow_mut().tick();
    }

    pub fn has_active_transitions(&self) -> bool {
        self.inner.scheduler.borrow().has_active_animations()
    }

    /// Time elapsed on the document clock
    pub fn now(&self) -> Duration {
        self.inner.scheduler.borrow().now()
    }

    /// Advance on a tokio interval until no transition is active
    pub async fn drive(&self, frame: Duration) {
        let mut ticker = interval(frame.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = ticker.tick().await;
        let mut frames = 0u64;

        while self.has_active_transitions() {
            let now = ticker.tick().await;
            self.advance(now - last);
            last = now;
            frames += 1;
        }
        tracing::debug!(frames, "document idle");
    }

    /// Markup dump of the whole tree
    pub fn markup(&self) -> String {
        self.inner.scene.borrow().markup()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("svg")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.scene.borrow().len())
            .field("active", &self.has_active_transitions())
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_tree() {
        let doc = Document::new("svg");
        let other = doc.clone();
        doc.root().append("g");
        assert_eq!(other.scene().len(), 2);
        assert_eq!(doc, other);
        assert_ne!(doc, Document::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_runs_transitions_to_the_end() {
        let doc = Document::new("svg");
        let rect = doc.root().append("rect");
        rect.attr("width", 0.0);
        rect.transition()
            .duration(Duration::from_millis(100))
            .attr("width", 50.0);

        assert!(doc.has_active_transitions());
        doc.drive(Duration::from_millis(16)).await;

        assert!(!doc.has_active_transitions());
        assert_eq!(rect.attr_values("width"), [Some(50.0.into())]);
        assert!(doc.now() >= Duration::from_millis(100));
    }
}
