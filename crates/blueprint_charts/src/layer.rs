//! Layers: one data join and its phase handlers

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use blueprint_core::{assert_lifecycle_event, BlueprintError, LifecycleEvent, Result};
use blueprint_scene::{EnterSelection, Join, Selection, Transition};
use indexmap::IndexMap;

use crate::phases::{run_phases, LayerTransitions, PhaseSelections};

type DataBind<D> = Box<dyn Fn(&Selection, &D) -> Result<Join>>;
type Insert = Box<dyn Fn(&EnterSelection) -> Result<Selection>>;

pub(crate) type HandlerMap = IndexMap<LifecycleEvent, Vec<Handler>>;

/// A phase handler.
///
/// Plain handlers receive the phase selection and go under a phase key such as
/// `"enter"`. Transition handlers receive a transition over that selection and
/// go under the matching `":transition"` key.
#[derive(Clone)]
pub enum Handler {
    Phase(Rc<dyn Fn(&Selection)>),
    Transition(Rc<dyn Fn(&Transition)>),
}

impl Handler {
    pub fn phase<F: Fn(&Selection) + 'static>(f: F) -> Self {
        Handler::Phase(Rc::new(f))
    }

    pub fn transition<F: Fn(&Transition) + 'static>(f: F) -> Self {
        Handler::Transition(Rc::new(f))
    }

    pub fn is_transition(&self) -> bool {
        matches!(self, Handler::Transition(_))
    }

    /// Identity comparison, as used by [`Layer::off_handler`]
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        match (self, other) {
            (Handler::Phase(a), Handler::Phase(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            (Handler::Transition(a), Handler::Transition(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Phase(_) => f.write_str("Handler::Phase"),
            Handler::Transition(_) => f.write_str("Handler::Transition"),
        }
    }
}

/// How a layer binds data and creates nodes, plus its initial handlers
pub struct LayerOptions<D> {
    data_bind: DataBind<D>,
    insert: Insert,
    handlers: Vec<(String, Handler)>,
}

impl<D: 'static> LayerOptions<D> {
    /// `data_bind` joins data to the layer's base selection; `insert` creates
    /// the nodes for entering data and returns them.
    pub fn new<B, I>(data_bind: B, insert: I) -> Self
    where
        B: Fn(&Selection, &D) -> Result<Join> + 'static,
        I: Fn(&EnterSelection) -> Result<Selection> + 'static,
    {
        Self {
            data_bind: Box::new(data_bind),
            insert: Box::new(insert),
            handlers: Vec::new(),
        }
    }

    /// Add an initial handler; the key is checked when the layer is built
    pub fn on(mut self, key: &str, handler: Handler) -> Self {
        self.handlers.push((key.to_string(), handler));
        self
    }
}

/// One data join run through the update, enter, merge and exit phases.
///
/// A layer keeps no data between draws: every [`Layer::draw`] joins against
/// the current tree under its base selection.
pub struct Layer<D> {
    base: Selection,
    data_bind: DataBind<D>,
    insert: Insert,
    handlers: RefCell<HandlerMap>,
}

impl<D: 'static> Layer<D> {
    pub fn new(base: Selection, options: LayerOptions<D>) -> Result<Self> {
        let layer = Self {
            base,
            data_bind: options.data_bind,
            insert: options.insert,
            handlers: RefCell::new(IndexMap::new()),
        };
        for (key, handler) in options.handlers {
            layer.on(&key, handler)?;
        }
        Ok(layer)
    }

    pub fn base(&self) -> &Selection {
        &self.base
    }

    /// Register `handler` under a lifecycle key. Handlers run in registration order.
    pub fn on(&self, key: &str, handler: Handler) -> Result<&Self> {
        let event = assert_lifecycle_event(key)?;
        if event.transition != handler.is_transition() {
            return Err(BlueprintError::HandlerKind(key.to_string()));
        }
        self.handlers
            .borrow_mut()
            .entry(event)
            .or_default()
            .push(handler);
        Ok(self)
    }

    /// Remove every handler under `key`
    pub fn off(&self, key: &str) -> Result<&Self> {
        let event = assert_lifecycle_event(key)?;
        self.handlers.borrow_mut().shift_remove(&event);
        Ok(self)
    }

    /// Remove the first registration of `handler` under `key`
    pub fn off_handler(&self, key: &str, handler: &Handler) -> Result<&Self> {
        let event = assert_lifecycle_event(key)?;
        if let Some(list) = self.handlers.borrow_mut().get_mut(&event) {
            if let Some(index) = list.iter().position(|h| h.ptr_eq(handler)) {
                list.remove(index);
            }
        }
        Ok(self)
    }

    pub fn handler_count(&self, key: &str) -> Result<usize> {
        let event = assert_lifecycle_event(key)?;
        Ok(self.handlers.borrow().get(&event).map_or(0, Vec::len))
    }

    /// Run the full lifecycle for `data`.
    ///
    /// Handlers run before this returns. The returned future resolves once
    /// every transition started by a `:transition` handler has ended or been
    /// interrupted. Errors from `data_bind` or `insert` return immediately.
    pub fn draw(&self, data: &D) -> Result<LayerTransitions> {
        let join = (self.data_bind)(&self.base, data)?;
        let entered = (self.insert)(&join.enter())?;
        let selections = PhaseSelections::new(&join, entered);
        tracing::debug!(
            update = selections.update.len(),
            enter = selections.enter.len(),
            exit = selections.exit.len(),
            "layer joined"
        );

        // Snapshot so handlers may (de)register handlers mid-draw.
        let handlers = self.handlers.borrow().clone();
        Ok(run_phases(&selections, &handlers))
    }
}

impl<D> fmt::Debug for Layer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        let keys: Vec<&str> = handlers.keys().map(LifecycleEvent::as_str).collect();
        f.debug_struct("Layer")
            .field("base", &self.base)
            .field("handlers", &keys)
            .finish()
    }
}
