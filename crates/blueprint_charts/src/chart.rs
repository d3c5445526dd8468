//! Chart orchestration
//!
//! A [`Chart`] owns a config store, named layers, named child charts and a
//! dispatcher for `preDraw`, `postDraw` and `postTransition`. Its behavior is
//! customized through a [`Blueprint`], whose hooks run at fixed points of
//! every draw:
//!
//! ```text
//! transform -> pre_draw -> preDraw event
//!           -> layers and attachments draw (handlers run now)
//!           -> post_draw -> postDraw event
//!           -> await every transition
//!           -> post_transition -> postTransition event
//! ```

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use blueprint_core::{
    BlueprintError, ConfigBatch, ConfigDefine, ConfigManager, ConfigSnapshot, Dispatcher, Result,
};
use blueprint_scene::{Document, Selection};
use futures::future::{self, FutureExt, LocalBoxFuture};
use indexmap::IndexMap;

use crate::events::{ChartEvent, ChartEventKind, Listener};
use crate::layer::{Layer, LayerOptions};
use crate::plugin::Plugin;

/// Hooks that give a chart its behavior. Every hook defaults to a no-op.
pub trait Blueprint<D> {
    /// Runs once while the chart is built; define layers and config here
    fn initialize(&self, _chart: &Chart<D>) -> Result<()> {
        Ok(())
    }

    /// Reshape the data before anything draws
    fn transform(&self, data: D) -> D {
        data
    }

    fn pre_draw(&self, _chart: &Chart<D>, _data: &D) {}

    /// Runs after handlers ran but before transitions finished
    fn post_draw(&self, _chart: &Chart<D>, _data: &D) {}

    fn post_transition(&self, _chart: &Chart<D>, _data: &D) {}
}

/// Blueprint with no hooks
struct Plain;

impl<D> Blueprint<D> for Plain {}

struct ChartInner<D> {
    base: Selection,
    blueprint: Rc<dyn Blueprint<D>>,
    config: RefCell<ConfigManager>,
    layers: RefCell<IndexMap<String, Rc<Layer<D>>>>,
    attachments: RefCell<IndexMap<String, Chart<D>>>,
    dispatcher: RefCell<Dispatcher<ChartEventKind, Listener<D>>>,
    teardowns: RefCell<Vec<Rc<dyn Plugin<D>>>>,
}

/// Shared handle to a chart. Clones refer to the same chart.
pub struct Chart<D> {
    inner: Rc<ChartInner<D>>,
}

/// Non-owning chart handle for handlers and plugins
pub struct WeakChart<D> {
    inner: Weak<ChartInner<D>>,
}

impl<D> WeakChart<D> {
    pub fn upgrade(&self) -> Option<Chart<D>> {
        self.inner.upgrade().map(|inner| Chart { inner })
    }
}

impl<D> Clone for WeakChart<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D> Clone for Chart<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: Clone + 'static> Chart<D> {
    /// Build a chart on `base` and run its blueprint's `initialize`
    pub fn new<B: Blueprint<D> + 'static>(base: Selection, blueprint: B) -> Result<Self> {
        let blueprint: Rc<dyn Blueprint<D>> = Rc::new(blueprint);
        let chart = Self::with_blueprint(base, blueprint.clone());
        blueprint.initialize(&chart)?;
        Ok(chart)
    }

    /// A chart with no hooks, assembled from the outside
    pub fn plain(base: Selection) -> Self {
        Self::with_blueprint(base, Rc::new(Plain))
    }

    fn with_blueprint(base: Selection, blueprint: Rc<dyn Blueprint<D>>) -> Self {
        Self {
            inner: Rc::new(ChartInner {
                base,
                blueprint,
                config: RefCell::new(ConfigManager::new()),
                layers: RefCell::new(IndexMap::new()),
                attachments: RefCell::new(IndexMap::new()),
                dispatcher: RefCell::new(Dispatcher::new()),
                teardowns: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Selection the chart was built on
    pub fn base(&self) -> &Selection {
        &self.inner.base
    }

    pub fn document(&self) -> &Document {
        self.inner.base.document()
    }

    pub fn downgrade(&self) -> WeakChart<D> {
        WeakChart {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // Layers

    pub fn layer(&self, name: &str) -> Result<Rc<Layer<D>>> {
        self.inner
            .layers
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| BlueprintError::UnknownLayer(name.to_string()))
    }

    /// Create a layer, replacing any layer with the same name
    pub fn define_layer(
        &self,
        name: &str,
        base: Selection,
        options: LayerOptions<D>,
    ) -> Result<Rc<Layer<D>>> {
        let layer = Rc::new(Layer::new(base, options)?);
        self.inner
            .layers
            .borrow_mut()
            .insert(name.to_string(), layer.clone());
        Ok(layer)
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.inner.layers.borrow().contains_key(name)
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.inner.layers.borrow().keys().cloned().collect()
    }

    // Attachments

    /// Register a built chart to draw alongside this one
    pub fn attach(&self, name: &str, child: Chart<D>) -> &Self {
        self.inner
            .attachments
            .borrow_mut()
            .insert(name.to_string(), child);
        self
    }

    /// Build a child chart on `base` and attach it
    pub fn attach_new<B: Blueprint<D> + 'static>(
        &self,
        name: &str,
        base: Selection,
        blueprint: B,
    ) -> Result<Chart<D>> {
        let child = Chart::new(base, blueprint)?;
        self.attach(name, child.clone());
        Ok(child)
    }

    pub fn attachment(&self, name: &str) -> Result<Chart<D>> {
        self.inner
            .attachments
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| BlueprintError::UnknownAttachment(name.to_string()))
    }

    pub fn has_attachment(&self, name: &str) -> bool {
        self.inner.attachments.borrow().contains_key(name)
    }

    // Config

    pub fn config<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        self.inner.config.borrow().get(name)
    }

    pub fn set_config<T: Clone + 'static>(&self, name: &str, value: T) -> Result<&Self> {
        self.inner.config.borrow_mut().set(name, value)?;
        Ok(self)
    }

    /// Apply several values in order. Entries before a failing one stay applied.
    pub fn set_config_batch(&self, batch: ConfigBatch) -> Result<&Self> {
        self.inner.config.borrow_mut().set_batch(batch)?;
        Ok(self)
    }

    pub fn define_config<T: Clone + 'static>(
        &self,
        name: &str,
        define: ConfigDefine<T>,
    ) -> Result<&Self> {
        self.inner.config.borrow_mut().define(name, define)?;
        Ok(self)
    }

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        self.inner.config.borrow().get_all()
    }

    pub fn has_config(&self, name: &str) -> bool {
        self.inner.config.borrow().has(name)
    }

    // Events

    /// Listen to `preDraw`, `postDraw` or `postTransition`, optionally as
    /// `event.namespace`. Several names may be separated by whitespace.
    pub fn on<F>(&self, event: &str, listener: F) -> Result<&Self>
    where
        F: Fn(&Chart<D>, &ChartEvent<'_, D>) + 'static,
    {
        let listener: Listener<D> = Rc::new(listener);
        self.inner.dispatcher.borrow_mut().on(event, listener)?;
        Ok(self)
    }

    /// Remove listeners by `event`, `event.namespace` or `.namespace`
    pub fn off(&self, event: &str) -> Result<&Self> {
        self.inner.dispatcher.borrow_mut().off(event)?;
        Ok(self)
    }

    pub fn listener_count(&self, kind: ChartEventKind) -> usize {
        self.inner.dispatcher.borrow().listener_count(kind)
    }

    fn emit(&self, event: ChartEvent<'_, D>) {
        let listeners = self.inner.dispatcher.borrow().listeners(event.kind());
        for listener in listeners {
            listener(self, &event);
        }
    }

    // Plugins

    /// Install `plugin` and subscribe the hooks it lists in
    /// [`Plugin::hooks`].
    ///
    /// The namespace is `name`, else the plugin's own name, else `"plugin"`.
    pub fn use_plugin(&self, plugin: Rc<dyn Plugin<D>>, name: Option<&str>) -> Result<&Self> {
        let namespace = name
            .or_else(|| plugin.name())
            .unwrap_or("plugin")
            .to_string();

        plugin.install(self)?;

        for &kind in plugin.hooks() {
            let p = plugin.clone();
            self.on(
                &format!("{}.{namespace}", kind.as_str()),
                move |chart, event| match event {
                    ChartEvent::PreDraw(data) => p.pre_draw(chart, data),
                    ChartEvent::PostDraw(data) => p.post_draw(chart, data),
                    ChartEvent::PostTransition(data) => p.post_transition(chart, data),
                },
            )?;
        }

        self.inner.teardowns.borrow_mut().push(plugin);
        tracing::debug!(namespace = %namespace, "plugin installed");
        Ok(self)
    }

    // Lifecycle

    /// Draw `data` through every layer and attachment.
    ///
    /// Everything up to the `postDraw` event runs before this returns. The
    /// returned [`Draw`] resolves after every transition settled and the
    /// `postTransition` hook and event ran. A layer whose bind or insert fails
    /// stops the draw there; a failing attachment fails the draw before
    /// `postTransition`.
    pub fn draw(&self, data: D) -> Draw {
        let blueprint = self.inner.blueprint.clone();
        let data = Rc::new(blueprint.transform(data));

        blueprint.pre_draw(self, &data);
        self.emit(ChartEvent::PreDraw(&data));

        let layers: Vec<(String, Rc<Layer<D>>)> = self
            .inner
            .layers
            .borrow()
            .iter()
            .map(|(name, layer)| (name.clone(), layer.clone()))
            .collect();
        let children: Vec<Chart<D>> = self.inner.attachments.borrow().values().cloned().collect();

        let mut pending: Vec<LocalBoxFuture<'static, Result<()>>> =
            Vec::with_capacity(layers.len() + children.len());
        for (name, layer) in layers {
            match layer.draw(&data) {
                Ok(end) => pending.push(end.map(Ok).boxed_local()),
                Err(err) => {
                    tracing::debug!(layer = %name, error = %err, "layer draw failed");
                    return Draw::failed(err);
                }
            }
        }
        for child in children {
            pending.push(child.draw(D::clone(&data)).boxed_local());
        }

        blueprint.post_draw(self, &data);
        self.emit(ChartEvent::PostDraw(&data));
        tracing::debug!(pending = pending.len(), "draw awaiting transitions");

        let chart = self.clone();
        Draw {
            inner: async move {
                future::try_join_all(pending).await?;
                blueprint.post_transition(&chart, &data);
                chart.emit(ChartEvent::PostTransition(&data));
                tracing::debug!("draw finished");
                Ok(())
            }
            .boxed_local(),
        }
    }

    /// Tear the chart down.
    ///
    /// Plugin teardowns run first, newest first, each once. Attached charts
    /// are destroyed next, then the layer and attachment registries are
    /// cleared. Config and event listeners are kept.
    pub fn destroy(&self) {
        let plugins: Vec<Rc<dyn Plugin<D>>> = self.inner.teardowns.borrow_mut().drain(..).collect();
        for plugin in plugins.iter().rev() {
            plugin.destroy(self);
        }

        let children: Vec<Chart<D>> = self
            .inner
            .attachments
            .borrow_mut()
            .drain(..)
            .map(|(_, child)| child)
            .collect();
        for child in &children {
            child.destroy();
        }

        self.inner.layers.borrow_mut().clear();
        tracing::debug!(
            plugins = plugins.len(),
            children = children.len(),
            "chart destroyed"
        );
    }
}

impl<D> fmt::Debug for Chart<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("base", &self.inner.base)
            .field("layers", &self.inner.layers.borrow().len())
            .field("attachments", &self.inner.attachments.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<D> PartialEq for Chart<D> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Completion of one [`Chart::draw`]
#[must_use = "postTransition only runs when the draw is awaited"]
pub struct Draw {
    inner: LocalBoxFuture<'static, Result<()>>,
}

impl Draw {
    fn failed(err: BlueprintError) -> Self {
        Self {
            inner: future::ready(Err(err)).boxed_local(),
        }
    }
}

impl Future for Draw {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draw").finish_non_exhaustive()
    }
}
