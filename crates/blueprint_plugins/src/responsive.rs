//! Responsive resize plugin

use std::cell::RefCell;

use blueprint_charts::{Chart, ChartEventKind, Draw, Plugin, WeakChart};
use blueprint_core::{ConfigBatch, Result};

/// Size of the container a chart is laid out in
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

type GetSize = Box<dyn Fn(Size) -> ConfigBatch>;

struct State<D> {
    chart: Option<WeakChart<D>>,
    last_data: Option<D>,
}

/// Redraws the chart when its container is resized.
///
/// Remembers the data of the latest draw. [`ResponsivePlugin::resize`] turns
/// the new size into config values with `get_size`, applies them and redraws
/// with that data. Resizing before the first draw, or after the chart was
/// destroyed, does nothing.
///
/// Resizes are not debounced: each call starts a draw that races any draw
/// still in flight.
pub struct ResponsivePlugin<D> {
    get_size: GetSize,
    state: RefCell<State<D>>,
}

impl<D: Clone + 'static> ResponsivePlugin<D> {
    pub fn new<F>(get_size: F) -> Self
    where
        F: Fn(Size) -> ConfigBatch + 'static,
    {
        Self {
            get_size: Box::new(get_size),
            state: RefCell::new(State {
                chart: None,
                last_data: None,
            }),
        }
    }

    /// Apply `size` and redraw with the last drawn data
    pub fn resize(&self, size: Size) -> Option<Result<Draw>> {
        let (chart, data) = {
            let state = self.state.borrow();
            let chart = state.chart.as_ref()?.upgrade()?;
            (chart, state.last_data.clone()?)
        };

        tracing::debug!(width = size.width, height = size.height, "resize redraw");
        if let Err(err) = chart.set_config_batch((self.get_size)(size)) {
            return Some(Err(err));
        }
        Some(Ok(chart.draw(data)))
    }

    pub fn has_data(&self) -> bool {
        self.state.borrow().last_data.is_some()
    }
}

impl<D: Clone + 'static> Plugin<D> for ResponsivePlugin<D> {
    fn name(&self) -> Option<&str> {
        Some("responsive")
    }

    fn hooks(&self) -> &[ChartEventKind] {
        &[ChartEventKind::PostDraw]
    }

    fn install(&self, chart: &Chart<D>) -> Result<()> {
        self.state.borrow_mut().chart = Some(chart.downgrade());
        Ok(())
    }

    fn post_draw(&self, _chart: &Chart<D>, data: &D) {
        self.state.borrow_mut().last_data = Some(data.clone());
    }

    fn destroy(&self, _chart: &Chart<D>) {
        let mut state = self.state.borrow_mut();
        state.chart = None;
        state.last_data = None;
    }
}
