//! Crosshair plugin

use std::cell::RefCell;

use blueprint_charts::{Chart, ChartEventKind, Plugin};
use blueprint_core::Result;
use blueprint_scene::Selection;

/// A dashed vertical line spanning `height`, hidden until shown
pub struct CrosshairPlugin {
    parent: Selection,
    height: f64,
    line: RefCell<Option<Selection>>,
}

impl CrosshairPlugin {
    pub fn new(parent: Selection, height: f64) -> Self {
        Self {
            parent,
            height,
            line: RefCell::new(None),
        }
    }

    /// Move the line to `x` and show it
    pub fn show(&self, x: f64) {
        if let Some(line) = self.line.borrow().as_ref() {
            line.attr("x1", x).attr("x2", x).remove_attr("display");
        }
    }

    pub fn hide(&self) {
        if let Some(line) = self.line.borrow().as_ref() {
            line.attr("display", "none");
        }
    }

    /// The line, between install and destroy
    pub fn line(&self) -> Option<Selection> {
        self.line.borrow().clone()
    }
}

impl<D> Plugin<D> for CrosshairPlugin {
    fn name(&self) -> Option<&str> {
        Some("crosshair")
    }

    fn hooks(&self) -> &[ChartEventKind] {
        &[]
    }

    fn install(&self, _chart: &Chart<D>) -> Result<()> {
        let line = self.parent.append("line");
        line.attr("y1", 0.0)
            .attr("y2", self.height)
            .attr("stroke", "#999")
            .attr("stroke-dasharray", "4,3")
            .attr("display", "none");
        *self.line.borrow_mut() = Some(line);
        Ok(())
    }

    fn destroy(&self, _chart: &Chart<D>) {
        if let Some(line) = self.line.borrow_mut().take() {
            line.remove();
        }
    }
}
