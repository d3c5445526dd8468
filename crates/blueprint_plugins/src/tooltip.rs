//! Tooltip plugin

use std::cell::RefCell;

use blueprint_charts::{Chart, ChartEventKind, Plugin};
use blueprint_core::Result;
use blueprint_scene::Selection;

/// Class of the tooltip group
pub const TOOLTIP_CLASS: &str = "d3bp-tooltip";

/// Horizontal gap between the anchor point and the tooltip
const OFFSET_X: f64 = 10.0;

/// Line height of stacked tooltip lines, in em
const LINE_HEIGHT_EM: f64 = 1.2;

/// One line of tooltip text
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipLine {
    pub text: String,
    pub color: Option<String>,
}

impl TooltipLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl From<&str> for TooltipLine {
    fn from(text: &str) -> Self {
        TooltipLine::new(text)
    }
}

/// Handle to the tooltip group in the tree
#[derive(Clone, Debug)]
pub struct Tooltip {
    group: Selection,
}

impl Tooltip {
    fn create(parent: &Selection) -> Self {
        let group = parent.append("g");
        group.classed(TOOLTIP_CLASS, true).attr("opacity", 0.0);
        Self { group }
    }

    /// Show `lines` next to `(x, y)`. Non-finite coordinates hide the tooltip.
    pub fn show(&self, x: f64, y: f64, lines: &[TooltipLine]) {
        if !x.is_finite() || !y.is_finite() {
            self.hide();
            return;
        }

        self.group.select_all("text").remove();
        for (i, line) in lines.iter().enumerate() {
            let text = self.group.append("text");
            text.attr("dy", format!("{}em", i as f64 * LINE_HEIGHT_EM))
                .text(line.text.as_str());
            if let Some(color) = &line.color {
                text.attr("fill", color.as_str());
            }
        }

        self.group
            .attr("transform", format!("translate({},{})", x + OFFSET_X, y))
            .attr("opacity", 1.0);
    }

    pub fn hide(&self) {
        self.group.attr("opacity", 0.0);
    }

    pub fn is_visible(&self) -> bool {
        self.group
            .attr_values("opacity")
            .first()
            .and_then(|v| v.as_ref()?.as_number())
            .is_some_and(|o| o > 0.0)
    }

    pub fn selection(&self) -> &Selection {
        &self.group
    }

    fn destroy(&self) {
        self.group.remove();
    }
}

type Bind<D> = Box<dyn Fn(&Chart<D>, &Tooltip, &D)>;

/// Appends a tooltip group on install and hands it to `bind` after every draw,
/// so the caller can wire it to the freshly drawn elements.
pub struct TooltipPlugin<D> {
    parent: Selection,
    bind: Bind<D>,
    tooltip: RefCell<Option<Tooltip>>,
}

impl<D> TooltipPlugin<D> {
    pub fn new<F>(parent: Selection, bind: F) -> Self
    where
        F: Fn(&Chart<D>, &Tooltip, &D) + 'static,
    {
        Self {
            parent,
            bind: Box::new(bind),
            tooltip: RefCell::new(None),
        }
    }

    /// The tooltip, between install and destroy
    pub fn tooltip(&self) -> Option<Tooltip> {
        self.tooltip.borrow().clone()
    }
}

impl<D> Plugin<D> for TooltipPlugin<D> {
    fn name(&self) -> Option<&str> {
        Some("tooltip")
    }

    fn hooks(&self) -> &[ChartEventKind] {
        &[ChartEventKind::PostDraw]
    }

    fn install(&self, _chart: &Chart<D>) -> Result<()> {
        *self.tooltip.borrow_mut() = Some(Tooltip::create(&self.parent));
        Ok(())
    }

    fn post_draw(&self, chart: &Chart<D>, data: &D) {
        let tooltip = self.tooltip();
        if let Some(tooltip) = tooltip {
            (self.bind)(chart, &tooltip, data);
        }
    }

    fn destroy(&self, _chart: &Chart<D>) {
        if let Some(tooltip) = self.tooltip.borrow_mut().take() {
            tooltip.destroy();
            tracing::debug!("tooltip removed");
        }
    }
}
