//! Keyed bar chart with a value-label attachment

use std::time::Duration;

use blueprint_animation::Easing;
use blueprint_charts::{Blueprint, Chart, Handler, LayerOptions, WeakChart};
use blueprint_core::{ConfigDefine, Result};
use blueprint_scene::{EnterSelection, Selection};

/// One bar
#[derive(Clone, Debug, PartialEq)]
pub struct Sale {
    pub label: String,
    pub value: f64,
}

impl Sale {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

pub type Sales = Vec<Sale>;

fn bar_key(sale: &Sale) -> String {
    sale.label.clone()
}

/// Reads the layout of the chart a handler belongs to
#[derive(Clone, Copy)]
struct Layout {
    height: f64,
    max: f64,
    step: f64,
    duration: Duration,
}

impl Layout {
    fn read(chart: &Chart<Sales>, count: usize) -> Result<Self> {
        let width = chart.config::<f64>("width")?;
        Ok(Self {
            height: chart.config::<f64>("height")?,
            max: chart.config::<f64>("max")?,
            step: width / count.max(1) as f64,
            duration: Duration::from_millis(chart.config::<u64>("duration_ms")?),
        })
    }

    fn bar_height(&self, value: f64) -> f64 {
        if self.max <= 0.0 {
            0.0
        } else {
            value / self.max * self.height
        }
    }
}

/// Bars keyed by label. Entering bars grow from the baseline and exiting
/// bars shrink into it before they are removed.
pub struct BarChart;

impl Blueprint<Sales> for BarChart {
    fn initialize(&self, chart: &Chart<Sales>) -> Result<()> {
        chart
            .define_config("width", ConfigDefine::new(480.0f64).setter(|w: f64| w.max(1.0)))?
            .define_config("height", ConfigDefine::new(240.0f64).setter(|h: f64| h.max(1.0)))?
            .define_config("duration_ms", ConfigDefine::new(400u64))?
            .define_config("max", ConfigDefine::new(0.0f64))?;

        let group = chart.base().append("g");
        group.classed("bars", true);
        chart.define_layer("bars", group, bar_layer(chart.downgrade()))?;

        let labels = chart.base().append("g");
        labels.classed("labels", true);
        chart.attach_new(
            "labels",
            labels,
            LabelChart {
                parent: chart.downgrade(),
            },
        )?;
        Ok(())
    }

    fn transform(&self, data: Sales) -> Sales {
        data.into_iter().filter(|s| s.value.is_finite()).collect()
    }

    fn pre_draw(&self, chart: &Chart<Sales>, data: &Sales) {
        let max = data.iter().map(|s| s.value).fold(0.0, f64::max);
        if let Err(err) = chart.set_config("max", max) {
            tracing::warn!(%err, "could not update the value domain");
        }
    }

    fn post_transition(&self, _chart: &Chart<Sales>, data: &Sales) {
        tracing::info!(bars = data.len(), "bars settled");
    }
}

fn layout(chart: &WeakChart<Sales>, selection: &Selection) -> Option<Layout> {
    let chart = chart.upgrade()?;
    match Layout::read(&chart, selection.len()) {
        Ok(layout) => Some(layout),
        Err(err) => {
            tracing::warn!(%err, "bar layout unavailable");
            None
        }
    }
}

fn bar_layer(chart: WeakChart<Sales>) -> LayerOptions<Sales> {
    let (on_enter, on_merge, on_move, on_exit) = (chart.clone(), chart.clone(), chart.clone(), chart);

    LayerOptions::new(
        |base: &Selection, data: &Sales| Ok(base.select_all("rect.bar").data_by_key(data, bar_key)),
        |enter: &EnterSelection| {
            let bars = enter.append("rect");
            bars.classed("bar", true);
            Ok(bars)
        },
    )
    .on(
        "enter",
        Handler::phase(move |bars| {
            let Some(layout) = layout(&on_enter, bars) else { return };
            bars.attr("y", layout.height)
                .attr("height", 0.0)
                .attr("fill", "#4c78a8");
        }),
    )
    .on(
        "merge",
        Handler::phase(move |bars| {
            let Some(layout) = layout(&on_merge, bars) else { return };
            let step = layout.step;
            bars.attr_with("x", move |_: &Sale, i| i as f64 * step)
                .attr("width", (step - 2.0).max(1.0));
        }),
    )
    .on(
        "merge:transition",
        Handler::transition(move |t| {
            let Some(layout) = layout(&on_move, t.selection()) else { return };
            t.duration(layout.duration)
                .ease(Easing::CubicOut)
                .attr_with("y", move |s: &Sale, _| layout.height - layout.bar_height(s.value))
                .attr_with("height", move |s: &Sale, _| layout.bar_height(s.value));
        }),
    )
    .on(
        "exit:transition",
        Handler::transition(move |t| {
            let Some(layout) = layout(&on_exit, t.selection()) else { return };
            t.duration(layout.duration / 2)
                .attr("y", layout.height)
                .attr("height", 0.0)
                .remove();
        }),
    )
}

/// Value labels above each bar. Reads its layout from the bar chart it is
/// attached to.
struct LabelChart {
    parent: WeakChart<Sales>,
}

impl Blueprint<Sales> for LabelChart {
    fn initialize(&self, chart: &Chart<Sales>) -> Result<()> {
        let (on_merge, on_move) = (self.parent.clone(), self.parent.clone());
        let options = LayerOptions::new(
            |base: &Selection, data: &Sales| Ok(base.select_all("text").data_by_key(data, bar_key)),
            |enter: &EnterSelection| {
                let labels = enter.append("text");
                labels.attr("text-anchor", "middle");
                Ok(labels)
            },
        )
        .on(
            "merge",
            Handler::phase(move |labels| {
                let Some(layout) = layout(&on_merge, labels) else { return };
                let step = layout.step;
                labels
                    .attr_with("x", move |_: &Sale, i| i as f64 * step + step / 2.0)
                    .text_with(|s: &Sale, _| format!("{}: {}", s.label, s.value));
            }),
        )
        .on(
            "merge:transition",
            Handler::transition(move |t| {
                let Some(layout) = layout(&on_move, t.selection()) else { return };
                t.duration(layout.duration).attr_with("y", move |s: &Sale, _| {
                    layout.height - layout.bar_height(s.value) - 4.0
                });
            }),
        )
        .on(
            "exit",
            Handler::phase(|labels| {
                labels.remove();
            }),
        );
        chart.define_layer("labels", chart.base().clone(), options)?;
        Ok(())
    }
}
