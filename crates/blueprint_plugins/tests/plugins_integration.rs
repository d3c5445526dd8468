//! Integration tests for the bundled plugins
//!
//! These tests verify that:
//! - The tooltip is bound after every draw and removed on destroy
//! - The responsive plugin redraws with remembered data and new config
//! - Several plugins share one chart without stepping on each other

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use blueprint_charts::{Chart, Handler, LayerOptions};
use blueprint_core::{AttrValue, ConfigBatch, ConfigDefine};
use blueprint_plugins::{CrosshairPlugin, ResponsivePlugin, Size, TooltipLine, TooltipPlugin};
use blueprint_scene::{Document, EnterSelection, Selection};
use futures::FutureExt;

fn bar_chart(doc: &Document) -> Chart<Vec<f64>> {
    let chart = Chart::plain(doc.root());
    chart
        .define_config("width", ConfigDefine::new(100.0f64))
        .unwrap();

    let weak = chart.downgrade();
    chart
        .define_layer(
            "bars",
            doc.root().append("g"),
            LayerOptions::new(
                |base: &Selection, data: &Vec<f64>| Ok(base.select_all("rect").data_by_index(data)),
                |enter: &EnterSelection| Ok(enter.append("rect")),
            )
            .on(
                "merge",
                Handler::phase(move |bars| {
                    let Some(chart) = weak.upgrade() else { return };
                    let width = chart.config::<f64>("width").unwrap_or(0.0);
                    let step = width / bars.len().max(1) as f64;
                    bars.attr_with("x", move |_: &f64, i| i as f64 * step)
                        .attr("width", step);
                }),
            )
            .on(
                "merge:transition",
                Handler::transition(|t| {
                    t.duration(Duration::from_millis(50))
                        .attr_with("height", |v: &f64, _| *v);
                }),
            ),
        )
        .unwrap();
    chart
}

#[test]
fn test_tooltip_bound_after_each_draw() {
    let doc = Document::new("svg");
    let chart = bar_chart(&doc);
    let binds = Rc::new(Cell::new(0));

    let seen = binds.clone();
    let plugin = Rc::new(TooltipPlugin::new(
        doc.root(),
        move |_chart: &Chart<Vec<f64>>, tooltip, data: &Vec<f64>| {
            seen.set(seen.get() + 1);
            let max = data.iter().cloned().fold(f64::MIN, f64::max);
            tooltip.show(5.0, 5.0, &[TooltipLine::new(format!("max {max}"))]);
        },
    ));
    chart.use_plugin(plugin.clone(), None).unwrap();
    assert_eq!(doc.select_all("g.d3bp-tooltip").len(), 1);

    let _ = chart.draw(vec![1.0, 4.0]);
    let _ = chart.draw(vec![2.0]);
    assert_eq!(binds.get(), 2);

    let tooltip = plugin.tooltip().unwrap();
    assert!(tooltip.is_visible());
    assert_eq!(
        tooltip.selection().select_all("text").texts(),
        [Some("max 2".to_string())]
    );

    chart.destroy();
    assert!(plugin.tooltip().is_none());
    assert!(doc.select_all("g.d3bp-tooltip").is_empty());
}

#[test]
fn test_responsive_redraws_with_last_data() {
    let doc = Document::new("svg");
    let chart = bar_chart(&doc);
    let responsive = Rc::new(ResponsivePlugin::new(|size: Size| {
        ConfigBatch::new().with("width", size.width)
    }));
    chart.use_plugin(responsive.clone(), None).unwrap();

    // Nothing to redraw yet.
    assert!(responsive.resize(Size::new(300.0, 100.0)).is_none());
    assert_eq!(chart.config::<f64>("width").unwrap(), 100.0);

    let draw = chart.draw(vec![3.0, 6.0]);
    doc.advance(Duration::from_millis(50));
    assert_eq!(draw.now_or_never(), Some(Ok(())));
    assert_eq!(
        doc.select_all("rect").attr_values("width"),
        [Some(AttrValue::from(50.0)), Some(AttrValue::from(50.0))]
    );

    let redraw = responsive.resize(Size::new(300.0, 100.0)).unwrap().unwrap();
    assert_eq!(chart.config::<f64>("width").unwrap(), 300.0);
    assert_eq!(
        doc.select_all("rect").attr_values("x"),
        [Some(AttrValue::from(0.0)), Some(AttrValue::from(150.0))]
    );
    doc.advance(Duration::from_millis(50));
    assert_eq!(redraw.now_or_never(), Some(Ok(())));

    chart.destroy();
    assert!(!responsive.has_data());
    assert!(responsive.resize(Size::new(10.0, 10.0)).is_none());
}

#[test]
fn test_responsive_reports_config_errors() {
    let doc = Document::new("svg");
    let chart = bar_chart(&doc);
    let responsive = Rc::new(ResponsivePlugin::new(|size: Size| {
        ConfigBatch::new().with("height", size.height)
    }));
    chart.use_plugin(responsive.clone(), None).unwrap();
    let _ = chart.draw(vec![1.0]);

    let result = responsive.resize(Size::new(1.0, 2.0)).unwrap();
    assert!(result.is_err());
}

#[test]
fn test_plugins_coexist() {
    let doc = Document::new("svg");
    let chart = bar_chart(&doc);
    let crosshair = Rc::new(CrosshairPlugin::new(doc.root(), 120.0));
    let tooltip = Rc::new(TooltipPlugin::new(
        doc.root(),
        |_: &Chart<Vec<f64>>, tooltip, _: &Vec<f64>| tooltip.hide(),
    ));
    chart.use_plugin(crosshair.clone(), None).unwrap();
    chart.use_plugin(tooltip.clone(), None).unwrap();

    let _ = chart.draw(vec![1.0]);
    crosshair.show(10.0);
    assert_eq!(doc.select_all("line").attr_values("display"), [None]);

    chart.destroy();
    assert!(doc.select_all("line").is_empty());
    assert!(doc.select_all(".d3bp-tooltip").is_empty());
    assert_eq!(doc.select_all("rect").len(), 1);
}
