//! Integration tests for data joins driving transitions
//!
//! These tests verify that:
//! - A general update pattern (enter, update, exit) keeps nodes in step with data
//! - Exit transitions remove nodes only once they finish
//! - A redraw mid-animation interrupts the earlier transition without hanging it

use std::time::Duration;

use blueprint_animation::{Easing, TransitionEnd};
use blueprint_scene::{Document, Selection};
use futures::FutureExt;

#[derive(Clone, Debug)]
struct Slice {
    key: &'static str,
    value: f64,
}

fn slices(pairs: &[(&'static str, f64)]) -> Vec<Slice> {
    pairs
        .iter()
        .map(|(key, value)| Slice { key, value: *value })
        .collect()
}

/// One general-update-pattern pass with animated enter, update and exit
fn render(group: &Selection, data: &[Slice]) -> TransitionEnd {
    let join = group.select_all("rect.slice").data_by_key(data, |s| s.key);

    let entered = join.enter().append("rect");
    entered.classed("slice", true).attr("width", 0.0);

    let merged = join.merge_entered(&entered);
    merged.attr_with("x", |_: &Slice, i| i as f64 * 20.0);
    let grow = merged.transition();
    grow.duration(Duration::from_millis(100))
        .ease(Easing::Linear)
        .attr_with("width", |s: &Slice, _| s.value);

    let shrink = join.exit().transition();
    shrink
        .duration(Duration::from_millis(100))
        .attr("width", 0.0)
        .remove();

    TransitionEnd::all([grow.end(), shrink.end()])
}

#[test]
fn test_update_pattern_tracks_data() {
    let doc = Document::new("svg");
    let group = doc.root().append("g");

    let mut end = render(&group, &slices(&[("a", 10.0), ("b", 20.0)]));
    assert!((&mut end).now_or_never().is_none());
    doc.advance(Duration::from_millis(100));
    assert_eq!(end.now_or_never(), Some(()));

    let rects = group.select_all("rect.slice");
    assert_eq!(rects.attr_values("width"), [Some(10.0.into()), Some(20.0.into())]);

    let mut end = render(&group, &slices(&[("b", 40.0), ("c", 60.0)]));
    doc.advance(Duration::from_millis(50));
    // "a" is fading out but still present.
    assert_eq!(group.select_all("rect.slice").len(), 3);
    assert!((&mut end).now_or_never().is_none());

    doc.advance(Duration::from_millis(50));
    assert_eq!(end.now_or_never(), Some(()));

    let rects = group.select_all("rect.slice");
    let keys: Vec<&str> = rects.data::<Slice>().iter().map(|s| s.key).collect();
    assert_eq!(keys, ["b", "c"]);
    assert_eq!(rects.attr_values("width"), [Some(40.0.into()), Some(60.0.into())]);
    assert!(!doc.has_active_transitions());
}

#[test]
fn test_redraw_interrupts_running_transition() {
    let doc = Document::new("svg");
    let group = doc.root().append("g");

    let first = render(&group, &slices(&[("a", 100.0)]));
    doc.advance(Duration::from_millis(50));

    let second = render(&group, &slices(&[("a", 0.0)]));
    doc.advance(Duration::from_millis(1));
    assert_eq!(first.now_or_never(), Some(()));

    // The new transition starts from wherever the old one left off.
    let width = group.select_all("rect").attr_values("width")[0]
        .as_ref()
        .and_then(|w| w.as_number())
        .unwrap();
    assert!(width > 45.0 && width < 55.0, "width was {width}");

    doc.advance(Duration::from_millis(100));
    assert_eq!(second.now_or_never(), Some(()));
    assert_eq!(
        group.select_all("rect").attr_values("width"),
        [Some(0.0.into())]
    );
}

#[test]
fn test_markup_reflects_final_tree() {
    let doc = Document::new("svg");
    let group = doc.root().append("g");
    let _ = render(&group, &slices(&[("a", 5.0)]));
    doc.advance(Duration::from_millis(100));

    assert_eq!(
        doc.markup(),
        "<svg>\n  <g>\n    <rect class=\"slice\" width=\"5\" x=\"0\"/>\n  </g>\n</svg>\n"
    );
}
