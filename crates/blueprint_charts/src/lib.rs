//! d3-blueprint charts
//!
//! Reusable chart components built from layers.
//!
//! - [`Layer`]: one data join whose handlers run in the fixed phase order
//!   `update`, `enter`, `merge`, `exit`, each optionally animated
//! - [`Chart`]: drives its layers and attached charts through one draw,
//!   with config, lifecycle hooks and `preDraw`/`postDraw`/`postTransition`
//!   events
//! - [`Plugin`]: installable cross-cutting behavior with its own teardown
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use blueprint_charts::{Chart, Handler, LayerOptions};
//! use blueprint_scene::{Document, EnterSelection, Selection};
//! use futures::FutureExt;
//!
//! let doc = Document::new("svg");
//! let chart: Chart<Vec<f64>> = Chart::plain(doc.root());
//! chart
//!     .define_layer(
//!         "bars",
//!         doc.root().append("g"),
//!         LayerOptions::new(
//!             |base: &Selection, data: &Vec<f64>| Ok(base.select_all("rect").data_by_index(data)),
//!             |enter: &EnterSelection| Ok(enter.append("rect")),
//!         )
//!         .on("merge:transition", Handler::transition(|t| {
//!             t.duration(Duration::from_millis(200))
//!                 .attr_with("height", |v: &f64, _| *v);
//!         })),
//!     )
//!     .unwrap();
//!
//! let mut draw = chart.draw(vec![3.0, 5.0]);
//! assert!((&mut draw).now_or_never().is_none());
//! doc.advance(Duration::from_millis(200));
//! assert_eq!(draw.now_or_never(), Some(Ok(())));
//! ```

pub mod chart;
pub mod events;
pub mod layer;
pub mod phases;
pub mod plugin;

pub use chart::{Blueprint, Chart, Draw, WeakChart};
pub use events::{ChartEvent, ChartEventKind, Listener};
pub use layer::{Handler, Layer, LayerOptions};
pub use phases::{LayerTransitions, PhaseSelections};
pub use plugin::Plugin;
