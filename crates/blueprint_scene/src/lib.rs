//! d3-blueprint scene
//!
//! A retained, in-memory element tree with the data-binding surface charts
//! draw through:
//!
//! - [`Document`]: the tree plus the clock that drives its transitions
//! - [`Selection`]: ordered node sets with attribute, text and class setters
//! - [`Join`]: keyed or indexed data joins split into enter, update and exit
//! - [`Transition`]: interruptible attribute animations with a completion future
//!
//! Nothing here renders. [`Document::markup`] dumps the tree for inspection.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use blueprint_scene::Document;
//!
//! let doc = Document::new("svg");
//! let join = doc.select_all("rect").data_by_index(&[10.0, 20.0]);
//! let bars = join.enter().append("rect");
//! bars.attr("height", 0.0);
//! bars.transition()
//!     .duration(Duration::from_millis(100))
//!     .attr_with("height", |v: &f64, _| *v);
//!
//! doc.advance(Duration::from_millis(100));
//! assert_eq!(bars.attr_values("height")[1], Some(20.0.into()));
//! ```

pub mod document;
pub mod join;
pub mod scene;
pub mod selection;
pub mod transition;

pub use document::Document;
pub use join::{EnterSelection, Join};
pub use scene::{Datum, Node, NodeId, Scene, Selector};
pub use selection::Selection;
pub use transition::Transition;
