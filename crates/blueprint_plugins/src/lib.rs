//! d3-blueprint plugins
//!
//! Ready-made [`Plugin`](blueprint_charts::Plugin) implementations:
//!
//! - [`TooltipPlugin`]: a text group positioned next to a point of interest
//! - [`CrosshairPlugin`]: a dashed vertical guide line
//! - [`ResponsivePlugin`]: re-applies size-dependent config and redraws

pub mod crosshair;
pub mod responsive;
pub mod tooltip;

pub use crosshair::CrosshairPlugin;
pub use responsive::{ResponsivePlugin, Size};
pub use tooltip::{Tooltip, TooltipLine, TooltipPlugin};
