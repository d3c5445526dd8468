//! Plugin protocol

use blueprint_core::Result;

use crate::chart::Chart;
use crate::events::ChartEventKind;

/// Cross-cutting behavior attached to a chart with [`Chart::use_plugin`].
///
/// `install` runs once, immediately. The draw hooks named by [`hooks`] are
/// subscribed under the plugin's namespace and `destroy` runs when the chart
/// is destroyed, in reverse installation order. A hook left out of [`hooks`]
/// never touches an existing listener in the same namespace.
///
/// [`hooks`]: Plugin::hooks
pub trait Plugin<D> {
    /// Default event namespace for the hooks
    fn name(&self) -> Option<&str> {
        None
    }

    /// Events whose hooks get subscribed
    fn hooks(&self) -> &[ChartEventKind] {
        &ChartEventKind::ALL
    }

    fn install(&self, chart: &Chart<D>) -> Result<()>;

    fn pre_draw(&self, _chart: &Chart<D>, _data: &D) {}

    fn post_draw(&self, _chart: &Chart<D>, _data: &D) {}

    fn post_transition(&self, _chart: &Chart<D>, _data: &D) {}

    fn destroy(&self, _chart: &Chart<D>) {}
}
