use std::ops::Range;

use crate::api::{ContextValues, RenderContext};
use crate::core::ExtremePoint;
use crate::error::ChartResult;
use crate::render::{Drawable, LayerSurface};

/// One drawing layer of the chart.
///
/// The pipeline drives every plugin through the same lifecycle:
/// `setup` once when attached, `render` once per frame, `tear_down` once when
/// detached. Plugins own their drawables (usually through a
/// [`DrawablePool`](crate::render::DrawablePool)) and expose them for scene
/// extraction through `visit_drawables`.
pub trait RendererPlugin {
    /// Unique, non-empty identifier inside one pipeline.
    fn id(&self) -> &str;

    /// Creates lifetime drawables. Runs once per attachment.
    fn setup(&mut self, _surface: &mut LayerSurface<'_>) {}

    /// Updates drawables for the current frame.
    ///
    /// Returning `Err` skips this plugin for the frame only.
    fn render(
        &mut self,
        surface: &mut LayerSurface<'_>,
        context: &RenderContext<'_>,
    ) -> ChartResult<()>;

    /// Detaches and releases every drawable the plugin owns.
    fn tear_down(&mut self, surface: &mut LayerSurface<'_>);

    /// Stacking position assigned by the pipeline.
    fn update_z_position(&mut self, z_position: f64);

    /// Value range this plugin needs visible for `visible_range`.
    fn extreme_point(
        &self,
        _values: &ContextValues,
        _visible_range: Range<usize>,
    ) -> Option<ExtremePoint> {
        None
    }

    /// Derives per-series values after every data change.
    fn process_quotes(&self, _values: &mut ContextValues) {}

    /// Calls `visitor` for each drawable currently attached to the surface.
    fn visit_drawables<'a>(&'a self, visitor: &mut dyn FnMut(&'a Drawable));
}
