mod drawable;
mod frame;
mod null_renderer;
mod pool;
mod primitives;
mod surface;
mod text;

pub use drawable::{
    Drawable, DrawableContent, DrawableId, DrawableSetup, ImageRef, TextContent,
};
pub use frame::{RenderFrame, SceneItem};
pub use null_renderer::NullRenderer;
pub use pool::DrawablePool;
pub use primitives::{Color, FontSpec, LineDash, Paint, TextAlign};
pub use surface::{
    DrawableKey, HostSurface, LayerId, LayerSurface, RecordingSurface, SurfaceGeometry,
};
pub use text::{EstimatedTextMetrics, TextMetrics};

use crate::error::ChartResult;

/// Contract implemented by any drawing backend.
///
/// Backends receive the z-ordered scene extracted after all plugins ran, so
/// drawing code stays isolated from layout and scale logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame<'_>) -> ChartResult<()>;
}
