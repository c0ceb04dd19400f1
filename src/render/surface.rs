use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::{Point, Rect, Size};

use super::DrawableId;

/// Identifies the renderer plugin that owns a drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(u32);

impl LayerId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Globally unique drawable address: owning layer plus pool handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DrawableKey {
    pub layer: LayerId,
    pub drawable: DrawableId,
}

/// Scroll position and visible size reported by the host view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    pub content_offset: Point,
    pub viewport: Size,
}

impl SurfaceGeometry {
    #[must_use]
    pub const fn new(content_offset: Point, viewport: Size) -> Self {
        Self {
            content_offset,
            viewport,
        }
    }

    /// Viewport expressed in content coordinates.
    #[must_use]
    pub fn visible_rect(self) -> Rect {
        Rect::from_origin_size(self.content_offset, self.viewport)
    }

    #[must_use]
    pub fn min_x(self) -> f64 {
        self.content_offset.x
    }

    #[must_use]
    pub fn max_x(self) -> f64 {
        self.content_offset.x + self.viewport.width
    }
}

/// Display surface the chart draws into.
///
/// The host owns the surface lifecycle; the pipeline only attaches and
/// detaches drawables and reads the current geometry.
pub trait HostSurface {
    fn geometry(&self) -> SurfaceGeometry;

    /// Physical pixels per logical point of the display.
    fn contents_scale(&self) -> f64 {
        1.0
    }

    fn attach(&mut self, key: DrawableKey);
    fn detach(&mut self, key: DrawableKey);
}

/// Host surface view scoped to one plugin's layer.
pub struct LayerSurface<'a> {
    host: &'a mut dyn HostSurface,
    layer: LayerId,
}

impl<'a> LayerSurface<'a> {
    pub fn new(host: &'a mut dyn HostSurface, layer: LayerId) -> Self {
        Self { host, layer }
    }

    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    #[must_use]
    pub fn geometry(&self) -> SurfaceGeometry {
        self.host.geometry()
    }

    #[must_use]
    pub fn contents_scale(&self) -> f64 {
        self.host.contents_scale()
    }

    pub fn attach(&mut self, drawable: DrawableId) {
        self.host.attach(DrawableKey {
            layer: self.layer,
            drawable,
        });
    }

    pub fn detach(&mut self, drawable: DrawableId) {
        self.host.detach(DrawableKey {
            layer: self.layer,
            drawable,
        });
    }
}

/// Headless surface that records attachment state.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    geometry: SurfaceGeometry,
    contents_scale: Option<f64>,
    attached: IndexSet<DrawableKey>,
    pub attach_calls: usize,
    pub detach_calls: usize,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            geometry: SurfaceGeometry::new(Point::default(), viewport),
            ..Self::default()
        }
    }

    pub fn set_content_offset(&mut self, offset: Point) {
        self.geometry.content_offset = offset;
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.geometry.viewport = viewport;
    }

    pub fn set_contents_scale(&mut self, contents_scale: f64) {
        self.contents_scale = Some(contents_scale);
    }

    #[must_use]
    pub fn is_attached(&self, key: DrawableKey) -> bool {
        self.attached.contains(&key)
    }

    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Attached keys belonging to `layer`, in attachment order.
    pub fn attached_in_layer(&self, layer: LayerId) -> impl Iterator<Item = DrawableKey> + '_ {
        self.attached
            .iter()
            .copied()
            .filter(move |key| key.layer == layer)
    }
}

impl HostSurface for RecordingSurface {
    fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    fn contents_scale(&self) -> f64 {
        self.contents_scale.unwrap_or(1.0)
    }

    fn attach(&mut self, key: DrawableKey) {
        self.attach_calls += 1;
        self.attached.insert(key);
    }

    fn detach(&mut self, key: DrawableKey) {
        self.detach_calls += 1;
        self.attached.shift_remove(&key);
    }
}
