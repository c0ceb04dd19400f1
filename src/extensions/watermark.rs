use serde::{Deserialize, Serialize};

use crate::api::RenderContext;
use crate::core::{Point, Rect};
use crate::error::ChartResult;
use crate::render::{
    Drawable, DrawableContent, DrawableId, DrawablePool, DrawableSetup, ImageRef, LayerSurface,
};

use super::RendererPlugin;

/// Corner a watermark is pinned to, with its margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WatermarkPosition {
    LeftTop { left: f64, top: f64 },
    LeftBottom { left: f64, bottom: f64 },
    RightTop { right: f64, top: f64 },
    RightBottom { right: f64, bottom: f64 },
}

/// Static image pinned to a corner of the visible part of its group.
#[derive(Debug)]
pub struct WatermarkRenderer {
    id: String,
    image: ImageRef,
    position: WatermarkPosition,
    drawables: DrawablePool,
    mark: Option<DrawableId>,
    z_position: f64,
}

impl WatermarkRenderer {
    #[must_use]
    pub fn new(id: impl Into<String>, image: ImageRef, position: WatermarkPosition) -> Self {
        Self {
            id: id.into(),
            image,
            position,
            drawables: DrawablePool::new(DrawableSetup::default()),
            mark: None,
            z_position: 0.0,
        }
    }

    /// Frame of the watermark for the current scroll position.
    #[must_use]
    pub fn frame(&self, context: &RenderContext<'_>) -> Rect {
        let size = self.image.size;
        let group = context.group_content_rect;
        let min_x = context.geometry.min_x();
        let max_x = context.geometry.max_x();
        let origin = match self.position {
            WatermarkPosition::LeftTop { left, top } => Point::new(min_x + left, group.min_y() + top),
            WatermarkPosition::LeftBottom { left, bottom } => {
                Point::new(min_x + left, group.max_y() - bottom - size.height)
            }
            WatermarkPosition::RightTop { right, top } => {
                Point::new(max_x - right - size.width, group.min_y() + top)
            }
            WatermarkPosition::RightBottom { right, bottom } => Point::new(
                max_x - right - size.width,
                group.max_y() - bottom - size.height,
            ),
        };
        Rect::from_origin_size(origin, size)
    }
}

impl RendererPlugin for WatermarkRenderer {
    fn id(&self) -> &str {
        &self.id
    }

    fn setup(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.set_contents_scale(surface.contents_scale());
        let mark = self.drawables.dequeue(surface);
        if let Some(drawable) = self.drawables.get_mut(mark) {
            drawable.content = DrawableContent::Image(self.image.clone());
            drawable.frame = Rect::from_origin_size(Point::default(), self.image.size);
            drawable.z_position = self.z_position;
        }
        self.mark = Some(mark);
    }

    fn render(
        &mut self,
        _surface: &mut LayerSurface<'_>,
        context: &RenderContext<'_>,
    ) -> ChartResult<()> {
        let frame = self.frame(context);
        if let Some(drawable) = self.mark.and_then(|id| self.drawables.get_mut(id)) {
            drawable.frame = frame;
        }
        Ok(())
    }

    fn tear_down(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.tear_down(surface);
        self.mark = None;
    }

    fn update_z_position(&mut self, z_position: f64) {
        self.z_position = z_position;
        self.drawables.set_z_position(z_position);
    }

    fn visit_drawables<'a>(&'a self, visitor: &mut dyn FnMut(&'a Drawable)) {
        for drawable in self.drawables.visible_drawables() {
            visitor(drawable);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{WatermarkPosition, WatermarkRenderer};
    use crate::core::{Rect, Size};
    use crate::extensions::test_support::{ContextFixture, rising_quotes};
    use crate::render::ImageRef;

    #[test]
    fn corners_follow_the_scrolled_viewport() {
        let fixture = ContextFixture::new(rising_quotes(100));
        let group = Rect::new(0.0, 0.0, 400.0, 220.0);
        let context = fixture.context(120.0, 400.0, group, group, None);
        let image = ImageRef::new("logo", Size::new(40.0, 20.0));

        let left_top = WatermarkRenderer::new(
            "mark",
            image.clone(),
            WatermarkPosition::LeftTop { left: 8.0, top: 6.0 },
        );
        let frame = left_top.frame(&context);
        assert_relative_eq!(frame.x, 128.0);
        assert_relative_eq!(frame.y, 6.0);

        let right_bottom = WatermarkRenderer::new(
            "mark",
            image,
            WatermarkPosition::RightBottom {
                right: 8.0,
                bottom: 6.0,
            },
        );
        let frame = right_bottom.frame(&context);
        assert_relative_eq!(frame.x, 520.0 - 8.0 - 40.0);
        assert_relative_eq!(frame.y, 220.0 - 6.0 - 20.0);
        assert_relative_eq!(frame.width, 40.0);
    }
}
