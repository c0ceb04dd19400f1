use crate::api::RenderContext;
use crate::core::{Point, Rect, Size};
use crate::error::ChartResult;
use crate::render::{Color, Drawable, DrawableId, DrawablePool, DrawableSetup, LayerSurface};

use super::{LabelStyle, RendererPlugin};

/// Boxed value under the pointer, pinned to the viewport edge on the pointer's side.
#[derive(Debug)]
pub struct SelectedValueIndicator {
    id: String,
    label: LabelStyle,
    edge_space: f64,
    drawables: DrawablePool,
    label_id: Option<DrawableId>,
}

impl SelectedValueIndicator {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: LabelStyle::boxed(Color::WHITE, Color::from_hex(0x474d57)),
            edge_space: 4.0,
            drawables: DrawablePool::new(DrawableSetup::default()),
            label_id: None,
        }
    }

    #[must_use]
    pub fn with_label_style(mut self, label: LabelStyle) -> Self {
        self.label = label;
        self
    }

    #[must_use]
    pub fn with_edge_space(mut self, edge_space: f64) -> Self {
        self.edge_space = edge_space;
        self
    }

    /// Box at the right edge when the pointer is in the right half of the
    /// viewport, at the left edge otherwise; vertically centred on the pointer.
    #[must_use]
    pub fn label_frame(&self, context: &RenderContext<'_>, pointer: Point, size: Size) -> Rect {
        let visible = context.geometry.visible_rect();
        let x = if pointer.x > visible.mid_x() {
            visible.max_x() - self.edge_space - size.width
        } else {
            visible.min_x() + self.edge_space
        };
        Rect::new(x, pointer.y - size.height / 2.0, size.width, size.height)
    }

    fn hide(&mut self) {
        if let Some(drawable) = self.label_id.and_then(|id| self.drawables.get_mut(id)) {
            drawable.hidden = true;
        }
    }
}

impl RendererPlugin for SelectedValueIndicator {
    fn id(&self) -> &str {
        &self.id
    }

    fn setup(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.set_contents_scale(surface.contents_scale());
        self.label_id = Some(self.drawables.dequeue(surface));
        self.drawables.set_z_position(f64::MAX);
        self.hide();
    }

    fn render(
        &mut self,
        _surface: &mut LayerSurface<'_>,
        context: &RenderContext<'_>,
    ) -> ChartResult<()> {
        let Some(label_id) = self.label_id else {
            return Ok(());
        };
        let pointer = context
            .indicator_position
            .filter(|pointer| context.group_content_rect.contains_y(pointer.y));
        let (Some(transform), Some(pointer)) = (context.value_transform(), pointer) else {
            self.hide();
            return Ok(());
        };

        let text = context.formatter.format(transform.y_to_price(pointer.y));
        let caption_font = &context.configuration.caption_font;
        let size = self
            .label
            .fitting_size(&text, caption_font, context.text_metrics);
        let frame = self.label_frame(context, pointer, size);
        if let Some(drawable) = self.drawables.get_mut(label_id) {
            self.label
                .apply(drawable, &text, caption_font, frame, context.pixel_scale());
            drawable.z_position = f64::MAX;
        }
        Ok(())
    }

    fn tear_down(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.tear_down(surface);
        self.label_id = None;
    }

    fn update_z_position(&mut self, _z_position: f64) {
        self.drawables.set_z_position(f64::MAX);
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

    use super::SelectedValueIndicator;
    use crate::core::{ExtremePoint, Point, Rect, Size};
    use crate::extensions::RendererPlugin;
    use crate::extensions::test_support::{ContextFixture, rising_quotes};
    use crate::render::{LayerId, LayerSurface, RecordingSurface};

    const GROUP: Rect = Rect::new(0.0, 0.0, 400.0, 220.0);
    const CONTENT: Rect = Rect::new(0.0, 10.0, 400.0, 200.0);

    #[test]
    fn label_sits_on_the_pointer_side() {
        let fixture = ContextFixture::new(rising_quotes(100));
        let context = fixture.context(0.0, 400.0, GROUP, CONTENT, None);
        let indicator = SelectedValueIndicator::new("selected-value");
        let size = Size::new(50.0, 20.0);

        let right = indicator.label_frame(&context, Point::new(300.0, 60.0), size);
        assert_relative_eq!(right.x, 400.0 - 4.0 - 50.0);
        assert_relative_eq!(right.y, 50.0);

        let left = indicator.label_frame(&context, Point::new(100.0, 60.0), size);
        assert_relative_eq!(left.x, 4.0);

        // Exactly at the midpoint counts as the left half.
        let middle = indicator.label_frame(&context, Point::new(200.0, 60.0), size);
        assert_relative_eq!(middle.x, 4.0);
    }

    #[test]
    fn pointer_outside_group_hides_label() {
        let fixture = ContextFixture::new(rising_quotes(100));
        let mut host = RecordingSurface::new(Size::new(400.0, 220.0));
        let mut surface = LayerSurface::new(&mut host, LayerId::new(0));
        let mut indicator = SelectedValueIndicator::new("selected-value");
        indicator.setup(&mut surface);

        let mut context = fixture.context(
            0.0,
            400.0,
            GROUP,
            CONTENT,
            Some(ExtremePoint::new(100.0, 300.0)),
        );
        context.indicator_position = Some(Point::new(100.0, 110.0));
        indicator.render(&mut surface, &context).expect("render");
        indicator.visit_drawables(&mut |drawable| {
            assert!(!drawable.hidden);
            // Middle of the content area reads the middle of the scale.
            assert_eq!(
                drawable.text().map(|text| text.text.as_str()),
                Some("200.00")
            );
        });

        context.indicator_position = Some(Point::new(100.0, 260.0));
        indicator.render(&mut surface, &context).expect("render");
        indicator.visit_drawables(&mut |drawable| assert!(drawable.hidden));
    }
}
