use smallvec::smallvec;

use crate::api::RenderContext;
use crate::core::{Point, Rect, Size};
use crate::error::ChartResult;
use crate::render::{Color, Drawable, DrawableId, DrawablePool, DrawableSetup, LayerSurface, Paint};

use super::{LabelStyle, RendererPlugin};

/// Dashed line at the last close with a boxed price at the right edge.
#[derive(Debug)]
pub struct LatestPriceIndicator {
    id: String,
    label: LabelStyle,
    line_color: Color,
    right_space: f64,
    drawables: DrawablePool,
    parts: Option<(DrawableId, DrawableId)>,
    z_position: f64,
}

/// Where the latest-price line and box land for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestPricePlacement {
    pub line_start: Point,
    pub line_end: Point,
    pub label_frame: Rect,
}

impl LatestPriceIndicator {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let line_color = Color::from_hex(0x8a8f99);
        Self {
            id: id.into(),
            label: LabelStyle::boxed(Color::WHITE, Color::from_hex(0x2b3139))
                .with_border(line_color),
            line_color,
            right_space: 10.0,
            drawables: DrawablePool::new(DrawableSetup::default()),
            parts: None,
            z_position: 0.0,
        }
    }

    #[must_use]
    pub fn with_label_style(mut self, label: LabelStyle) -> Self {
        self.label = label;
        self
    }

    #[must_use]
    pub fn with_line_color(mut self, color: Color) -> Self {
        self.line_color = color;
        self
    }

    #[must_use]
    pub fn with_right_space(mut self, right_space: f64) -> Self {
        self.right_space = right_space;
        self
    }

    /// Places the box at the right edge, vertically centred on the last
    /// close, then clamps it between the top of the content area and the
    /// bottom of the group.
    ///
    /// The line starts at the right edge of the last bar when that bar is
    /// visible, otherwise at the left edge of the viewport.
    #[must_use]
    pub fn placement(
        &self,
        context: &RenderContext<'_>,
        close_y: f64,
        label_size: Size,
    ) -> LatestPricePlacement {
        let max_x = context.geometry.max_x();
        let x = max_x - label_size.width - self.right_space;
        let centred = close_y - label_size.height / 2.0;
        let y = centred
            .max(context.content_rect.min_y())
            .min(context.group_content_rect.max_y() - label_size.height);
        let label_frame = Rect::new(x, y, label_size.width, label_size.height);

        let count = context.layout.data_count();
        let last_visible = count > 0 && context.visible_range.contains(&(count - 1));
        let start_x = if last_visible {
            context.layout.pixel_x(count - 1) + context.configuration.bar_width
        } else {
            context.geometry.min_x()
        };
        let line_y = label_frame.mid_y();
        LatestPricePlacement {
            line_start: Point::new(start_x, line_y),
            line_end: Point::new(max_x, line_y),
            label_frame,
        }
    }

    fn hide_all(&mut self) {
        if let Some((line, label)) = self.parts {
            for id in [line, label] {
                if let Some(drawable) = self.drawables.get_mut(id) {
                    drawable.hidden = true;
                }
            }
        }
    }
}

impl RendererPlugin for LatestPriceIndicator {
    fn id(&self) -> &str {
        &self.id
    }

    fn setup(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.set_contents_scale(surface.contents_scale());
        let line = self.drawables.dequeue(surface);
        let label = self.drawables.dequeue(surface);
        self.parts = Some((line, label));
        self.hide_all();
        self.drawables.set_z_position(self.z_position);
    }

    fn render(
        &mut self,
        _surface: &mut LayerSurface<'_>,
        context: &RenderContext<'_>,
    ) -> ChartResult<()> {
        let Some((line, label)) = self.parts else {
            return Ok(());
        };
        let (Some(transform), Some(last)) = (context.value_transform(), context.values.last_quote())
        else {
            self.hide_all();
            return Ok(());
        };

        let text = context.formatter.format(last.close);
        let caption_font = &context.configuration.caption_font;
        let size = self
            .label
            .fitting_size(&text, caption_font, context.text_metrics);
        let placement = self.placement(context, transform.price_to_y(last.close), size);

        if let Some(drawable) = self.drawables.get_mut(line) {
            drawable.frame = context.group_content_rect;
            drawable.paint = Paint {
                dash: smallvec![2.0, 2.0],
                ..Paint::stroked(self.line_color, 1.0)
            };
            let points = drawable.polyline_points_mut();
            points.clear();
            points.push(placement.line_start);
            points.push(placement.line_end);
            drawable.hidden = false;
        }
        if let Some(drawable) = self.drawables.get_mut(label) {
            self.label.apply(
                drawable,
                &text,
                caption_font,
                placement.label_frame,
                context.pixel_scale(),
            );
        }
        Ok(())
    }

    fn tear_down(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.tear_down(surface);
        self.parts = None;
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
