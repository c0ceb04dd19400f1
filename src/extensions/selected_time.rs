use crate::api::{DateFormatter, PatternDateFormatter, RenderContext};
use crate::core::{Rect, Size};
use crate::error::ChartResult;
use crate::render::{Color, Drawable, DrawableId, DrawablePool, DrawableSetup, LayerSurface};

use super::{LabelStyle, RendererPlugin};

/// Boxed date of the selected quote, centred under its bar.
///
/// Usually registered in the time-axis group. It always draws above every
/// other layer.
pub struct SelectedTimeIndicator {
    id: String,
    date_formatter: Box<dyn DateFormatter>,
    label: LabelStyle,
    drawables: DrawablePool,
    label_id: Option<DrawableId>,
}

impl std::fmt::Debug for SelectedTimeIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedTimeIndicator")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl SelectedTimeIndicator {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date_formatter: Box::new(PatternDateFormatter::default()),
            label: LabelStyle::boxed(Color::WHITE, Color::from_hex(0x474d57)),
            drawables: DrawablePool::new(DrawableSetup::default()),
            label_id: None,
        }
    }

    #[must_use]
    pub fn with_date_formatter(mut self, formatter: Box<dyn DateFormatter>) -> Self {
        self.date_formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_label_style(mut self, label: LabelStyle) -> Self {
        self.label = label;
        self
    }

    /// Centres the box on `mid_x`, keeps it inside the viewport and centres it
    /// vertically in the content area.
    #[must_use]
    pub fn label_frame(context: &RenderContext<'_>, mid_x: f64, size: Size) -> Rect {
        let min_x = context.geometry.min_x();
        let max_x = context.geometry.max_x() - size.width;
        let x = (mid_x - size.width / 2.0).max(min_x).min(max_x);
        let content = context.content_rect;
        let y = (content.max_y() - content.min_y() - size.height) / 2.0 + content.min_y();
        Rect::new(x, y, size.width, size.height)
    }

    fn hide(&mut self) {
        if let Some(drawable) = self.label_id.and_then(|id| self.drawables.get_mut(id)) {
            drawable.hidden = true;
        }
    }
}

impl RendererPlugin for SelectedTimeIndicator {
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
        let Some((index, date)) = context
            .selected_quote()
            .and_then(|(index, quote)| quote.date().map(|date| (index, date)))
        else {
            self.hide();
            return Ok(());
        };

        let text = self.date_formatter.format(date);
        let caption_font = &context.configuration.caption_font;
        let size = self
            .label
            .fitting_size(&text, caption_font, context.text_metrics);
        let frame = Self::label_frame(context, context.layout.mid_x(index), size);
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

    /// Pinned above every other layer regardless of registration order.
    fn update_z_position(&mut self, _z_position: f64) {
        self.drawables.set_z_position(f64::MAX);
    }

    fn visit_drawables<'a>(&'a self, visitor: &mut dyn FnMut(&'a Drawable)) {
        for drawable in self.drawables.visible_drawables() {
            visitor(drawable);
        }
    }
}
