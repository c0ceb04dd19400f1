use smallvec::SmallVec;

use crate::api::{RenderContext, ValueFormatter};
use crate::core::{ChartLayout, Insets, Rect, ValueTransform};
use crate::error::ChartResult;
use crate::render::{Drawable, DrawablePool, DrawableSetup, LayerSurface, TextAlign};

use super::{LabelStyle, RendererPlugin};

/// Value captions along the right edge, one per horizontal grid line.
pub struct ValueAnnotation {
    id: String,
    formatter: Option<Box<dyn ValueFormatter>>,
    label: LabelStyle,
    labels: DrawablePool,
    z_position: f64,
}

impl std::fmt::Debug for ValueAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueAnnotation")
            .field("id", &self.id)
            .field("visible_labels", &self.labels.visible_count())
            .finish_non_exhaustive()
    }
}

/// Grid-line y positions across the group with the value each one reads.
///
/// Lines are spaced evenly from the top of the group. Values are read
/// against the content area, so lines inside the group padding show values
/// just outside the scale.
#[must_use]
pub fn value_grid_positions(
    layout: ChartLayout,
    transform: ValueTransform,
    group_rect: Rect,
) -> SmallVec<[(f64, f64); 16]> {
    let count = layout.vertical_grid_count(group_rect.height);
    let interval = group_rect.height / count as f64;
    let unit = transform.value_per_point();
    let low = transform.extreme().min;
    let base_y = transform.content_rect().max_y();
    (0..=count)
        .map(|k| {
            let y = group_rect.min_y() + interval * k as f64;
            (y, low + (base_y - y) * unit)
        })
        .collect()
}

impl ValueAnnotation {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            formatter: None,
            label: LabelStyle::default()
                .with_insets(Insets::new(0.0, 0.0, 0.0, 5.0))
                .with_align(TextAlign::Right),
            labels: DrawablePool::new(DrawableSetup::default()),
            z_position: 0.0,
        }
    }

    /// Formatter used instead of the chart's preferred one.
    #[must_use]
    pub fn with_formatter(mut self, formatter: Box<dyn ValueFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn with_label_style(mut self, label: LabelStyle) -> Self {
        self.label = label;
        self
    }
}

impl RendererPlugin for ValueAnnotation {
    fn id(&self) -> &str {
        &self.id
    }

    fn setup(&mut self, surface: &mut LayerSurface<'_>) {
        self.labels.set_contents_scale(surface.contents_scale());
    }

    fn render(
        &mut self,
        surface: &mut LayerSurface<'_>,
        context: &RenderContext<'_>,
    ) -> ChartResult<()> {
        let Some(transform) = context.value_transform() else {
            self.labels.resize_visible(0, surface);
            return Ok(());
        };
        let group_rect = context.group_content_rect;
        let positions = value_grid_positions(context.layout, transform, group_rect);
        self.labels.resize_visible(positions.len(), surface);

        let formatter: &dyn ValueFormatter = match &self.formatter {
            Some(formatter) => formatter.as_ref(),
            None => context.formatter,
        };
        let caption_font = &context.configuration.caption_font;
        let mut style = self.label.clone();
        style.text_color = context.configuration.style.caption_color;
        let max_x = context.geometry.max_x();
        let last = positions.len().saturating_sub(1);
        for (slot, (y, value)) in positions.into_iter().enumerate() {
            let text = formatter.format(value);
            let size = style.fitting_size(&text, caption_font, context.text_metrics);
            let y = if slot == last {
                y.min(group_rect.max_y() - size.height)
            } else {
                y
            };
            let frame = Rect::new(max_x - size.width, y, size.width, size.height);
            if let Some(drawable) = self.labels.visible_mut(slot) {
                style.apply(drawable, &text, caption_font, frame, context.pixel_scale());
                drawable.z_position = self.z_position;
            }
        }
        Ok(())
    }

    fn tear_down(&mut self, surface: &mut LayerSurface<'_>) {
        self.labels.tear_down(surface);
    }

    fn update_z_position(&mut self, z_position: f64) {
        self.z_position = z_position;
        self.labels.set_z_position(z_position);
    }

    fn visit_drawables<'a>(&'a self, visitor: &mut dyn FnMut(&'a Drawable)) {
        for drawable in self.labels.visible_drawables() {
            visitor(drawable);
        }
    }
}
