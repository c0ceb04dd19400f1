use smallvec::SmallVec;

use crate::api::{DateFormatter, PatternDateFormatter, RenderContext};
use crate::core::{ChartLayout, Insets, Rect};
use crate::error::ChartResult;
use crate::render::{Drawable, DrawablePool, DrawableSetup, LayerSurface};

use super::{LabelStyle, RendererPlugin};

/// Date captions along the time axis, one per vertical grid line.
pub struct TimeAnnotation {
    id: String,
    date_formatter: Box<dyn DateFormatter>,
    label: LabelStyle,
    labels: DrawablePool,
    z_position: f64,
}

impl std::fmt::Debug for TimeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeAnnotation")
            .field("id", &self.id)
            .field("visible_labels", &self.labels.visible_count())
            .finish_non_exhaustive()
    }
}

/// Grid-line x positions paired with the quote each one is labelled with.
///
/// Lines are spaced evenly across the viewport starting at its left edge.
/// A line left of the first bar is labelled with the first quote; lines
/// past the data are not labelled.
#[must_use]
pub fn time_grid_positions(
    layout: ChartLayout,
    min_x: f64,
    viewport_width: f64,
) -> SmallVec<[(f64, usize); 16]> {
    let count = layout.horizontal_grid_count(viewport_width);
    let interval = viewport_width / count as f64;
    (0..=count)
        .filter_map(|k| {
            let x = min_x + interval * k as f64;
            let index = if x < 0.0 && layout.data_count() > 0 {
                Some(0)
            } else {
                layout.index_at(x)
            };
            index.map(|index| (x, index))
        })
        .collect()
}

impl TimeAnnotation {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date_formatter: Box::new(PatternDateFormatter::default()),
            label: LabelStyle::default().with_insets(Insets::ZERO),
            labels: DrawablePool::new(DrawableSetup::default()),
            z_position: 0.0,
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
}

impl RendererPlugin for TimeAnnotation {
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
        let positions = time_grid_positions(
            context.layout,
            context.geometry.min_x(),
            context.geometry.viewport.width,
        );
        let quotes = context.quotes();
        let dated: SmallVec<[(f64, _); 16]> = positions
            .into_iter()
            .filter_map(|(x, index)| {
                quotes
                    .get(index)
                    .and_then(|quote| quote.date())
                    .map(|date| (x, date))
            })
            .collect();
        self.labels.resize_visible(dated.len(), surface);

        let caption_font = &context.configuration.caption_font;
        let mut style = self.label.clone();
        style.text_color = context.configuration.style.caption_color;
        let mid_y = context.content_rect.mid_y();
        for (slot, (x, date)) in dated.into_iter().enumerate() {
            let text = self.date_formatter.format(date);
            let size = style.fitting_size(&text, caption_font, context.text_metrics);
            let frame = Rect::new(
                x - size.width / 2.0,
                mid_y - size.height / 2.0,
                size.width,
                size.height,
            );
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
