use crate::api::{ChartConfiguration, ContextValues, DecimalFormatter, RenderContext};
use crate::core::{ChartLayout, ExtremePoint, Point, Quote, Rect, Size};
use crate::render::{EstimatedTextMetrics, SurfaceGeometry};

/// Owned inputs a plugin test borrows a [`RenderContext`] from.
pub(crate) struct ContextFixture {
    pub(crate) values: ContextValues,
    pub(crate) configuration: ChartConfiguration,
    pub(crate) formatter: DecimalFormatter,
    pub(crate) text_metrics: EstimatedTextMetrics,
}

#[must_use]
pub(crate) fn rising_quotes(count: usize) -> Vec<Quote> {
    (0..count)
        .map(|index| {
            let base = 100.0 + index as f64;
            Quote::new(index as f64 * 60.0, base, base + 2.0, base - 2.0, base + 1.0)
                .expect("valid quote")
        })
        .collect()
}

impl ContextFixture {
    #[must_use]
    pub(crate) fn new(quotes: Vec<Quote>) -> Self {
        Self {
            values: ContextValues::new(quotes),
            configuration: ChartConfiguration::default(),
            formatter: DecimalFormatter::new(2),
            text_metrics: EstimatedTextMetrics,
        }
    }

    /// Context for a `width` x `group.height` viewport scrolled to `offset_x`.
    #[must_use]
    pub(crate) fn context(
        &self,
        offset_x: f64,
        width: f64,
        group_rect: Rect,
        content_rect: Rect,
        extreme_point: Option<ExtremePoint>,
    ) -> RenderContext<'_> {
        let layout = ChartLayout::new(self.configuration.layout_metrics(), self.values.len())
            .expect("valid layout");
        let geometry = SurfaceGeometry::new(
            Point::new(offset_x, 0.0),
            Size::new(width, group_rect.height),
        );
        RenderContext {
            values: &self.values,
            visible_range: layout.visible_index_range(offset_x, width),
            extreme_point,
            content_rect,
            group_content_rect: group_rect,
            selected_index: None,
            indicator_position: None,
            geometry,
            layout,
            configuration: &self.configuration,
            formatter: &self.formatter,
            text_metrics: &self.text_metrics,
        }
    }
}
