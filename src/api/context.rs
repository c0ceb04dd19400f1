use std::fmt;
use std::ops::Range;

use crate::core::{ChartLayout, ExtremePoint, Point, Quote, Rect, ValueTransform};
use crate::render::{SurfaceGeometry, TextMetrics};

use super::{ChartConfiguration, ContextValues, ValueFormatter};

/// Read-only per-frame view handed to each plugin's `render`.
///
/// It is rebuilt for every group on every pass and never cached by plugins.
pub struct RenderContext<'a> {
    pub values: &'a ContextValues,
    pub visible_range: Range<usize>,
    pub extreme_point: Option<ExtremePoint>,
    /// Drawing area of the group after padding.
    pub content_rect: Rect,
    /// Full extent of the group including padding.
    pub group_content_rect: Rect,
    pub selected_index: Option<usize>,
    pub indicator_position: Option<Point>,
    pub geometry: SurfaceGeometry,
    pub layout: ChartLayout,
    pub configuration: &'a ChartConfiguration,
    pub formatter: &'a dyn ValueFormatter,
    pub text_metrics: &'a dyn TextMetrics,
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("visible_range", &self.visible_range)
            .field("extreme_point", &self.extreme_point)
            .field("content_rect", &self.content_rect)
            .field("group_content_rect", &self.group_content_rect)
            .field("selected_index", &self.selected_index)
            .field("indicator_position", &self.indicator_position)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl RenderContext<'_> {
    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        self.values.quotes()
    }

    #[must_use]
    pub fn visible_quotes(&self) -> &[Quote] {
        self.values.quotes_in(self.visible_range.clone())
    }

    /// Value/y mapping for this group, `None` while the scale is degenerate.
    #[must_use]
    pub fn value_transform(&self) -> Option<ValueTransform> {
        ValueTransform::new(self.content_rect, self.extreme_point)
    }

    #[must_use]
    pub fn y_for_value(&self, value: f64) -> Option<f64> {
        self.value_transform()
            .map(|transform| transform.price_to_y(value))
    }

    #[must_use]
    pub fn value_for_y(&self, y: f64) -> Option<f64> {
        self.value_transform().map(|transform| transform.y_to_price(y))
    }

    #[must_use]
    pub fn pixel_scale(&self) -> f64 {
        self.configuration.pixel_scale
    }

    /// Selected index, if it still points into the series.
    #[must_use]
    pub fn selected_quote(&self) -> Option<(usize, &Quote)> {
        let index = self.selected_index?;
        self.values.quotes().get(index).map(|quote| (index, quote))
    }
}
