use std::ops::Range;

use indexmap::IndexMap;

use crate::api::{ContextKey, ContextValues, RenderContext};
use crate::core::{ExtremePoint, Point, Quote};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Drawable, DrawableId, DrawablePool, DrawableSetup, LayerSurface, Paint};

use super::RendererPlugin;

/// Simple moving averages of closes, keyed by period.
///
/// Entry `i` of a series averages quotes `i + 1 - period ..= i`; the first
/// `period - 1` entries are `None`.
pub struct MovingAverages;

impl ContextKey for MovingAverages {
    type Value = IndexMap<usize, Vec<Option<f64>>>;
}

/// Rolling-sum SMA over quote closes, index-aligned with `quotes`.
#[must_use]
pub fn simple_moving_average(quotes: &[Quote], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(quotes.len());
    if period == 0 {
        out.resize(quotes.len(), None);
        return out;
    }
    let mut sum = 0.0_f64;
    for (i, quote) in quotes.iter().enumerate() {
        sum += quote.close;
        if i >= period {
            sum -= quotes[i - period].close;
        }
        out.push((i + 1 >= period).then(|| sum / period as f64));
    }
    out
}

/// Polyline overlay of a simple moving average.
#[derive(Debug)]
pub struct MovingAverageIndicator {
    id: String,
    period: usize,
    color: Color,
    line_width: f64,
    drawables: DrawablePool,
    line: Option<DrawableId>,
    z_position: f64,
}

impl MovingAverageIndicator {
    pub fn new(id: impl Into<String>, period: usize) -> ChartResult<Self> {
        if period == 0 {
            return Err(ChartError::InvalidConfiguration(
                "moving average period must be > 0".to_owned(),
            ));
        }
        Ok(Self {
            id: id.into(),
            period,
            color: Color::from_hex(0xf0b90b),
            line_width: 1.0,
            drawables: DrawablePool::new(DrawableSetup::default()),
            line: None,
            z_position: 0.0,
        })
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }

    #[must_use]
    pub fn period(&self) -> usize {
        self.period
    }

    fn series<'v>(&self, values: &'v ContextValues) -> Option<&'v [Option<f64>]> {
        values
            .get::<MovingAverages>()
            .and_then(|series| series.get(&self.period))
            .map(Vec::as_slice)
    }
}

impl RendererPlugin for MovingAverageIndicator {
    fn id(&self) -> &str {
        &self.id
    }

    fn setup(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.set_contents_scale(surface.contents_scale());
        let line = self.drawables.dequeue(surface);
        if let Some(drawable) = self.drawables.get_mut(line) {
            drawable.hidden = true;
            drawable.z_position = self.z_position;
        }
        self.line = Some(line);
    }

    fn render(
        &mut self,
        _surface: &mut LayerSurface<'_>,
        context: &RenderContext<'_>,
    ) -> ChartResult<()> {
        let Some(line) = self.line else {
            return Ok(());
        };
        let transform = context.value_transform();
        let series = self.series(context.values);
        let paint = Paint::stroked(self.color, self.line_width);
        let Some(drawable) = self.drawables.get_mut(line) else {
            return Ok(());
        };
        drawable.paint = paint;
        drawable.frame = context.group_content_rect;
        let points = drawable.polyline_points_mut();
        points.clear();

        if let (Some(transform), Some(series)) = (transform, series) {
            let range = context.visible_range.start.min(series.len())
                ..context.visible_range.end.min(series.len());
            for index in range {
                if let Some(average) = series[index] {
                    points.push(Point::new(
                        context.layout.mid_x(index),
                        transform.price_to_y(average),
                    ));
                }
            }
        }
        let point_count = points.len();
        drawable.hidden = point_count < 2;
        Ok(())
    }

    fn tear_down(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.tear_down(surface);
        self.line = None;
    }

    fn update_z_position(&mut self, z_position: f64) {
        self.z_position = z_position;
        self.drawables.set_z_position(z_position);
    }

    fn extreme_point(
        &self,
        values: &ContextValues,
        visible_range: Range<usize>,
    ) -> Option<ExtremePoint> {
        let series = self.series(values)?;
        let end = visible_range.end.min(series.len());
        let start = visible_range.start.min(end);
        series[start..end]
            .iter()
            .flatten()
            .filter_map(|average| ExtremePoint::from_bounds(*average, *average))
            .reduce(ExtremePoint::union)
    }

    fn process_quotes(&self, values: &mut ContextValues) {
        let average = simple_moving_average(values.quotes(), self.period);
        values
            .get_or_insert_with::<MovingAverages>(IndexMap::new)
            .insert(self.period, average);
    }

    fn visit_drawables<'a>(&'a self, visitor: &mut dyn FnMut(&'a Drawable)) {
        for drawable in self.drawables.visible_drawables() {
            visitor(drawable);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MovingAverageIndicator, MovingAverages, simple_moving_average};
    use crate::api::ContextValues;
    use crate::core::{ExtremePoint, Quote};
    use crate::extensions::RendererPlugin;

    fn closes(values: &[f64]) -> Vec<Quote> {
        values
            .iter()
            .enumerate()
            .map(|(i, close)| {
                Quote::new(i as f64, *close, *close, *close, *close).expect("valid quote")
            })
            .collect()
    }

    #[test]
    fn sma_is_index_aligned() {
        let average = simple_moving_average(&closes(&[1.0, 2.0, 3.0, 4.0]), 2);
        assert_eq!(average, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
        assert!(simple_moving_average(&closes(&[1.0]), 3)[0].is_none());
    }

    #[test]
    fn processed_series_drive_extreme_point() {
        let indicator = MovingAverageIndicator::new("sma-2", 2).expect("valid period");
        let mut values = ContextValues::new(closes(&[1.0, 2.0, 3.0, 4.0, 10.0]));
        indicator.process_quotes(&mut values);

        assert!(values.get::<MovingAverages>().is_some());
        assert_eq!(
            indicator.extreme_point(&values, 0..3),
            Some(ExtremePoint::new(1.5, 2.5))
        );
        assert_eq!(indicator.extreme_point(&values, 0..1), None);
        assert!(MovingAverageIndicator::new("bad", 0).is_err());
    }
}
