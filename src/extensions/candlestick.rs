use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::api::{ChartConfiguration, ContextValues, RenderContext};
use crate::core::{ExtremePoint, Quote, Rect, ValueTransform, extreme_of, pixel_ceil};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Drawable, DrawableId, DrawablePool, DrawableSetup, LayerSurface, Paint};

use super::RendererPlugin;

/// Body rendering of candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CandleFill {
    /// Outlined body, wicks drawn outside it.
    #[default]
    Hollow,
    Solid,
}

/// Pixel-snapped rectangles of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleGeometry {
    pub body: Rect,
    pub upper_wick: Option<Rect>,
    pub lower_wick: Option<Rect>,
}

/// Projects `quote`, drawn at `bar_x`, into body and wick rectangles.
///
/// A hollow body is shrunk by half the outline width on each side so the
/// stroke stays inside the bar slot. Wicks only cover the parts of the
/// high/low line outside the body.
#[must_use]
pub fn candle_geometry(
    quote: &Quote,
    bar_x: f64,
    transform: ValueTransform,
    configuration: &ChartConfiguration,
    fill: CandleFill,
    outline_width: f64,
) -> CandleGeometry {
    let scale = configuration.pixel_scale;
    let bar_width = configuration.bar_width;
    let (body_top, body_height) =
        transform.snapped_span(quote.open, quote.close, scale, configuration.min_bar_height);
    let body = match fill {
        CandleFill::Hollow => Rect::new(
            pixel_ceil(bar_x + outline_width / 2.0, scale),
            body_top,
            (bar_width - outline_width).max(0.0),
            body_height,
        ),
        CandleFill::Solid => Rect::new(pixel_ceil(bar_x, scale), body_top, bar_width, body_height),
    };

    let shadow_width = configuration.shadow_line_width;
    let line_x = pixel_ceil(bar_x + (bar_width - shadow_width) / 2.0, scale);
    let (line_top, line_height) = transform.snapped_span(quote.high, quote.low, scale, 0.0);
    let line_bottom = line_top + line_height;

    let upper_wick = (line_top < body.min_y())
        .then(|| Rect::new(line_x, line_top, shadow_width, body.min_y() - line_top));
    let lower_wick = (line_bottom > body.max_y())
        .then(|| Rect::new(line_x, body.max_y(), shadow_width, line_bottom - body.max_y()));

    CandleGeometry {
        body,
        upper_wick,
        lower_wick,
    }
}

#[derive(Debug, Clone, Copy)]
struct CandleLayers {
    up_wick: DrawableId,
    up_body: DrawableId,
    down_wick: DrawableId,
    down_body: DrawableId,
}

impl CandleLayers {
    fn all(self) -> [DrawableId; 4] {
        [self.up_wick, self.up_body, self.down_wick, self.down_body]
    }
}

/// Candlestick series: one shape drawable per direction and part.
///
/// Four lifetime drawables hold every visible candle as rectangle paths, so
/// the drawable count does not grow with the number of visible quotes.
#[derive(Debug)]
pub struct CandlestickRenderer {
    id: String,
    fill: CandleFill,
    outline_width: f64,
    drawables: DrawablePool,
    layers: Option<CandleLayers>,
    z_position: f64,
}

impl CandlestickRenderer {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fill: CandleFill::Hollow,
            outline_width: 1.0,
            drawables: DrawablePool::new(DrawableSetup::default()),
            layers: None,
            z_position: 0.0,
        }
    }

    #[must_use]
    pub fn with_fill(mut self, fill: CandleFill) -> Self {
        self.fill = fill;
        self
    }

    #[must_use]
    pub fn with_outline_width(mut self, width: f64) -> Self {
        self.outline_width = width;
        self
    }

    fn body_paint(&self, color: Color) -> Paint {
        match self.fill {
            CandleFill::Hollow => Paint::stroked(color, self.outline_width),
            CandleFill::Solid => Paint::filled(color),
        }
    }

    fn prepare(&mut self, id: DrawableId, paint: Paint, frame: Rect, hidden: bool) {
        if let Some(drawable) = self.drawables.get_mut(id) {
            drawable.shape_rects_mut().clear();
            drawable.paint = paint;
            drawable.frame = frame;
            drawable.hidden = hidden;
            drawable.z_position = self.z_position;
        }
    }
}

impl RendererPlugin for CandlestickRenderer {
    fn id(&self) -> &str {
        &self.id
    }

    fn setup(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.set_contents_scale(surface.contents_scale());
        self.layers = Some(CandleLayers {
            up_wick: self.drawables.dequeue(surface),
            up_body: self.drawables.dequeue(surface),
            down_wick: self.drawables.dequeue(surface),
            down_body: self.drawables.dequeue(surface),
        });
    }

    fn render(
        &mut self,
        _surface: &mut LayerSurface<'_>,
        context: &RenderContext<'_>,
    ) -> ChartResult<()> {
        if !self.outline_width.is_finite() || self.outline_width < 0.0 {
            return Err(ChartError::InvalidConfiguration(
                "candle outline width must be finite and >= 0".to_owned(),
            ));
        }
        let Some(layers) = self.layers else {
            return Ok(());
        };
        let transform = context.value_transform();
        let hidden = transform.is_none();
        let style = context.configuration.style;
        let frame = context.group_content_rect;

        self.prepare(layers.up_wick, Paint::filled(style.up_color), frame, hidden);
        self.prepare(layers.up_body, self.body_paint(style.up_color), frame, hidden);
        self.prepare(layers.down_wick, Paint::filled(style.down_color), frame, hidden);
        self.prepare(layers.down_body, self.body_paint(style.down_color), frame, hidden);

        let Some(transform) = transform else {
            return Ok(());
        };

        let start = context.visible_range.start;
        for (offset, quote) in context.visible_quotes().iter().enumerate() {
            let geometry = candle_geometry(
                quote,
                context.layout.pixel_x(start + offset),
                transform,
                context.configuration,
                self.fill,
                self.outline_width,
            );
            let (body_id, wick_id) = if quote.open > quote.close {
                (layers.down_body, layers.down_wick)
            } else {
                (layers.up_body, layers.up_wick)
            };
            if let Some(body) = self.drawables.get_mut(body_id) {
                body.shape_rects_mut().push(geometry.body);
            }
            if let Some(wick) = self.drawables.get_mut(wick_id) {
                let rects = wick.shape_rects_mut();
                rects.extend(geometry.upper_wick);
                rects.extend(geometry.lower_wick);
            }
        }
        Ok(())
    }

    fn tear_down(&mut self, surface: &mut LayerSurface<'_>) {
        self.drawables.tear_down(surface);
        self.layers = None;
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
        extreme_of(
            values
                .quotes_in(visible_range)
                .iter()
                .map(|quote| (quote.low, quote.high)),
        )
    }

    fn visit_drawables<'a>(&'a self, visitor: &mut dyn FnMut(&'a Drawable)) {
        for drawable in self.drawables.visible_drawables() {
            visitor(drawable);
        }
    }
}
