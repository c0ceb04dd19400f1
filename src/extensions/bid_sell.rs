use crate::api::RenderContext;
use crate::core::{Quote, Rect, ValueTransform};
use crate::error::ChartResult;
use crate::render::{
    Drawable, DrawableContent, DrawablePool, DrawableSetup, ImageRef, LayerSurface,
};

use super::RendererPlugin;

/// Which trade marker a quote carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Bid,
    Sell,
}

/// Image markers for quotes carrying a bid or a sell.
///
/// Bid markers hang below the bar low, sell markers sit above the bar high,
/// both centred on the bar slot.
#[derive(Debug)]
pub struct BidSellIndicator {
    id: String,
    bid_image: ImageRef,
    sell_image: ImageRef,
    markers: DrawablePool,
    z_position: f64,
}

impl BidSellIndicator {
    #[must_use]
    pub fn new(id: impl Into<String>, bid_image: ImageRef, sell_image: ImageRef) -> Self {
        Self {
            id: id.into(),
            bid_image,
            sell_image,
            markers: DrawablePool::new(DrawableSetup::default()),
            z_position: 0.0,
        }
    }

    /// Frame of a marker for `quote` at `bar_x`.
    #[must_use]
    pub fn marker_frame(
        side: TradeSide,
        quote: &Quote,
        bar_x: f64,
        bar_width: f64,
        image: &ImageRef,
        transform: ValueTransform,
    ) -> Rect {
        let x = bar_x + (bar_width - image.size.width) / 2.0;
        let y = match side {
            TradeSide::Bid => transform.price_to_y(quote.low),
            TradeSide::Sell => transform.price_to_y(quote.high) - image.size.height,
        };
        Rect::new(x, y, image.size.width, image.size.height)
    }

    fn place(
        &mut self,
        side: TradeSide,
        quote: &Quote,
        bar_x: f64,
        context: &RenderContext<'_>,
        transform: ValueTransform,
        surface: &mut LayerSurface<'_>,
    ) {
        let image = match side {
            TradeSide::Bid => &self.bid_image,
            TradeSide::Sell => &self.sell_image,
        };
        let frame = Self::marker_frame(
            side,
            quote,
            bar_x,
            context.configuration.bar_width,
            image,
            transform,
        );
        let id = self.markers.dequeue(surface);
        if let Some(marker) = self.markers.get_mut(id) {
            if !matches!(&marker.content, DrawableContent::Image(current) if current == image) {
                marker.content = DrawableContent::Image(image.clone());
            }
            marker.frame = frame;
            marker.hidden = false;
            marker.z_position = self.z_position;
        }
    }
}

impl RendererPlugin for BidSellIndicator {
    fn id(&self) -> &str {
        &self.id
    }

    fn setup(&mut self, surface: &mut LayerSurface<'_>) {
        self.markers.set_contents_scale(surface.contents_scale());
    }

    fn render(
        &mut self,
        surface: &mut LayerSurface<'_>,
        context: &RenderContext<'_>,
    ) -> ChartResult<()> {
        self.markers.recycle_visible(surface);
        let Some(transform) = context.value_transform() else {
            return Ok(());
        };

        let start = context.visible_range.start;
        for (offset, quote) in context.visible_quotes().iter().enumerate() {
            let bar_x = context.layout.pixel_x(start + offset);
            if quote.bid.is_some() {
                self.place(TradeSide::Bid, quote, bar_x, context, transform, surface);
            }
            if quote.sell.is_some() {
                self.place(TradeSide::Sell, quote, bar_x, context, transform, surface);
            }
        }
        Ok(())
    }

    fn tear_down(&mut self, surface: &mut LayerSurface<'_>) {
        self.markers.tear_down(surface);
    }

    fn update_z_position(&mut self, z_position: f64) {
        self.z_position = z_position;
        self.markers.set_z_position(z_position);
    }

    fn visit_drawables<'a>(&'a self, visitor: &mut dyn FnMut(&'a Drawable)) {
        for drawable in self.markers.visible_drawables() {
            visitor(drawable);
        }
    }
}
