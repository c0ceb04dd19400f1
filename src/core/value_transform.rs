use crate::core::primitives::pixel_ceil;
use crate::core::{ExtremePoint, Rect};

/// Price ↔ y mapping for one content rectangle.
///
/// Only constructible for a finite, non-flat extreme point and a rectangle
/// with positive height, so every mapped coordinate is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueTransform {
    content_rect: Rect,
    extreme: ExtremePoint,
}

impl ValueTransform {
    #[must_use]
    pub fn new(content_rect: Rect, extreme: Option<ExtremePoint>) -> Option<Self> {
        let extreme = extreme?;
        if extreme.is_degenerate() {
            return None;
        }
        if !content_rect.is_finite() || content_rect.height <= 0.0 {
            return None;
        }
        Some(Self {
            content_rect,
            extreme,
        })
    }

    #[must_use]
    pub fn content_rect(self) -> Rect {
        self.content_rect
    }

    #[must_use]
    pub fn extreme(self) -> ExtremePoint {
        self.extreme
    }

    /// Value covered by one point of vertical extent.
    #[must_use]
    pub fn value_per_point(self) -> f64 {
        self.extreme.span() / self.content_rect.height
    }

    #[must_use]
    pub fn price_to_y(self, price: f64) -> f64 {
        let height = self.content_rect.height;
        height - height * (price - self.extreme.min) / self.extreme.span()
            + self.content_rect.min_y()
    }

    #[must_use]
    pub fn y_to_price(self, y: f64) -> f64 {
        let height = self.content_rect.height;
        self.extreme.min + (height - (y - self.content_rect.min_y())) * self.extreme.span() / height
    }

    /// Pixel-snapped vertical extent covering two prices.
    ///
    /// The top edge is rounded up to the next physical pixel and the height is
    /// floored at `min_height` so flat bars stay visible.
    #[must_use]
    pub fn snapped_span(self, a: f64, b: f64, pixel_scale: f64, min_height: f64) -> (f64, f64) {
        let y1 = self.price_to_y(a);
        let y2 = self.price_to_y(b);
        let top = pixel_ceil(y1.min(y2), pixel_scale);
        let height = pixel_ceil((y1 - y2).abs(), pixel_scale).max(min_height);
        (top, height)
    }
}
