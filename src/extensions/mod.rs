//! Bundled renderer plugins.
//!
//! Each plugin owns its drawables and only talks to the chart through
//! [`RendererPlugin`] and the per-frame [`RenderContext`](crate::api::RenderContext).

mod bid_sell;
mod candlestick;
mod label;
mod latest_price;
mod moving_average;
mod plugins;
mod selected_time;
mod selected_value;
mod time_annotation;
mod value_annotation;
mod watermark;

#[cfg(test)]
mod test_support;

pub use bid_sell::{BidSellIndicator, TradeSide};
pub use candlestick::{CandleFill, CandleGeometry, CandlestickRenderer, candle_geometry};
pub use label::LabelStyle;
pub use latest_price::{LatestPriceIndicator, LatestPricePlacement};
pub use moving_average::{MovingAverageIndicator, MovingAverages, simple_moving_average};
pub use plugins::RendererPlugin;
pub use selected_time::SelectedTimeIndicator;
pub use selected_value::SelectedValueIndicator;
pub use time_annotation::{TimeAnnotation, time_grid_positions};
pub use value_annotation::{ValueAnnotation, value_grid_positions};
pub use watermark::{WatermarkPosition, WatermarkRenderer};
