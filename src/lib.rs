//! chart-layers: layered candlestick chart rendering core.
//!
//! The crate lays quotes out along a scrollable strip, stacks chart groups
//! vertically and drives an ordered set of renderer plugins that each own
//! their drawables. A host supplies the surface geometry and a [`render::Renderer`]
//! turns each frame's z-sorted scene into pixels.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfiguration, ChartEngine};
pub use error::{ChartError, ChartResult};
