pub mod extreme_point;
pub mod layout;
pub mod primitives;
pub mod quote;
pub mod types;
pub mod value_transform;

pub use extreme_point::{ExtremePoint, extreme_of, reduce_extreme_points};
pub use layout::{ChartLayout, LayoutMetrics, MAX_GRID_COUNT};
pub use primitives::pixel_ceil;
pub use quote::Quote;
pub use types::{Insets, Point, Rect, Size};
pub use value_transform::ValueTransform;
