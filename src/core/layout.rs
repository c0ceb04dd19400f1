use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Upper bound for grid lines along one axis regardless of available extent.
pub const MAX_GRID_COUNT: usize = 64;

/// Bar geometry and grid pitch the layout is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub bar_width: f64,
    pub spacing: f64,
    pub min_horizontal_grid_pitch: f64,
    pub min_vertical_grid_pitch: f64,
}

impl LayoutMetrics {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.bar_width.is_finite() || self.bar_width <= 0.0 {
            return Err(ChartError::InvalidConfiguration(
                "bar width must be finite and > 0".to_owned(),
            ));
        }
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(ChartError::InvalidConfiguration(
                "bar spacing must be finite and >= 0".to_owned(),
            ));
        }
        for (value, name) in [
            (self.min_horizontal_grid_pitch, "min_horizontal_grid_pitch"),
            (self.min_vertical_grid_pitch, "min_vertical_grid_pitch"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidConfiguration(format!(
                    "layout `{name}` must be finite and > 0"
                )));
            }
        }
        Ok(self)
    }
}

/// Index/pixel arithmetic for one data set.
///
/// Sample `i` occupies `[i * pitch, i * pitch + bar_width)` on the x axis,
/// where `pitch = bar_width + spacing`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    metrics: LayoutMetrics,
    data_count: usize,
}

impl ChartLayout {
    pub fn new(metrics: LayoutMetrics, data_count: usize) -> ChartResult<Self> {
        Ok(Self {
            metrics: metrics.validate()?,
            data_count,
        })
    }

    #[must_use]
    pub fn metrics(self) -> LayoutMetrics {
        self.metrics
    }

    #[must_use]
    pub fn data_count(self) -> usize {
        self.data_count
    }

    #[must_use]
    pub fn bar_pitch(self) -> f64 {
        self.metrics.bar_width + self.metrics.spacing
    }

    /// Total scrollable width occupied by the data set.
    #[must_use]
    pub fn content_width(self) -> f64 {
        self.data_count as f64 * self.bar_pitch()
    }

    /// Left edge of sample `index`.
    #[must_use]
    pub fn pixel_x(self, index: usize) -> f64 {
        index as f64 * self.bar_pitch()
    }

    /// Horizontal center of sample `index`.
    #[must_use]
    pub fn mid_x(self, index: usize) -> f64 {
        self.pixel_x(index) + self.metrics.bar_width / 2.0
    }

    /// Sample whose pitch slot contains `x`, if any.
    #[must_use]
    pub fn index_at(self, x: f64) -> Option<usize> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        let raw = (x / self.bar_pitch()).floor();
        if raw >= self.data_count as f64 {
            return None;
        }
        Some(raw as usize)
    }

    /// Half-open range of samples intersecting `[offset, offset + viewport_width)`.
    ///
    /// A bar cut by the right edge is included. The result is always a
    /// subrange of `0..data_count`.
    #[must_use]
    pub fn visible_index_range(self, offset: f64, viewport_width: f64) -> Range<usize> {
        if self.data_count == 0 || !offset.is_finite() || !viewport_width.is_finite() {
            return 0..0;
        }
        let pitch = self.bar_pitch();
        let count = self.data_count as f64;
        let width = viewport_width.max(0.0);

        let start = (offset / pitch).floor().clamp(0.0, count);
        let end = ((offset + width) / pitch).ceil().clamp(start, count);
        (start as usize)..(end as usize)
    }

    /// Number of vertical grid intervals across `width`.
    #[must_use]
    pub fn horizontal_grid_count(self, width: f64) -> usize {
        grid_count(width, self.metrics.min_horizontal_grid_pitch)
    }

    /// Number of horizontal grid intervals across `height`.
    #[must_use]
    pub fn vertical_grid_count(self, height: f64) -> usize {
        grid_count(height, self.metrics.min_vertical_grid_pitch)
    }
}

fn grid_count(extent_px: f64, min_pitch_px: f64) -> usize {
    if !extent_px.is_finite() || extent_px <= 0.0 {
        return 1;
    }
    if !min_pitch_px.is_finite() || min_pitch_px <= 0.0 {
        return 1;
    }
    let raw = (extent_px / min_pitch_px).floor();
    if raw >= MAX_GRID_COUNT as f64 {
        return MAX_GRID_COUNT;
    }
    (raw as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::{ChartLayout, LayoutMetrics, MAX_GRID_COUNT};

    fn layout(count: usize) -> ChartLayout {
        ChartLayout::new(
            LayoutMetrics {
                bar_width: 6.0,
                spacing: 2.0,
                min_horizontal_grid_pitch: 80.0,
                min_vertical_grid_pitch: 40.0,
            },
            count,
        )
        .expect("valid layout")
    }

    #[test]
    fn visible_range_covers_partially_visible_bar() {
        let layout = layout(100);
        assert_eq!(layout.visible_index_range(0.0, 80.0), 0..10);
        assert_eq!(layout.visible_index_range(4.0, 80.0), 0..11);
        assert_eq!(layout.visible_index_range(400.0, 80.0), 50..60);
    }

    #[test]
    fn visible_range_clamps_to_data() {
        let layout = layout(5);
        assert_eq!(layout.visible_index_range(0.0, 800.0), 0..5);
        assert_eq!(layout.visible_index_range(-50.0, 80.0), 0..4);
        assert_eq!(layout.visible_index_range(-500.0, 80.0), 0..0);
        assert_eq!(layout.visible_index_range(10_000.0, 80.0), 5..5);
        assert_eq!(self::layout(0).visible_index_range(0.0, 80.0), 0..0);
    }

    #[test]
    fn index_at_rejects_outside_data() {
        let layout = layout(3);
        assert_eq!(layout.index_at(-0.1), None);
        assert_eq!(layout.index_at(0.0), Some(0));
        assert_eq!(layout.index_at(7.9), Some(0));
        assert_eq!(layout.index_at(8.0), Some(1));
        assert_eq!(layout.index_at(23.9), Some(2));
        assert_eq!(layout.index_at(24.0), None);
        assert_eq!(layout.index_at(f64::NAN), None);
    }

    #[test]
    fn grid_counts_follow_pitch_and_clamp() {
        let layout = layout(0);
        assert_eq!(layout.horizontal_grid_count(375.0), 4);
        assert_eq!(layout.vertical_grid_count(200.0), 5);
        assert_eq!(layout.vertical_grid_count(10.0), 1);
        assert_eq!(layout.vertical_grid_count(0.0), 1);
        assert_eq!(layout.horizontal_grid_count(1e9), MAX_GRID_COUNT);
    }

    #[test]
    fn invalid_metrics_are_rejected() {
        let metrics = LayoutMetrics {
            bar_width: 0.0,
            spacing: 2.0,
            min_horizontal_grid_pitch: 80.0,
            min_vertical_grid_pitch: 40.0,
        };
        assert!(ChartLayout::new(metrics, 1).is_err());
    }
}
