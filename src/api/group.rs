use serde::{Deserialize, Serialize};

use crate::core::{Insets, Rect};
use crate::error::{ChartError, ChartResult};

/// Handle of a group inside its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(usize);

impl GroupId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }
}

/// Horizontal band of the chart sharing one value scale.
///
/// Groups stack top to bottom in insertion order. Every plugin registered in
/// a group contributes to, and draws against, that group's extreme point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartGroup {
    pub height: f64,
    /// Space between the group edge and its drawing area.
    pub padding: Insets,
}

impl ChartGroup {
    #[must_use]
    pub fn new(height: f64) -> Self {
        Self {
            height,
            padding: Insets::ZERO,
        }
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ChartError::InvalidConfiguration(
                "group height must be finite and > 0".to_owned(),
            ));
        }
        let Insets {
            top,
            left,
            bottom,
            right,
        } = self.padding;
        if [top, left, bottom, right]
            .iter()
            .any(|inset| !inset.is_finite() || *inset < 0.0)
        {
            return Err(ChartError::InvalidConfiguration(
                "group padding must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Group extent and its padded drawing area for a band starting at `top`.
    #[must_use]
    pub fn rects(self, min_x: f64, width: f64, top: f64) -> (Rect, Rect) {
        let group_rect = Rect::new(min_x, top, width, self.height);
        (group_rect, group_rect.inset_by(self.padding))
    }
}

#[cfg(test)]
mod tests {
    use super::ChartGroup;
    use crate::core::Insets;

    #[test]
    fn padding_shrinks_content_rect() {
        let group = ChartGroup::new(120.0)
            .with_padding(Insets::new(10.0, 0.0, 10.0, 0.0))
            .validate()
            .expect("valid group");
        let (group_rect, content_rect) = group.rects(40.0, 300.0, 20.0);
        assert_eq!(group_rect.min_y(), 20.0);
        assert_eq!(group_rect.max_y(), 140.0);
        assert_eq!(content_rect.min_y(), 30.0);
        assert_eq!(content_rect.height, 100.0);
        assert_eq!(content_rect.min_x(), 40.0);
    }

    #[test]
    fn zero_height_is_rejected() {
        assert!(ChartGroup::new(0.0).validate().is_err());
        assert!(
            ChartGroup::new(10.0)
                .with_padding(Insets::new(-1.0, 0.0, 0.0, 0.0))
                .validate()
                .is_err()
        );
    }
}
