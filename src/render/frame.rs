use ordered_float::OrderedFloat;

use crate::core::Rect;
use crate::error::{ChartError, ChartResult};
use crate::render::{Drawable, DrawableContent, LayerId};

/// One visible drawable and the layer that owns it.
#[derive(Debug, Clone, Copy)]
pub struct SceneItem<'a> {
    pub layer: LayerId,
    pub drawable: &'a Drawable,
}

/// Backend-agnostic scene for one chart draw pass.
///
/// Items are borrowed from the plugins' pools and ordered back-to-front by
/// z position; items sharing a z position keep plugin registration order.
#[derive(Debug, Clone)]
pub struct RenderFrame<'a> {
    pub viewport: Rect,
    pub items: Vec<SceneItem<'a>>,
}

impl<'a> RenderFrame<'a> {
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            items: Vec::new(),
        }
    }

    /// Adds a drawable unless it is hidden.
    pub fn push(&mut self, layer: LayerId, drawable: &'a Drawable) {
        if drawable.hidden {
            return;
        }
        self.items.push(SceneItem { layer, drawable });
    }

    /// Stable back-to-front ordering by z position.
    pub fn sort_by_z(&mut self) {
        self.items
            .sort_by_key(|item| OrderedFloat(item.drawable.z_position));
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_finite() || self.viewport.width <= 0.0 || self.viewport.height <= 0.0
        {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        for item in &self.items {
            item.drawable.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn layer_items(&self, layer: LayerId) -> impl Iterator<Item = &'a Drawable> + '_ {
        self.items
            .iter()
            .filter(move |item| item.layer == layer)
            .map(|item| item.drawable)
    }

    #[must_use]
    pub fn text_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.drawable.content, DrawableContent::Text(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::RenderFrame;
    use crate::core::Rect;
    use crate::render::{Drawable, DrawableId, DrawableSetup, LayerId};

    #[test]
    fn hidden_drawables_are_skipped_and_items_sorted() {
        let mut back = Drawable::new(DrawableId::new(0), DrawableSetup::default());
        back.z_position = 1.0;
        let mut front = Drawable::new(DrawableId::new(1), DrawableSetup::default());
        front.z_position = 5.0;
        let mut hidden = Drawable::new(DrawableId::new(2), DrawableSetup::default());
        hidden.hidden = true;

        let mut frame = RenderFrame::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        frame.push(LayerId::new(1), &front);
        frame.push(LayerId::new(0), &back);
        frame.push(LayerId::new(0), &hidden);
        frame.sort_by_z();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.items[0].drawable.id(), DrawableId::new(0));
        assert_eq!(frame.items[1].drawable.id(), DrawableId::new(1));
        assert!(frame.validate().is_ok());
    }
}
