use crate::core::Point;
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::{ChartEngine, SelectionState};

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selection.selected_index
    }

    pub fn select_index(&mut self, index: Option<usize>) -> ChartResult<()> {
        if let Some(index) = index {
            if index >= self.values.len() {
                return Err(ChartError::InvalidData(format!(
                    "selected index {index} is outside 0..{}",
                    self.values.len()
                )));
            }
        }
        self.selection.selected_index = index;
        Ok(())
    }

    /// Selects the quote under `point` (content coordinates) and moves the
    /// value indicator there. Returns the selected index.
    pub fn select_at(&mut self, point: Point) -> ChartResult<Option<usize>> {
        if !point.is_finite() {
            return Err(ChartError::InvalidData(
                "selection point must be finite".to_owned(),
            ));
        }
        let index = self.layout()?.index_at(point.x);
        self.selection = SelectionState {
            selected_index: index,
            indicator_position: Some(point),
        };
        Ok(index)
    }

    pub fn set_indicator_position(&mut self, position: Option<Point>) -> ChartResult<()> {
        if position.is_some_and(|point| !point.is_finite()) {
            return Err(ChartError::InvalidData(
                "indicator position must be finite".to_owned(),
            ));
        }
        self.selection.indicator_position = position;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = SelectionState::default();
    }
}
