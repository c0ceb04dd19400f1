use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{ChartLayout, ExtremePoint, Point, Rect};
use crate::render::{SurfaceGeometry, TextMetrics};

use super::{
    ChartConfiguration, ContextValues, GroupId, RenderContext, RendererPipeline, ValueFormatter,
};

/// Pointer-driven selection carried between frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected_index: Option<usize>,
    pub indicator_position: Option<Point>,
}

/// Resolved geometry and scale of one group for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupFrame {
    pub group: GroupId,
    pub group_content_rect: Rect,
    pub content_rect: Rect,
    pub extreme_point: Option<ExtremePoint>,
}

/// Everything a render pass derives before any plugin runs.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub geometry: SurfaceGeometry,
    pub layout: ChartLayout,
    pub visible_range: Range<usize>,
    pub selection: SelectionState,
    pub groups: Vec<GroupFrame>,
}

/// Borrowed inputs shared by every group context of a pass.
#[derive(Clone, Copy)]
pub struct SharedFrameInputs<'a> {
    pub values: &'a ContextValues,
    pub configuration: &'a ChartConfiguration,
    pub formatter: &'a dyn ValueFormatter,
    pub text_metrics: &'a dyn TextMetrics,
}

impl FrameState {
    /// Derives visible range, group rectangles and extreme points.
    ///
    /// Groups stack from the top of the content area. A selection that no
    /// longer points into the series is dropped.
    #[must_use]
    pub fn build(
        pipeline: &RendererPipeline,
        values: &ContextValues,
        layout: ChartLayout,
        geometry: SurfaceGeometry,
        selection: SelectionState,
    ) -> Self {
        let visible_range =
            layout.visible_index_range(geometry.content_offset.x, geometry.viewport.width);
        let selection = SelectionState {
            selected_index: selection
                .selected_index
                .filter(|index| *index < layout.data_count()),
            indicator_position: selection
                .indicator_position
                .filter(|position| position.is_finite()),
        };

        let mut top = 0.0;
        let groups = pipeline
            .groups()
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let id = GroupId::new(index);
                let (group_content_rect, content_rect) =
                    group.rects(geometry.min_x(), geometry.viewport.width, top);
                top += group.height;
                GroupFrame {
                    group: id,
                    group_content_rect,
                    content_rect,
                    extreme_point: pipeline.extreme_point(id, values, visible_range.clone()),
                }
            })
            .collect();

        Self {
            geometry,
            layout,
            visible_range,
            selection,
            groups,
        }
    }

    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&GroupFrame> {
        self.groups.iter().find(|frame| frame.group == id)
    }

    /// Context handed to the plugins of `group`.
    #[must_use]
    pub fn context<'a>(
        &self,
        group: &GroupFrame,
        shared: SharedFrameInputs<'a>,
    ) -> RenderContext<'a> {
        RenderContext {
            values: shared.values,
            visible_range: self.visible_range.clone(),
            extreme_point: group.extreme_point,
            content_rect: group.content_rect,
            group_content_rect: group.group_content_rect,
            selected_index: self.selection.selected_index,
            indicator_position: self.selection.indicator_position,
            geometry: self.geometry,
            layout: self.layout,
            configuration: shared.configuration,
            formatter: shared.formatter,
            text_metrics: shared.text_metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use super::{FrameState, SelectionState};
    use crate::api::{ChartConfiguration, ChartGroup, ContextValues, RendererPipeline};
    use crate::core::{ChartLayout, ExtremePoint, Insets, Point, Quote, Size};
    use crate::extensions::CandlestickRenderer;
    use crate::render::SurfaceGeometry;

    fn quotes(count: usize) -> Vec<Quote> {
        (0..count)
            .map(|i| {
                let base = 10.0 + i as f64;
                Quote::new(i as f64 * 60.0, base, base + 2.0, base - 1.0, base + 1.0)
                    .expect("valid quote")
            })
            .collect()
    }

    fn layout(count: usize) -> ChartLayout {
        ChartLayout::new(ChartConfiguration::default().layout_metrics(), count)
            .expect("valid layout")
    }

    #[test]
    fn groups_stack_and_scale_over_visible_quotes() {
        let mut pipeline = RendererPipeline::new();
        let main = pipeline
            .add_group(ChartGroup::new(200.0).with_padding(Insets::new(10.0, 0.0, 10.0, 0.0)))
            .expect("group");
        pipeline.add_group(ChartGroup::new(20.0)).expect("group");
        pipeline
            .register(main, Box::new(CandlestickRenderer::new("candles")))
            .expect("register");

        let values = ContextValues::new(quotes(100));
        let geometry = SurfaceGeometry::new(Point::new(400.0, 0.0), Size::new(80.0, 220.0));
        let frame = FrameState::build(
            &pipeline,
            &values,
            layout(100),
            geometry,
            SelectionState::default(),
        );

        assert_eq!(frame.visible_range, 50..60);
        assert_eq!(frame.groups.len(), 2);
        let main_frame = frame.groups[0];
        assert_eq!(main_frame.content_rect.min_y(), 10.0);
        assert_eq!(main_frame.content_rect.height, 180.0);
        assert_eq!(main_frame.content_rect.min_x(), 400.0);
        assert_eq!(main_frame.extreme_point, Some(ExtremePoint::new(59.0, 71.0)));
        assert_eq!(frame.groups[1].group_content_rect.min_y(), 200.0);
        assert_eq!(frame.groups[1].extreme_point, None);
    }

    #[test]
    fn stale_selection_is_dropped() {
        let pipeline = RendererPipeline::new();
        let values = ContextValues::new(quotes(3));
        let frame = FrameState::build(
            &pipeline,
            &values,
            layout(3),
            SurfaceGeometry::new(Point::default(), Size::new(100.0, 100.0)),
            SelectionState {
                selected_index: Some(7),
                indicator_position: Some(Point::new(f64::NAN, 1.0)),
            },
        );
        assert_eq!(frame.selection, SelectionState::default());
        let expected: Range<usize> = 0..3;
        assert_eq!(frame.visible_range, expected);
    }
}
