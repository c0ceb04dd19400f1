use tracing::debug;

use crate::core::{ChartLayout, Quote, Size};
use crate::error::{ChartError, ChartResult};
use crate::render::{EstimatedTextMetrics, HostSurface, Renderer, TextMetrics};

use super::{
    ChartConfiguration, ContextValues, DecimalFormatter, FrameReport, FrameState,
    RendererPipeline, SelectionState, SharedFrameInputs, ValueFormatter,
};

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns the quote series, the renderer pipeline and the
/// selection state, and turns host scroll/size changes into frames for the
/// backend renderer.
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) configuration: ChartConfiguration,
    pub(super) pipeline: RendererPipeline,
    pub(super) values: ContextValues,
    pub(super) selection: SelectionState,
    pub(super) formatter: Option<Box<dyn ValueFormatter>>,
    pub(super) text_metrics: Box<dyn TextMetrics>,
    pub(super) last_frame: Option<FrameState>,
}

impl<R: Renderer> ChartEngine<R> {
    /// Creates an engine with no data, no groups and no plugins.
    pub fn new(renderer: R, configuration: ChartConfiguration) -> ChartResult<Self> {
        configuration.validate()?;
        Ok(Self {
            renderer,
            configuration,
            pipeline: RendererPipeline::new(),
            values: ContextValues::default(),
            selection: SelectionState::default(),
            formatter: None,
            text_metrics: Box::new(EstimatedTextMetrics),
            last_frame: None,
        })
    }

    #[must_use]
    pub fn configuration(&self) -> &ChartConfiguration {
        &self.configuration
    }

    /// Replaces the configuration; the next frame is rebuilt from scratch.
    pub fn set_configuration(&mut self, configuration: ChartConfiguration) -> ChartResult<()> {
        configuration.validate()?;
        self.configuration = configuration;
        self.last_frame = None;
        Ok(())
    }

    /// Overrides the preferred value formatter.
    ///
    /// Without an override, values use `price_precision` decimals.
    pub fn set_formatter(&mut self, formatter: Option<Box<dyn ValueFormatter>>) {
        self.formatter = formatter;
    }

    pub fn set_text_metrics(&mut self, text_metrics: Box<dyn TextMetrics>) {
        self.text_metrics = text_metrics;
    }

    pub fn layout(&self) -> ChartResult<ChartLayout> {
        ChartLayout::new(self.configuration.layout_metrics(), self.values.len())
    }

    /// Scrollable size of the chart: data width by stacked group height.
    pub fn content_size(&self) -> ChartResult<Size> {
        Ok(Size::new(
            self.layout()?.content_width(),
            self.pipeline.content_height(),
        ))
    }

    /// Horizontal offset that shows the most recent quotes.
    pub fn trailing_offset(&self, viewport_width: f64) -> ChartResult<f64> {
        Ok((self.layout()?.content_width() - viewport_width).max(0.0))
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&FrameState> {
        self.last_frame.as_ref()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        self.values.quotes()
    }

    #[must_use]
    pub fn values(&self) -> &ContextValues {
        &self.values
    }

    /// Runs one render pass against the host's current geometry.
    ///
    /// Plugin failures are isolated and reported; only invalid geometry, an
    /// unattached engine or a backend error fail the whole frame.
    pub fn render(&mut self, host: &mut dyn HostSurface) -> ChartResult<FrameReport> {
        if !self.pipeline.is_attached() {
            return Err(ChartError::InvalidData(
                "chart engine must be attached before rendering".to_owned(),
            ));
        }
        let geometry = host.geometry();
        geometry.viewport.validate()?;
        if !geometry.content_offset.is_finite() {
            return Err(ChartError::InvalidData(
                "content offset must be finite".to_owned(),
            ));
        }

        self.pipeline.setup_pending(host);
        let layout = self.layout()?;
        let frame = FrameState::build(
            &self.pipeline,
            &self.values,
            layout,
            geometry,
            self.selection,
        );

        let default_formatter =
            DecimalFormatter::new(usize::from(self.configuration.price_precision));
        let formatter: &dyn ValueFormatter = match &self.formatter {
            Some(formatter) => formatter.as_ref(),
            None => &default_formatter,
        };
        let shared = SharedFrameInputs {
            values: &self.values,
            configuration: &self.configuration,
            formatter,
            text_metrics: self.text_metrics.as_ref(),
        };

        let mut report = FrameReport::new(frame.visible_range.clone());
        for group in &frame.groups {
            let context = frame.context(group, shared);
            self.pipeline
                .render_group(group.group, &context, host, &mut report);
        }

        let scene = self
            .pipeline
            .extract_scene(geometry.visible_rect(), &mut report);
        report.scene_items = scene.len();
        self.renderer.render(&scene)?;

        debug!(
            start = report.visible_range.start,
            end = report.visible_range.end,
            rendered = report.rendered,
            faults = report.faults.len(),
            scene_items = report.scene_items,
            "chart frame rendered"
        );
        self.last_frame = Some(frame);
        Ok(report)
    }
}
