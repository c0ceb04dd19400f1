use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::core::{ExtremePoint, Rect, reduce_extreme_points};
use crate::error::{ChartError, ChartResult};
use crate::extensions::RendererPlugin;
use crate::render::{HostSurface, LayerId, LayerSurface, RenderFrame};

use super::{ChartGroup, ContextValues, GroupId, RenderContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginLifecycle {
    Unattached,
    Attached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    /// `render` returned an error.
    Error,
    /// `render` panicked.
    Panic,
    /// A drawable carried non-finite geometry at scene extraction.
    InvalidDrawable,
}

/// Failure of one plugin during one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginFault {
    pub plugin_id: String,
    pub kind: FaultKind,
    pub message: String,
}

impl PluginFault {
    #[must_use]
    pub fn to_error(&self) -> ChartError {
        ChartError::PluginFault {
            plugin_id: self.plugin_id.clone(),
            message: self.message.clone(),
        }
    }
}

/// Outcome of one render pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameReport {
    pub visible_range: Range<usize>,
    pub rendered: usize,
    pub skipped: usize,
    pub scene_items: usize,
    pub faults: Vec<PluginFault>,
}

impl FrameReport {
    #[must_use]
    pub fn new(visible_range: Range<usize>) -> Self {
        Self {
            visible_range,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    fn has_fault_for(&self, plugin_id: &str) -> bool {
        self.faults.iter().any(|fault| fault.plugin_id == plugin_id)
    }
}

struct PluginEntry {
    plugin: Box<dyn RendererPlugin>,
    layer: LayerId,
    group: GroupId,
    z_position: f64,
    lifecycle: PluginLifecycle,
}

/// Ordered set of renderer plugins arranged in vertical groups.
///
/// Registration order is drawing order: each plugin receives a z position
/// strictly above every plugin registered before it.
#[derive(Default)]
pub struct RendererPipeline {
    groups: Vec<ChartGroup>,
    entries: IndexMap<String, PluginEntry>,
    next_layer: u32,
    next_z_position: f64,
    attached: bool,
}

impl std::fmt::Debug for RendererPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererPipeline")
            .field("groups", &self.groups)
            .field("plugins", &self.entries.keys().collect::<Vec<_>>())
            .field("attached", &self.attached)
            .finish()
    }
}

impl RendererPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, group: ChartGroup) -> ChartResult<GroupId> {
        let group = group.validate()?;
        self.groups.push(group);
        Ok(GroupId::new(self.groups.len() - 1))
    }

    #[must_use]
    pub fn groups(&self) -> &[ChartGroup] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<ChartGroup> {
        self.groups.get(id.index()).copied()
    }

    /// Stacked height of every group.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.groups.iter().map(|group| group.height).sum()
    }

    /// Registers a plugin into `group` and assigns its z position.
    ///
    /// The plugin is set up on the next attach or render pass.
    pub fn register(
        &mut self,
        group: GroupId,
        mut plugin: Box<dyn RendererPlugin>,
    ) -> ChartResult<LayerId> {
        let plugin_id = plugin.id().to_owned();
        if plugin_id.is_empty() {
            return Err(ChartError::InvalidData(
                "plugin id must not be empty".to_owned(),
            ));
        }
        if self.entries.contains_key(&plugin_id) {
            return Err(ChartError::InvalidData(format!(
                "plugin with id `{plugin_id}` is already registered"
            )));
        }
        if group.index() >= self.groups.len() {
            return Err(ChartError::InvalidData(format!(
                "group {} does not exist",
                group.index()
            )));
        }

        let layer = LayerId::new(self.next_layer);
        self.next_layer += 1;
        let z_position = self.next_z_position;
        self.next_z_position += 1.0;
        plugin.update_z_position(z_position);
        debug!(
            plugin = %plugin_id,
            layer = layer.raw(),
            group = group.index(),
            z_position,
            "registered renderer plugin"
        );
        self.entries.insert(
            plugin_id,
            PluginEntry {
                plugin,
                layer,
                group,
                z_position,
                lifecycle: PluginLifecycle::Unattached,
            },
        );
        Ok(layer)
    }

    /// Removes a plugin, tearing it down first when attached.
    pub fn unregister(&mut self, plugin_id: &str, host: &mut dyn HostSurface) -> bool {
        let Some(mut entry) = self.entries.shift_remove(plugin_id) else {
            return false;
        };
        if entry.lifecycle == PluginLifecycle::Attached {
            let mut surface = LayerSurface::new(host, entry.layer);
            entry.plugin.tear_down(&mut surface);
        }
        debug!(plugin = %plugin_id, "unregistered renderer plugin");
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, plugin_id: &str) -> bool {
        self.entries.contains_key(plugin_id)
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn lifecycle(&self, plugin_id: &str) -> Option<PluginLifecycle> {
        self.entries.get(plugin_id).map(|entry| entry.lifecycle)
    }

    #[must_use]
    pub fn layer_of(&self, plugin_id: &str) -> Option<LayerId> {
        self.entries.get(plugin_id).map(|entry| entry.layer)
    }

    #[must_use]
    pub fn z_position_of(&self, plugin_id: &str) -> Option<f64> {
        self.entries.get(plugin_id).map(|entry| entry.z_position)
    }

    pub fn plugin_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Marks the pipeline attached and sets up every pending plugin.
    pub fn attach(&mut self, host: &mut dyn HostSurface) {
        self.attached = true;
        self.setup_pending(host);
    }

    /// Sets up plugins registered since the last attach.
    pub fn setup_pending(&mut self, host: &mut dyn HostSurface) {
        if !self.attached {
            return;
        }
        for (plugin_id, entry) in &mut self.entries {
            if entry.lifecycle == PluginLifecycle::Attached {
                continue;
            }
            let mut surface = LayerSurface::new(&mut *host, entry.layer);
            entry.plugin.setup(&mut surface);
            entry.plugin.update_z_position(entry.z_position);
            entry.lifecycle = PluginLifecycle::Attached;
            trace!(plugin = %plugin_id, "renderer plugin set up");
        }
    }

    /// Tears down every attached plugin and marks the pipeline detached.
    pub fn detach(&mut self, host: &mut dyn HostSurface) {
        for (plugin_id, entry) in &mut self.entries {
            if entry.lifecycle != PluginLifecycle::Attached {
                debug!(plugin = %plugin_id, "skipping tear down of unattached plugin");
                continue;
            }
            let mut surface = LayerSurface::new(&mut *host, entry.layer);
            entry.plugin.tear_down(&mut surface);
            entry.lifecycle = PluginLifecycle::Unattached;
        }
        self.attached = false;
    }

    /// Lets every plugin derive values from freshly replaced quotes.
    pub fn process_quotes(&self, values: &mut ContextValues) {
        for entry in self.entries.values() {
            entry.plugin.process_quotes(values);
        }
    }

    /// Union of the extreme points contributed by the plugins of `group`.
    #[must_use]
    pub fn extreme_point(
        &self,
        group: GroupId,
        values: &ContextValues,
        visible_range: Range<usize>,
    ) -> Option<ExtremePoint> {
        if visible_range.is_empty() {
            return None;
        }
        reduce_extreme_points(
            self.entries
                .values()
                .filter(|entry| entry.group == group)
                .map(|entry| entry.plugin.extreme_point(values, visible_range.clone())),
        )
    }

    /// Renders the plugins of `group` in registration order.
    ///
    /// A plugin that returns an error or panics is skipped for this frame and
    /// recorded in `report`; the remaining plugins still render.
    pub fn render_group(
        &mut self,
        group: GroupId,
        context: &RenderContext<'_>,
        host: &mut dyn HostSurface,
        report: &mut FrameReport,
    ) {
        for (plugin_id, entry) in &mut self.entries {
            if entry.group != group {
                continue;
            }
            if entry.lifecycle != PluginLifecycle::Attached {
                debug!(plugin = %plugin_id, "skipping render of unattached plugin");
                report.skipped += 1;
                continue;
            }

            let mut surface = LayerSurface::new(&mut *host, entry.layer);
            let plugin = &mut entry.plugin;
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| plugin.render(&mut surface, context)));
            match outcome {
                Ok(Ok(())) => report.rendered += 1,
                Ok(Err(err)) => {
                    warn!(plugin = %plugin_id, error = %err, "renderer plugin failed");
                    report.faults.push(PluginFault {
                        plugin_id: plugin_id.clone(),
                        kind: FaultKind::Error,
                        message: err.to_string(),
                    });
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(plugin = %plugin_id, message = %message, "renderer plugin panicked");
                    report.faults.push(PluginFault {
                        plugin_id: plugin_id.clone(),
                        kind: FaultKind::Panic,
                        message,
                    });
                }
            }
        }
    }

    /// Collects visible drawables into a z-ordered scene.
    ///
    /// Plugins that faulted this frame contribute nothing; a plugin exposing
    /// a drawable with non-finite geometry is dropped from the scene and
    /// recorded as faulted.
    pub fn extract_scene(&self, viewport: Rect, report: &mut FrameReport) -> RenderFrame<'_> {
        let mut frame = RenderFrame::new(viewport);
        for (plugin_id, entry) in &self.entries {
            if entry.lifecycle != PluginLifecycle::Attached || report.has_fault_for(plugin_id) {
                continue;
            }
            let start = frame.len();
            let mut invalid: Option<String> = None;
            entry.plugin.visit_drawables(&mut |drawable| {
                if invalid.is_some() {
                    return;
                }
                match drawable.validate() {
                    Ok(()) => frame.push(entry.layer, drawable),
                    Err(err) => invalid = Some(err.to_string()),
                }
            });
            if let Some(message) = invalid {
                frame.items.truncate(start);
                warn!(plugin = %plugin_id, error = %message, "dropping invalid plugin drawables");
                report.faults.push(PluginFault {
                    plugin_id: plugin_id.clone(),
                    kind: FaultKind::InvalidDrawable,
                    message,
                });
            }
        }
        frame.sort_by_z();
        frame
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "plugin panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use super::{PluginLifecycle, RendererPipeline};
    use crate::api::{ChartGroup, ContextValues, RenderContext};
    use crate::core::{ExtremePoint, Size};
    use crate::error::ChartResult;
    use crate::extensions::RendererPlugin;
    use crate::render::{Drawable, LayerSurface, RecordingSurface};

    struct Fixed {
        id: &'static str,
        extreme: Option<ExtremePoint>,
        z_position: f64,
    }

    impl RendererPlugin for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        fn render(
            &mut self,
            _surface: &mut LayerSurface<'_>,
            _context: &RenderContext<'_>,
        ) -> ChartResult<()> {
            Ok(())
        }

        fn tear_down(&mut self, _surface: &mut LayerSurface<'_>) {}

        fn update_z_position(&mut self, z_position: f64) {
            self.z_position = z_position;
        }

        fn extreme_point(
            &self,
            _values: &ContextValues,
            _visible_range: Range<usize>,
        ) -> Option<ExtremePoint> {
            self.extreme
        }

        fn visit_drawables<'a>(&'a self, _visitor: &mut dyn FnMut(&'a Drawable)) {}
    }

    fn fixed(id: &'static str, extreme: Option<ExtremePoint>) -> Box<Fixed> {
        Box::new(Fixed {
            id,
            extreme,
            z_position: -1.0,
        })
    }

    #[test]
    fn duplicate_and_empty_ids_are_rejected() {
        let mut pipeline = RendererPipeline::new();
        let group = pipeline.add_group(ChartGroup::new(100.0)).expect("group");
        pipeline.register(group, fixed("a", None)).expect("first");
        assert!(pipeline.register(group, fixed("a", None)).is_err());
        assert!(pipeline.register(group, fixed("", None)).is_err());
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn z_positions_follow_registration_order() {
        let mut pipeline = RendererPipeline::new();
        let group = pipeline.add_group(ChartGroup::new(100.0)).expect("group");
        for id in ["a", "b", "c"] {
            pipeline.register(group, fixed(id, None)).expect("register");
        }
        assert!(pipeline.z_position_of("a") < pipeline.z_position_of("b"));
        assert!(pipeline.z_position_of("b") < pipeline.z_position_of("c"));
    }

    #[test]
    fn group_extreme_point_is_the_union_of_contributions() {
        let mut pipeline = RendererPipeline::new();
        let main = pipeline.add_group(ChartGroup::new(100.0)).expect("group");
        let other = pipeline.add_group(ChartGroup::new(50.0)).expect("group");
        pipeline
            .register(main, fixed("a", Some(ExtremePoint::new(1.0, 5.0))))
            .expect("register");
        pipeline.register(main, fixed("b", None)).expect("register");
        pipeline
            .register(main, fixed("c", Some(ExtremePoint::new(3.0, 10.0))))
            .expect("register");
        pipeline
            .register(other, fixed("d", Some(ExtremePoint::new(-50.0, 0.0))))
            .expect("register");

        let values = ContextValues::default();
        assert_eq!(
            pipeline.extreme_point(main, &values, 0..10),
            Some(ExtremePoint::new(1.0, 10.0))
        );
        assert_eq!(pipeline.extreme_point(main, &values, 3..3), None);
        assert_eq!(pipeline.content_height(), 150.0);
    }

    #[test]
    fn attach_sets_up_and_detach_tears_down() {
        let mut host = RecordingSurface::new(Size::new(100.0, 100.0));
        let mut pipeline = RendererPipeline::new();
        let group = pipeline.add_group(ChartGroup::new(100.0)).expect("group");
        pipeline.register(group, fixed("a", None)).expect("register");
        assert_eq!(pipeline.lifecycle("a"), Some(PluginLifecycle::Unattached));

        pipeline.attach(&mut host);
        assert_eq!(pipeline.lifecycle("a"), Some(PluginLifecycle::Attached));
        pipeline.register(group, fixed("b", None)).expect("register");
        pipeline.setup_pending(&mut host);
        assert_eq!(pipeline.lifecycle("b"), Some(PluginLifecycle::Attached));

        pipeline.detach(&mut host);
        assert!(!pipeline.is_attached());
        assert_eq!(pipeline.lifecycle("a"), Some(PluginLifecycle::Unattached));
        assert!(pipeline.unregister("a", &mut host));
        assert!(!pipeline.unregister("a", &mut host));
    }
}
