use crate::error::ChartResult;
use crate::extensions::RendererPlugin;
use crate::render::{HostSurface, LayerId, Renderer};

use super::{ChartEngine, ChartGroup, GroupId, PluginLifecycle, RendererPipeline};

impl<R: Renderer> ChartEngine<R> {
    /// Appends a group below the existing ones.
    pub fn add_group(&mut self, group: ChartGroup) -> ChartResult<GroupId> {
        self.pipeline.add_group(group)
    }

    /// Registers a plugin with unique identifier into `group`.
    ///
    /// Derived values are recomputed so the plugin sees them on its first
    /// frame.
    pub fn register_plugin(
        &mut self,
        group: GroupId,
        plugin: Box<dyn RendererPlugin>,
    ) -> ChartResult<LayerId> {
        let layer = self.pipeline.register(group, plugin)?;
        self.pipeline.process_quotes(&mut self.values);
        Ok(layer)
    }

    /// Unregisters a plugin by id, tearing it down first when attached.
    /// Returns `true` when removed.
    pub fn unregister_plugin(&mut self, plugin_id: &str, host: &mut dyn HostSurface) -> bool {
        let removed = self.pipeline.unregister(plugin_id, host);
        if removed {
            self.last_frame = None;
        }
        removed
    }

    /// Sets up every registered plugin against `host`.
    pub fn attach(&mut self, host: &mut dyn HostSurface) {
        self.pipeline.attach(host);
    }

    /// Tears down every plugin; all drawables leave `host`.
    pub fn detach(&mut self, host: &mut dyn HostSurface) {
        self.pipeline.detach(host);
        self.last_frame = None;
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.pipeline.is_attached()
    }

    #[must_use]
    pub fn plugin_count(&self) -> usize {
        self.pipeline.len()
    }

    #[must_use]
    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.pipeline.contains(plugin_id)
    }

    #[must_use]
    pub fn plugin_lifecycle(&self, plugin_id: &str) -> Option<PluginLifecycle> {
        self.pipeline.lifecycle(plugin_id)
    }

    #[must_use]
    pub fn pipeline(&self) -> &RendererPipeline {
        &self.pipeline
    }
}
