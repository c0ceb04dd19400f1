mod config;
mod context;
mod context_values;
mod data_controller;
mod engine;
mod formatter;
mod frame_builder;
mod group;
mod interaction_controller;
mod pipeline;
mod plugin_registry;

pub use config::{CONFIGURATION_JSON_SCHEMA_V1, ChartConfiguration, ChartStyle};
pub use context::RenderContext;
pub use context_values::{ContextKey, ContextValues};
pub use engine::ChartEngine;
pub use formatter::{
    DateFormatter, DecimalFormatter, DecimalSeparator, PatternDateFormatter, ValueFormatter,
};
pub use frame_builder::{FrameState, GroupFrame, SelectionState, SharedFrameInputs};
pub use group::{ChartGroup, GroupId};
pub use pipeline::{FaultKind, FrameReport, PluginFault, PluginLifecycle, RendererPipeline};
