mod layer_stack;
mod null_renderer;
mod plan;
mod primitives;

pub use layer_stack::PlanLayer;
pub use null_renderer::NullRenderer;
pub use plan::{ControlSize, DrawInstruction, DrawKind, DrawPlan, ElementId, ZoneTrigger};
pub use primitives::{Color, DrawStyle, StrokePattern};

use crate::core::CanonicalDataset;
use crate::error::ConditionResult;

/// Contract implemented by the chart-geometry provider.
///
/// Providers receive a fully materialized, deterministic `DrawPlan` plus the
/// dataset it references; path geometry, axes and mounting stay on their side.
pub trait Renderer {
    fn render(&mut self, plan: &DrawPlan, dataset: &CanonicalDataset) -> ConditionResult<()>;
}
