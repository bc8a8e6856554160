use crate::core::CanonicalDataset;
use crate::error::{ConditionError, ConditionResult};
use crate::render::{DrawKind, DrawPlan, Renderer};

/// No-op renderer used by tests and headless hosts.
///
/// It still validates the plan and resolves every referenced series, so tests
/// catch dangling references before a real geometry provider is involved.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_line_count: usize,
    pub last_area_count: usize,
    pub last_hit_zone_count: usize,
    pub last_point_count: usize,
    pub render_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, plan: &DrawPlan, dataset: &CanonicalDataset) -> ConditionResult<()> {
        plan.validate()?;

        let mut lines = 0;
        let mut areas = 0;
        let mut hit_zones = 0;
        let mut points = 0;
        for instruction in &plan.instructions {
            match &instruction.kind {
                DrawKind::Line { .. } => lines += 1,
                DrawKind::Area { .. } => areas += 1,
                DrawKind::HitZone { .. } => hit_zones += 1,
                DrawKind::Control { .. } => continue,
            }
            if let Some((series, anchored)) = instruction.kind.series() {
                let resolved = dataset.resolve(series, anchored).ok_or_else(|| {
                    ConditionError::InvalidConfiguration(format!(
                        "element `{}` references a series missing from the dataset",
                        instruction.element
                    ))
                })?;
                points += resolved.len();
            }
        }

        self.last_line_count = lines;
        self.last_area_count = areas;
        self.last_hit_zone_count = hit_zones;
        self.last_point_count = points;
        self.render_count += 1;
        Ok(())
    }
}
