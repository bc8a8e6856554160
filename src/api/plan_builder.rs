use tracing::trace;

use crate::core::{CanonicalDataset, GroupId, GroupSeries, ScenarioId, ScenarioSeries, SeriesRef};
use crate::error::ConditionResult;
use crate::render::{
    Color, ControlSize, DrawInstruction, DrawKind, DrawPlan, DrawStyle, ElementId, PlanLayer,
    ZoneTrigger,
};

use super::{DisplayOverride, GroupDisplay, StrategyKind, VisualConfig};

pub const HISTORICAL_STROKE_WIDTH: f64 = 2.0;
pub const AGGREGATED_STROKE_WIDTH: f64 = 2.0;
pub const AGGREGATED_DASH_PX: f64 = 5.0;
pub const SCENARIO_STROKE_WIDTH: f64 = 1.5;
pub const HOVER_ZONE_STROKE_WIDTH: f64 = 15.0;
pub const CLICK_ZONE_STROKE_WIDTH: f64 = 20.0;
pub const NEXT_LINE_LABEL: &str = "Next Line";
pub const SELECT_ALL_LABEL: &str = "Select All";

/// Which derived series one group draws and how they start out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundsMode {
    Off,
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScenarioMode {
    Off,
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GroupRecipe {
    aggregated: bool,
    bounds: BoundsMode,
    scenarios: ScenarioMode,
    /// `None` draws every scenario.
    scenario_limit: Option<usize>,
    zone: Option<(ZoneTrigger, f64)>,
}

impl GroupRecipe {
    const fn new(aggregated: bool, bounds: BoundsMode, scenarios: ScenarioMode) -> Self {
        Self {
            aggregated,
            bounds,
            scenarios,
            scenario_limit: None,
            zone: None,
        }
    }

    fn with_zone(mut self, trigger: ZoneTrigger, offset_x_px: f64) -> Self {
        self.zone = Some((trigger, offset_x_px));
        self
    }
}

fn recipe_for(kind: StrategyKind, display: GroupDisplay, config: &VisualConfig) -> GroupRecipe {
    use BoundsMode as B;
    use ScenarioMode as S;

    match kind {
        StrategyKind::HistoricalOnly => GroupRecipe::new(false, B::Off, S::Off),
        StrategyKind::Baseline => GroupRecipe::new(true, B::Off, S::Off),
        StrategyKind::ConfidenceBand => GroupRecipe::new(true, B::Visible, S::Off),
        StrategyKind::Ensemble => GroupRecipe::new(true, B::Off, S::Visible),
        StrategyKind::EnsembleHover => {
            GroupRecipe::new(true, B::Off, S::Hidden).with_zone(ZoneTrigger::Hover, 0.0)
        }
        StrategyKind::BandHover => {
            GroupRecipe::new(true, B::Hidden, S::Off).with_zone(ZoneTrigger::Hover, 0.0)
        }
        StrategyKind::BandToEnsemble => {
            GroupRecipe::new(true, B::Visible, S::Hidden).with_zone(ZoneTrigger::Hover, 0.0)
        }
        StrategyKind::Broken => GroupRecipe::new(true, B::Off, S::Hidden)
            .with_zone(ZoneTrigger::Hover, config.degraded.hit_zone_offset_px),
        StrategyKind::Poor => {
            GroupRecipe::new(true, B::Off, S::Hidden).with_zone(ZoneTrigger::Click, 0.0)
        }
        StrategyKind::EscapingAggregate | StrategyKind::ShuffledHover => {
            GroupRecipe::new(true, B::Off, S::Hidden).with_zone(ZoneTrigger::Hover, 0.0)
        }
        StrategyKind::Checklist
        | StrategyKind::CompactChecklist
        | StrategyKind::MisroutedChecklist => GroupRecipe::new(true, B::Off, S::Hidden),
        StrategyKind::Combined => GroupRecipe::new(true, B::Visible, S::Visible),
        StrategyKind::SequentialReveal => GroupRecipe::new(true, B::Off, S::Hidden),
        StrategyKind::Parameterized => match display {
            GroupDisplay::Region => GroupRecipe::new(true, B::Visible, S::Off),
            GroupDisplay::Lines { count } if count <= 1 => GroupRecipe::new(true, B::Off, S::Off),
            GroupDisplay::Lines { count } => GroupRecipe {
                scenario_limit: Some(count),
                ..GroupRecipe::new(true, B::Off, S::Visible)
            },
        },
    }
}

/// Scenario subset for a line-count display: preferred ids first in their
/// configured order, then the remaining scenarios ascending.
#[must_use]
pub fn select_scenarios<'a>(
    series: &'a GroupSeries,
    limit: Option<usize>,
    preferred: &[ScenarioId],
) -> Vec<&'a ScenarioSeries> {
    let total = series.alternatives.len();
    let Some(limit) = limit.filter(|&limit| limit < total) else {
        return series.alternatives.iter().collect();
    };

    let mut selected: Vec<&ScenarioSeries> = preferred
        .iter()
        .filter_map(|scenario| series.scenario(scenario))
        .take(limit)
        .collect();
    for scenario in &series.alternatives {
        if selected.len() >= limit {
            break;
        }
        if !selected
            .iter()
            .any(|chosen| chosen.scenario == scenario.scenario)
        {
            selected.push(scenario);
        }
    }
    selected
}

/// Label of one scenario line in status text and tooltips.
#[must_use]
pub fn line_label(group: &GroupId, scenario: &ScenarioId) -> String {
    format!("{group} - {}", scenario.label())
}

/// Checkbox footprint of the checklist kinds; `None` for every other kind.
fn checklist_size(kind: StrategyKind) -> Option<ControlSize> {
    match kind {
        StrategyKind::Checklist | StrategyKind::MisroutedChecklist => Some(ControlSize::Regular),
        StrategyKind::CompactChecklist => Some(ControlSize::Compact),
        _ => None,
    }
}

/// Builds the layered draw plan of one condition.
///
/// Pure: the same inputs always give an equal plan.
pub fn build_draw_plan(
    kind: StrategyKind,
    dataset: &CanonicalDataset,
    config: &VisualConfig,
    display: &DisplayOverride,
) -> ConditionResult<DrawPlan> {
    let mut plan = DrawPlan::new(kind.slug(), dataset.shared_value_scale());

    let checklist = checklist_size(kind);
    for (index, (group, series)) in dataset.groups().iter().enumerate() {
        let color = config.color_for(index)?;
        let recipe = recipe_for(kind, display.display_for(group), config);
        push_group(&mut plan, group, series, color, recipe, config);
        if let Some(size) = checklist {
            for scenario in &series.alternatives {
                plan.push(control(
                    ElementId::toggle_control(group, &scenario.scenario),
                    line_label(group, &scenario.scenario),
                    size,
                    color,
                ));
            }
        }
    }

    if kind == StrategyKind::SequentialReveal {
        plan.push(control(
            ElementId::next_line_control(),
            NEXT_LINE_LABEL.to_owned(),
            ControlSize::Regular,
            config.colors.group_a,
        ));
    }
    if let Some(size) = checklist {
        plan.push(control(
            ElementId::select_all_control(),
            SELECT_ALL_LABEL.to_owned(),
            size,
            config.colors.group_a,
        ));
    }

    plan.normalize_layers();
    plan.validate()?;
    trace!(
        strategy = kind.slug(),
        instructions = plan.len(),
        "draw plan built"
    );
    Ok(plan)
}

fn control(element: ElementId, label: String, size: ControlSize, color: Color) -> DrawInstruction {
    DrawInstruction::new(
        element,
        PlanLayer::Controls,
        DrawKind::Control { label, size },
        DrawStyle::solid(color, 0.0),
        1.0,
    )
}

fn push_group(
    plan: &mut DrawPlan,
    group: &GroupId,
    series: &GroupSeries,
    color: Color,
    recipe: GroupRecipe,
    config: &VisualConfig,
) {
    plan.push(DrawInstruction::new(
        ElementId::historical(group),
        PlanLayer::Historical,
        DrawKind::Line {
            series: SeriesRef::Historical(group.clone()),
            anchored: false,
        },
        DrawStyle::solid(color, HISTORICAL_STROKE_WIDTH),
        1.0,
    ));

    if recipe.bounds != BoundsMode::Off {
        let bounds = DrawInstruction::new(
            ElementId::bounds(group),
            PlanLayer::Bounds,
            DrawKind::Area {
                series: SeriesRef::Bounds(group.clone()),
                anchored: true,
            },
            DrawStyle::solid(color, 0.0),
            config.shade_opacity,
        );
        plan.push(if recipe.bounds == BoundsMode::Hidden {
            bounds.hidden()
        } else {
            bounds
        });
    }

    if recipe.scenarios != ScenarioMode::Off {
        for scenario in select_scenarios(series, recipe.scenario_limit, &config.sampled_scenarios) {
            let line = DrawInstruction::new(
                ElementId::scenario(group, &scenario.scenario),
                PlanLayer::Scenarios,
                DrawKind::Line {
                    series: SeriesRef::Scenario(group.clone(), scenario.scenario.clone()),
                    anchored: true,
                },
                DrawStyle::solid(color, SCENARIO_STROKE_WIDTH),
                config.alternative_opacity,
            );
            plan.push(if recipe.scenarios == ScenarioMode::Hidden {
                line.hidden()
            } else {
                line
            });
        }
    }

    if recipe.aggregated {
        plan.push(DrawInstruction::new(
            ElementId::aggregated(group),
            PlanLayer::Aggregated,
            DrawKind::Line {
                series: SeriesRef::Aggregated(group.clone()),
                anchored: true,
            },
            DrawStyle::dashed(
                color,
                AGGREGATED_STROKE_WIDTH,
                AGGREGATED_DASH_PX,
                AGGREGATED_DASH_PX,
            ),
            1.0,
        ));
    }

    if let Some((trigger, offset_x_px)) = recipe.zone {
        let stroke_width = match trigger {
            ZoneTrigger::Hover => HOVER_ZONE_STROKE_WIDTH,
            ZoneTrigger::Click => CLICK_ZONE_STROKE_WIDTH,
        };
        plan.push(DrawInstruction::new(
            ElementId::zone(group),
            PlanLayer::HitZones,
            DrawKind::HitZone {
                target: SeriesRef::Aggregated(group.clone()),
                anchored: true,
                trigger,
                offset_px: (offset_x_px, 0.0),
            },
            DrawStyle::solid(Color::rgba(0.0, 0.0, 0.0, 0.0), stroke_width),
            1.0,
        ));
    }
}
