use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::core::{CanonicalDataset, GroupId, SeriesRef};
use crate::interaction::{
    BrokenTargets, Checklist, ChecklistEntry, HoverPair, HoverReveal, HoverTransform,
    InteractionMachine, PoorInteraction, PoorTargets, RevealLine, RevealTarget, SequentialReveal,
    ShuffledHover, ToggleRouting, TransformPair, mismatched_pairing,
};
use crate::render::{DrawInstruction, DrawKind, DrawPlan, ElementId, PlanLayer};

use super::plan_builder::line_label;
use super::{StrategyKind, VisualConfig};

/// Scenario-line instructions of one group, in draw order.
fn scenario_lines<'a>(
    plan: &'a DrawPlan,
    group: &'a GroupId,
) -> impl Iterator<Item = &'a DrawInstruction> + 'a {
    plan.in_layer(PlanLayer::Scenarios).filter(move |instruction| {
        matches!(
            &instruction.kind,
            DrawKind::Line { series: SeriesRef::Scenario(owner, _), .. } if owner == group
        )
    })
}

fn reveal_line(instruction: &DrawInstruction) -> Option<RevealLine> {
    let DrawKind::Line {
        series: SeriesRef::Scenario(group, scenario),
        ..
    } = &instruction.kind
    else {
        return None;
    };
    Some(RevealLine {
        element: instruction.element.clone(),
        label: line_label(group, scenario),
        opacity: instruction.opacity,
    })
}

fn scenario_targets(plan: &DrawPlan, group: &GroupId) -> Vec<RevealTarget> {
    scenario_lines(plan, group)
        .map(|instruction| RevealTarget {
            element: instruction.element.clone(),
            opacity: instruction.opacity,
        })
        .collect()
}

/// Groups that own a hit zone in the plan, in dataset order.
fn zoned_groups<'a>(plan: &DrawPlan, dataset: &'a CanonicalDataset) -> Vec<&'a GroupId> {
    dataset
        .group_ids()
        .filter(|group| plan.contains(&ElementId::zone(group)))
        .collect()
}

/// Builds the interaction machine a kind attaches, from its rendered plan.
#[must_use]
pub(super) fn build_machine(
    kind: StrategyKind,
    plan: &DrawPlan,
    dataset: &CanonicalDataset,
    config: &VisualConfig,
) -> Option<InteractionMachine> {
    let machine = match kind {
        StrategyKind::EnsembleHover | StrategyKind::BandHover => {
            let pairs = zoned_groups(plan, dataset)
                .into_iter()
                .map(|group| {
                    let reveals = if kind == StrategyKind::BandHover {
                        plan.instruction(&ElementId::bounds(group))
                            .map(|bounds| RevealTarget {
                                element: bounds.element.clone(),
                                opacity: bounds.opacity,
                            })
                            .into_iter()
                            .collect()
                    } else {
                        scenario_targets(plan, group)
                    };
                    HoverPair::new(ElementId::zone(group), group.clone(), reveals)
                })
                .collect();
            InteractionMachine::Hover(HoverReveal::new(
                pairs,
                config.fade_in_ms,
                config.fade_out_ms,
            ))
        }
        StrategyKind::Broken => {
            let groups = zoned_groups(plan, dataset);
            let mut rng = StdRng::seed_from_u64(config.degraded.seed);
            let pairing =
                mismatched_pairing(groups.len(), config.degraded.mismatch_fraction, &mut rng);
            let pairs = groups
                .iter()
                .zip(&pairing)
                .map(|(&group, &source_index)| {
                    let source = groups[source_index];
                    HoverPair::new(
                        ElementId::zone(group),
                        group.clone(),
                        scenario_targets(plan, source),
                    )
                    .with_source(source.clone())
                })
                .collect();
            InteractionMachine::Hover(
                HoverReveal::new(pairs, config.fade_in_ms, config.fade_out_ms).broken(
                    BrokenTargets {
                        offset_px: config.degraded.hit_zone_offset_px,
                    },
                ),
            )
        }
        StrategyKind::BandToEnsemble => {
            let pairs = zoned_groups(plan, dataset)
                .into_iter()
                .map(|group| TransformPair {
                    zone: ElementId::zone(group),
                    group: group.clone(),
                    bounds: ElementId::bounds(group),
                    scenarios: scenario_lines(plan, group)
                        .map(|instruction| instruction.element.clone())
                        .collect(),
                    state: Default::default(),
                })
                .collect();
            InteractionMachine::Transform(
                HoverTransform::new(
                    pairs,
                    config.shade_opacity,
                    config.alternative_opacity,
                    config.transform_ms,
                )
                .with_morph_after_ms(config.morph_after_ms),
            )
        }
        StrategyKind::Poor => {
            let targets = zoned_groups(plan, dataset)
                .into_iter()
                .map(|group| PoorTargets {
                    zone: ElementId::zone(group),
                    group: group.clone(),
                    unstable: vec![ElementId::aggregated(group), ElementId::zone(group)],
                    lines: scenario_lines(plan, group).filter_map(reveal_line).collect(),
                    revealed: 0,
                })
                .collect();
            InteractionMachine::Poor(PoorInteraction::new(
                targets,
                config.degraded,
                config.fade_in_ms,
                config.fade_out_ms,
            ))
        }
        StrategyKind::SequentialReveal => {
            let lines = plan
                .in_layer(PlanLayer::Scenarios)
                .filter_map(reveal_line)
                .collect();
            InteractionMachine::Sequential(SequentialReveal::new(
                ElementId::next_line_control(),
                lines,
                config.fade_in_ms,
            ))
        }
        StrategyKind::EscapingAggregate => {
            let mut rng = StdRng::seed_from_u64(config.degraded.seed);
            let pairs = zoned_groups(plan, dataset)
                .into_iter()
                .map(|group| {
                    let mut lines = scenario_targets(plan, group);
                    let replacement = if lines.is_empty() {
                        Vec::new()
                    } else {
                        let pick = rng.gen_range(0..lines.len());
                        vec![lines.swap_remove(pick)]
                    };
                    let aggregated = plan
                        .instruction(&ElementId::aggregated(group))
                        .map(|aggregated| RevealTarget {
                            element: aggregated.element.clone(),
                            opacity: aggregated.opacity,
                        })
                        .into_iter()
                        .collect();
                    HoverPair::new(ElementId::zone(group), group.clone(), replacement)
                        .with_conceals(aggregated)
                })
                .collect();
            InteractionMachine::Hover(HoverReveal::new(
                pairs,
                config.fade_in_ms,
                config.fade_out_ms,
            ))
        }
        StrategyKind::ShuffledHover => {
            let pairs = zoned_groups(plan, dataset)
                .into_iter()
                .map(|group| {
                    HoverPair::new(
                        ElementId::zone(group),
                        group.clone(),
                        scenario_targets(plan, group),
                    )
                })
                .collect();
            InteractionMachine::Shuffled(ShuffledHover::new(
                pairs,
                config.degraded.shuffle_sample_size,
                config.degraded.seed,
                config.fade_in_ms,
                config.fade_out_ms,
            ))
        }
        StrategyKind::Checklist
        | StrategyKind::CompactChecklist
        | StrategyKind::MisroutedChecklist => {
            let entries = plan
                .in_layer(PlanLayer::Scenarios)
                .filter_map(|instruction| {
                    let DrawKind::Line {
                        series: SeriesRef::Scenario(group, scenario),
                        ..
                    } = &instruction.kind
                    else {
                        return None;
                    };
                    let control = ElementId::toggle_control(group, scenario);
                    if !plan.contains(&control) {
                        return None;
                    }
                    Some(ChecklistEntry {
                        control,
                        line: reveal_line(instruction)?,
                        checked: false,
                    })
                })
                .collect();
            let routing = if kind == StrategyKind::MisroutedChecklist {
                ToggleRouting::NextEntry
            } else {
                ToggleRouting::Direct
            };
            InteractionMachine::Checklist(
                Checklist::new(
                    entries,
                    ElementId::select_all_control(),
                    config.fade_in_ms,
                    config.fade_out_ms,
                )
                .with_routing(routing),
            )
        }
        StrategyKind::HistoricalOnly
        | StrategyKind::Baseline
        | StrategyKind::ConfidenceBand
        | StrategyKind::Ensemble
        | StrategyKind::Combined
        | StrategyKind::Parameterized => return None,
    };
    debug!(strategy = kind.slug(), machine = machine.name(), "interaction machine built");
    Some(machine)
}
