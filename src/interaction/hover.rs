use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use crate::core::GroupId;
use crate::interaction::{
    Effects, InteractionEffect, InteractionKind, InteractionTrigger, TimerPurpose,
};
use crate::render::ElementId;

/// Logical state of one hover target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HoverState {
    #[default]
    Hidden,
    Shown,
}

/// Element shown while a zone is hovered, and the opacity it takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealTarget {
    pub element: ElementId,
    pub opacity: f64,
}

/// One hover zone and what it reveals.
///
/// `source` names the group whose elements are revealed; it differs from
/// `group` for mismatched pairs. `conceals` fade out while the zone is
/// hovered and come back to their opacity on leave. A pair with no targets
/// is inert: hovering still logs, nothing changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverPair {
    pub zone: ElementId,
    pub group: GroupId,
    pub source: GroupId,
    pub reveals: Vec<RevealTarget>,
    #[serde(default)]
    pub conceals: Vec<RevealTarget>,
    #[serde(default)]
    pub state: HoverState,
}

impl HoverPair {
    #[must_use]
    pub fn new(zone: ElementId, group: GroupId, reveals: Vec<RevealTarget>) -> Self {
        Self {
            zone,
            source: group.clone(),
            group,
            reveals,
            conceals: Vec::new(),
            state: HoverState::Hidden,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: GroupId) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_conceals(mut self, conceals: Vec<RevealTarget>) -> Self {
        self.conceals = conceals;
        self
    }

    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.reveals.is_empty() && self.conceals.is_empty()
    }

    #[must_use]
    pub fn is_mismatched(&self) -> bool {
        self.group != self.source
    }
}

/// Displacement and pairing applied by the broken variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrokenTargets {
    pub offset_px: f64,
}

/// Hover fade-in / fade-out over a set of zone pairs.
///
/// The logical state flips synchronously; the fade is a separate visual track
/// that the owning strategy advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverReveal {
    pairs: Vec<HoverPair>,
    fade_in_ms: f64,
    fade_out_ms: f64,
    broken: Option<BrokenTargets>,
}

impl HoverReveal {
    #[must_use]
    pub fn new(pairs: Vec<HoverPair>, fade_in_ms: f64, fade_out_ms: f64) -> Self {
        Self {
            pairs,
            fade_in_ms,
            fade_out_ms,
            broken: None,
        }
    }

    #[must_use]
    pub fn broken(mut self, targets: BrokenTargets) -> Self {
        self.broken = Some(targets);
        self
    }

    #[must_use]
    pub fn pairs(&self) -> &[HoverPair] {
        &self.pairs
    }

    #[must_use]
    pub fn state_of(&self, zone: &ElementId) -> Option<HoverState> {
        self.pairs
            .iter()
            .find(|pair| &pair.zone == zone)
            .map(|pair| pair.state)
    }

    #[must_use]
    pub fn setup(&self) -> Effects {
        let mut effects = Effects::new();
        for pair in self.pairs.iter().filter(|pair| pair.is_inert()) {
            debug!(zone = %pair.zone, "hover pair has no reveal targets, kept inert");
        }
        if let Some(broken) = self.broken {
            let mismatched = self
                .pairs
                .iter()
                .filter(|pair| pair.is_mismatched())
                .map(|pair| json!({ "zone": pair.group.as_str(), "reveals": pair.source.as_str() }))
                .collect::<Vec<_>>();
            effects.push(InteractionEffect::Log {
                kind: InteractionKind::BrokenSetup,
                payload: json!({
                    "offset_px": broken.offset_px,
                    "mismatched_pairs": mismatched,
                }),
            });
        }
        effects
    }

    pub fn handle(&mut self, trigger: &InteractionTrigger) -> Effects {
        let mut effects = Effects::new();
        match trigger {
            InteractionTrigger::PointerEnter { zone, x, y } => {
                let Some(pair) = self.pairs.iter_mut().find(|pair| &pair.zone == zone) else {
                    trace!(zone = %zone, "pointer enter on unknown zone ignored");
                    return effects;
                };
                pair.state = HoverState::Shown;
                effects.push(InteractionEffect::Log {
                    kind: InteractionKind::HoverEnter,
                    payload: json!({
                        "zone": zone.as_str(),
                        "group": pair.group.as_str(),
                        "revealed_group": pair.source.as_str(),
                        "x": x,
                        "y": y,
                    }),
                });
                for target in &pair.reveals {
                    effects.push(InteractionEffect::FadeTo {
                        element: target.element.clone(),
                        opacity: target.opacity,
                        duration_ms: self.fade_in_ms,
                    });
                }
                for target in &pair.conceals {
                    effects.push(InteractionEffect::FadeTo {
                        element: target.element.clone(),
                        opacity: 0.0,
                        duration_ms: self.fade_out_ms,
                    });
                }
            }
            InteractionTrigger::PointerLeave { zone } => {
                let Some(pair) = self.pairs.iter_mut().find(|pair| &pair.zone == zone) else {
                    trace!(zone = %zone, "pointer leave on unknown zone ignored");
                    return effects;
                };
                pair.state = HoverState::Hidden;
                effects.push(InteractionEffect::Log {
                    kind: InteractionKind::HoverLeave,
                    payload: json!({
                        "zone": zone.as_str(),
                        "group": pair.group.as_str(),
                    }),
                });
                for target in &pair.reveals {
                    effects.push(InteractionEffect::FadeTo {
                        element: target.element.clone(),
                        opacity: 0.0,
                        duration_ms: self.fade_out_ms,
                    });
                }
                for target in &pair.conceals {
                    effects.push(InteractionEffect::FadeTo {
                        element: target.element.clone(),
                        opacity: target.opacity,
                        duration_ms: self.fade_in_ms,
                    });
                }
            }
            InteractionTrigger::Click { .. } => {}
        }
        effects
    }
}

/// Per-group elements swapped by the band-to-ensemble transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformPair {
    pub zone: ElementId,
    pub group: GroupId,
    pub bounds: ElementId,
    pub scenarios: Vec<ElementId>,
    #[serde(default)]
    pub state: HoverState,
}

/// Cross-fade from the bounds area to the scenario lines on hover.
///
/// A timed morph, when configured, latches every group on the ensemble view;
/// later hovers still log but no longer fade, and every zone stays `Shown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverTransform {
    pairs: Vec<TransformPair>,
    shade_opacity: f64,
    alternative_opacity: f64,
    transform_ms: f64,
    morph_after_ms: Option<f64>,
    morphed: bool,
}

impl HoverTransform {
    #[must_use]
    pub fn new(
        pairs: Vec<TransformPair>,
        shade_opacity: f64,
        alternative_opacity: f64,
        transform_ms: f64,
    ) -> Self {
        Self {
            pairs,
            shade_opacity,
            alternative_opacity,
            transform_ms,
            morph_after_ms: None,
            morphed: false,
        }
    }

    #[must_use]
    pub fn with_morph_after_ms(mut self, morph_after_ms: Option<f64>) -> Self {
        self.morph_after_ms = morph_after_ms;
        self
    }

    #[must_use]
    pub fn is_morphed(&self) -> bool {
        self.morphed
    }

    #[must_use]
    pub fn state_of(&self, zone: &ElementId) -> Option<HoverState> {
        self.pairs
            .iter()
            .find(|pair| &pair.zone == zone)
            .map(|pair| pair.state)
    }

    #[must_use]
    pub fn setup(&self) -> Effects {
        let mut effects = Effects::new();
        if let Some(delay_ms) = self.morph_after_ms {
            effects.push(InteractionEffect::ScheduleOnce {
                purpose: TimerPurpose::Morph,
                delay_ms,
            });
        }
        effects
    }

    fn push_cross_fade(&self, pair: &TransformPair, to_ensemble: bool, effects: &mut Effects) {
        let (bounds_opacity, scenario_opacity) = if to_ensemble {
            (0.0, self.alternative_opacity)
        } else {
            (self.shade_opacity, 0.0)
        };
        effects.push(InteractionEffect::FadeTo {
            element: pair.bounds.clone(),
            opacity: bounds_opacity,
            duration_ms: self.transform_ms,
        });
        for scenario in &pair.scenarios {
            effects.push(InteractionEffect::FadeTo {
                element: scenario.clone(),
                opacity: scenario_opacity,
                duration_ms: self.transform_ms,
            });
        }
    }

    pub fn handle(&mut self, trigger: &InteractionTrigger) -> Effects {
        let mut effects = Effects::new();
        let (zone, entering, position) = match trigger {
            InteractionTrigger::PointerEnter { zone, x, y } => (zone, true, Some((*x, *y))),
            InteractionTrigger::PointerLeave { zone } => (zone, false, None),
            InteractionTrigger::Click { .. } => return effects,
        };
        let Some(index) = self.pairs.iter().position(|pair| &pair.zone == zone) else {
            trace!(zone = %zone, "transform trigger on unknown zone ignored");
            return effects;
        };

        let morphed = self.morphed;
        let pair = &mut self.pairs[index];
        pair.state = if entering || morphed {
            HoverState::Shown
        } else {
            HoverState::Hidden
        };
        let group = pair.group.as_str().to_owned();

        match position {
            Some((x, y)) => effects.push(InteractionEffect::Log {
                kind: InteractionKind::HoverEnter,
                payload: json!({ "zone": zone.as_str(), "group": group, "x": x, "y": y }),
            }),
            None => effects.push(InteractionEffect::Log {
                kind: InteractionKind::HoverLeave,
                payload: json!({ "zone": zone.as_str(), "group": group }),
            }),
        }
        if self.morphed {
            return effects;
        }

        self.push_cross_fade(&self.pairs[index], entering, &mut effects);
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::Transform,
            payload: json!({
                "group": group,
                "to": if entering { "ensemble" } else { "band" },
                "trigger": "hover",
            }),
        });
        effects
    }

    /// Timed morph: every group switches to the ensemble view for good.
    pub fn morph(&mut self) -> Effects {
        let mut effects = Effects::new();
        if self.morphed {
            return effects;
        }
        self.morphed = true;
        for pair in &mut self.pairs {
            pair.state = HoverState::Shown;
        }
        for pair in &self.pairs {
            self.push_cross_fade(pair, true, &mut effects);
        }
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::Transform,
            payload: json!({ "to": "ensemble", "trigger": "timer" }),
        });
        effects
    }
}
