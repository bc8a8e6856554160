use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use crate::core::GroupId;
use crate::error::{ConditionError, ConditionResult};
use crate::interaction::{
    Effects, InteractionEffect, InteractionKind, InteractionTrigger, RevealLine, TimerPurpose,
};
use crate::render::ElementId;

fn default_hit_zone_offset_px() -> f64 {
    50.0
}

fn default_mismatch_fraction() -> f64 {
    1.0
}

fn default_click_delay_ms() -> f64 {
    500.0
}

fn default_jitter_interval_ms() -> f64 {
    10_000.0
}

fn default_jitter_max_offset_px() -> f64 {
    5.0
}

fn default_tooltip_duration_ms() -> f64 {
    2_000.0
}

fn default_shuffle_sample_size() -> usize {
    3
}

fn default_seed() -> u64 {
    0x5EED
}

/// Tuning of the deliberately degraded conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradedConfig {
    /// Horizontal displacement of broken hit zones.
    #[serde(default = "default_hit_zone_offset_px")]
    pub hit_zone_offset_px: f64,
    /// Share of broken hover zones paired with another group's lines.
    #[serde(default = "default_mismatch_fraction")]
    pub mismatch_fraction: f64,
    #[serde(default = "default_click_delay_ms")]
    pub click_delay_ms: f64,
    #[serde(default = "default_jitter_interval_ms")]
    pub jitter_interval_ms: f64,
    #[serde(default = "default_jitter_max_offset_px")]
    pub jitter_max_offset_px: f64,
    #[serde(default = "default_tooltip_duration_ms")]
    pub tooltip_duration_ms: f64,
    /// Scenario lines drawn per hover in the shuffled condition.
    #[serde(default = "default_shuffle_sample_size")]
    pub shuffle_sample_size: usize,
    /// Seeds jitter, pairing mismatch and every random line pick.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for DegradedConfig {
    fn default() -> Self {
        Self {
            hit_zone_offset_px: default_hit_zone_offset_px(),
            mismatch_fraction: default_mismatch_fraction(),
            click_delay_ms: default_click_delay_ms(),
            jitter_interval_ms: default_jitter_interval_ms(),
            jitter_max_offset_px: default_jitter_max_offset_px(),
            tooltip_duration_ms: default_tooltip_duration_ms(),
            shuffle_sample_size: default_shuffle_sample_size(),
            seed: default_seed(),
        }
    }
}

impl DegradedConfig {
    #[must_use]
    pub fn with_click_delay_ms(mut self, click_delay_ms: f64) -> Self {
        self.click_delay_ms = click_delay_ms;
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, interval_ms: f64, max_offset_px: f64) -> Self {
        self.jitter_interval_ms = interval_ms;
        self.jitter_max_offset_px = max_offset_px;
        self
    }

    #[must_use]
    pub fn with_tooltip_duration_ms(mut self, tooltip_duration_ms: f64) -> Self {
        self.tooltip_duration_ms = tooltip_duration_ms;
        self
    }

    #[must_use]
    pub fn with_hit_zone_offset_px(mut self, hit_zone_offset_px: f64) -> Self {
        self.hit_zone_offset_px = hit_zone_offset_px;
        self
    }

    #[must_use]
    pub fn with_mismatch_fraction(mut self, mismatch_fraction: f64) -> Self {
        self.mismatch_fraction = mismatch_fraction;
        self
    }

    #[must_use]
    pub fn with_shuffle_sample_size(mut self, shuffle_sample_size: usize) -> Self {
        self.shuffle_sample_size = shuffle_sample_size;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(self) -> ConditionResult<()> {
        for (name, value) in [
            ("hit_zone_offset_px", self.hit_zone_offset_px),
            ("click_delay_ms", self.click_delay_ms),
            ("jitter_max_offset_px", self.jitter_max_offset_px),
            ("tooltip_duration_ms", self.tooltip_duration_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConditionError::InvalidConfiguration(format!(
                    "degraded `{name}` must be finite and >= 0"
                )));
            }
        }
        if !self.jitter_interval_ms.is_finite() || self.jitter_interval_ms <= 0.0 {
            return Err(ConditionError::InvalidConfiguration(
                "degraded `jitter_interval_ms` must be finite and > 0".to_owned(),
            ));
        }
        if !self.mismatch_fraction.is_finite() || !(0.0..=1.0).contains(&self.mismatch_fraction) {
            return Err(ConditionError::InvalidConfiguration(
                "degraded `mismatch_fraction` must be finite and in [0, 1]".to_owned(),
            ));
        }
        if self.shuffle_sample_size == 0 {
            return Err(ConditionError::InvalidConfiguration(
                "degraded `shuffle_sample_size` must be >= 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Maps each of `count` zones to the index whose elements it reveals.
///
/// About `fraction` of the zones are rotated among themselves so none of them
/// points at itself; the rest keep the identity pairing. A single zone cannot
/// be mismatched.
pub fn mismatched_pairing(count: usize, fraction: f64, rng: &mut StdRng) -> Vec<usize> {
    let mut pairing: Vec<usize> = (0..count).collect();
    if count < 2 {
        return pairing;
    }
    let mut mismatched = ((count as f64) * fraction.clamp(0.0, 1.0)).round() as usize;
    if mismatched == 1 {
        mismatched = 2;
    }
    if mismatched == 0 {
        return pairing;
    }

    let mut chosen = pairing.clone();
    chosen.shuffle(rng);
    chosen.truncate(mismatched);
    for (position, &zone) in chosen.iter().enumerate() {
        pairing[zone] = chosen[(position + 1) % chosen.len()];
    }
    pairing
}

/// Transient label shown after a delayed reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub id: u64,
    pub content: String,
    pub x: f64,
    pub y: f64,
}

/// Click-gated reveal of one group's lines in the poor condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoorTargets {
    pub zone: ElementId,
    pub group: GroupId,
    /// Elements nudged by the jitter loop.
    pub unstable: Vec<ElementId>,
    pub lines: Vec<RevealLine>,
    #[serde(default)]
    pub revealed: usize,
}

/// Click + delay + jitter + disappearing tooltips.
#[derive(Debug, Clone)]
pub struct PoorInteraction {
    targets: Vec<PoorTargets>,
    config: DegradedConfig,
    fade_in_ms: f64,
    fade_out_ms: f64,
    rng: StdRng,
    tooltips: Vec<Tooltip>,
    next_tooltip: u64,
}

impl PoorInteraction {
    #[must_use]
    pub fn new(
        targets: Vec<PoorTargets>,
        config: DegradedConfig,
        fade_in_ms: f64,
        fade_out_ms: f64,
    ) -> Self {
        Self {
            targets,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            fade_in_ms,
            fade_out_ms,
            tooltips: Vec::new(),
            next_tooltip: 0,
        }
    }

    #[must_use]
    pub fn targets(&self) -> &[PoorTargets] {
        &self.targets
    }

    #[must_use]
    pub fn active_tooltips(&self) -> &[Tooltip] {
        &self.tooltips
    }

    #[must_use]
    pub fn setup(&self) -> Effects {
        let mut effects = Effects::new();
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::PoorSetup,
            payload: json!({
                "click_delay_ms": self.config.click_delay_ms,
                "jitter_interval_ms": self.config.jitter_interval_ms,
                "jitter_max_offset_px": self.config.jitter_max_offset_px,
                "tooltip_duration_ms": self.config.tooltip_duration_ms,
            }),
        });
        effects.push(InteractionEffect::ScheduleEvery {
            purpose: TimerPurpose::Jitter,
            interval_ms: self.config.jitter_interval_ms,
        });
        effects
    }

    pub fn handle(&mut self, trigger: &InteractionTrigger) -> Effects {
        let mut effects = Effects::new();
        let InteractionTrigger::Click { target, x, y } = trigger else {
            return effects;
        };
        let Some(targets) = self.targets.iter().find(|targets| &targets.zone == target) else {
            trace!(target = %target, "click on unknown zone ignored");
            return effects;
        };

        effects.push(InteractionEffect::Log {
            kind: InteractionKind::Click,
            payload: json!({
                "zone": target.as_str(),
                "group": targets.group.as_str(),
                "x": x,
                "y": y,
            }),
        });
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::DelayedInteraction,
            payload: json!({
                "group": targets.group.as_str(),
                "delay_ms": self.config.click_delay_ms,
            }),
        });
        effects.push(InteractionEffect::ScheduleOnce {
            purpose: TimerPurpose::DelayedReveal {
                group: targets.group.clone(),
                x: *x,
                y: *y,
            },
            delay_ms: self.config.click_delay_ms,
        });
        effects
    }

    pub fn on_timer(&mut self, purpose: &TimerPurpose) -> Effects {
        match purpose {
            TimerPurpose::DelayedReveal { group, x, y } => self.delayed_reveal(group, *x, *y),
            TimerPurpose::DismissTooltip { tooltip } => self.dismiss_tooltip(*tooltip),
            TimerPurpose::Jitter => self.jitter(),
            TimerPurpose::Morph => Effects::new(),
        }
    }

    fn delayed_reveal(&mut self, group: &GroupId, x: f64, y: f64) -> Effects {
        let mut effects = Effects::new();
        let Some(targets) = self
            .targets
            .iter_mut()
            .find(|targets| &targets.group == group)
        else {
            return effects;
        };
        if targets.lines.is_empty() {
            debug!(group = %group, "poor reveal has no lines, kept inert");
            return effects;
        }

        if targets.revealed >= targets.lines.len() {
            // Cycle: everything shown, the next click hides all and restarts.
            for line in &targets.lines {
                effects.push(InteractionEffect::FadeTo {
                    element: line.element.clone(),
                    opacity: 0.0,
                    duration_ms: self.fade_out_ms,
                });
            }
            effects.push(InteractionEffect::Log {
                kind: InteractionKind::Hide,
                payload: json!({ "group": group.as_str(), "hidden": targets.lines.len() }),
            });
            targets.revealed = 0;
            return effects;
        }

        let line = &targets.lines[targets.revealed];
        targets.revealed += 1;
        effects.push(InteractionEffect::FadeTo {
            element: line.element.clone(),
            opacity: line.opacity,
            duration_ms: self.fade_in_ms,
        });
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::Reveal,
            payload: json!({
                "group": group.as_str(),
                "element": line.element.as_str(),
                "label": line.label,
                "revealed": targets.revealed,
                "total": targets.lines.len(),
            }),
        });

        let tooltip = Tooltip {
            id: self.next_tooltip,
            content: line.label.clone(),
            x,
            y,
        };
        self.next_tooltip += 1;
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::DisappearingTooltip,
            payload: json!({
                "tooltip": tooltip.id,
                "content": tooltip.content,
                "duration_ms": self.config.tooltip_duration_ms,
            }),
        });
        effects.push(InteractionEffect::ScheduleOnce {
            purpose: TimerPurpose::DismissTooltip {
                tooltip: tooltip.id,
            },
            delay_ms: self.config.tooltip_duration_ms,
        });
        self.tooltips.push(tooltip);
        effects
    }

    fn dismiss_tooltip(&mut self, id: u64) -> Effects {
        let mut effects = Effects::new();
        if let Some(position) = self.tooltips.iter().position(|tooltip| tooltip.id == id) {
            self.tooltips.remove(position);
            effects.push(InteractionEffect::Log {
                kind: InteractionKind::TooltipDismissed,
                payload: json!({ "tooltip": id }),
            });
        }
        effects
    }

    fn jitter(&mut self) -> Effects {
        let mut effects = Effects::new();
        let max = self.config.jitter_max_offset_px;
        let mut offsets = Vec::with_capacity(self.targets.len());
        for targets in &self.targets {
            let (dx, dy) = if max > 0.0 {
                (
                    self.rng.gen_range(-max..=max),
                    self.rng.gen_range(-max..=max),
                )
            } else {
                (0.0, 0.0)
            };
            for element in &targets.unstable {
                effects.push(InteractionEffect::SetOffset {
                    element: element.clone(),
                    dx,
                    dy,
                });
            }
            offsets.push(json!({ "group": targets.group.as_str(), "dx": dx, "dy": dy }));
        }
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::PositionInstability,
            payload: json!({ "max_offset_px": max, "offsets": offsets }),
        });
        effects
    }

    /// Drops transient UI state on teardown.
    pub fn clear_tooltips(&mut self) {
        self.tooltips.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::{DegradedConfig, mismatched_pairing};

    #[test]
    fn full_mismatch_never_pairs_a_zone_with_itself() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in 2..8 {
            let pairing = mismatched_pairing(count, 1.0, &mut rng);
            assert!(pairing.iter().enumerate().all(|(zone, &source)| zone != source));
            let mut sorted = pairing.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..count).collect::<Vec<_>>());
        }
    }

    #[test]
    fn zero_fraction_and_single_zone_keep_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(mismatched_pairing(3, 0.0, &mut rng), vec![0, 1, 2]);
        assert_eq!(mismatched_pairing(1, 1.0, &mut rng), vec![0]);
    }

    #[test]
    fn defaults_match_the_study_protocol() {
        let config = DegradedConfig::default();
        assert_eq!(config.click_delay_ms, 500.0);
        assert_eq!(config.jitter_interval_ms, 10_000.0);
        assert_eq!(config.tooltip_duration_ms, 2_000.0);
        assert_eq!(config.hit_zone_offset_px, 50.0);
        assert_eq!(config.shuffle_sample_size, 3);
        assert!(config.validate().is_ok());
        assert!(config.with_jitter(0.0, 5.0).validate().is_err());
        assert!(config.with_shuffle_sample_size(0).validate().is_err());
    }
}
