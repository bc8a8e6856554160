use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde_json::json;
use tracing::{debug, trace};

use crate::interaction::{
    Effects, HoverPair, HoverState, InteractionEffect, InteractionKind, InteractionTrigger,
};
use crate::render::ElementId;

/// Hover reveal that redraws a fresh random subset of a group's lines on
/// every enter.
///
/// Lines left out of the subset are cut instantly rather than faded, so the
/// ensemble visibly changes shape between hovers.
#[derive(Debug, Clone)]
pub struct ShuffledHover {
    pairs: Vec<HoverPair>,
    sample_size: usize,
    fade_in_ms: f64,
    fade_out_ms: f64,
    rng: StdRng,
    hovers: u64,
}

impl ShuffledHover {
    #[must_use]
    pub fn new(
        pairs: Vec<HoverPair>,
        sample_size: usize,
        seed: u64,
        fade_in_ms: f64,
        fade_out_ms: f64,
    ) -> Self {
        Self {
            pairs,
            sample_size,
            fade_in_ms,
            fade_out_ms,
            rng: StdRng::seed_from_u64(seed),
            hovers: 0,
        }
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
        for pair in self.pairs.iter().filter(|pair| pair.is_inert()) {
            debug!(zone = %pair.zone, "shuffled pair has no lines, kept inert");
        }
        Effects::new()
    }

    pub fn handle(&mut self, trigger: &InteractionTrigger) -> Effects {
        match trigger {
            InteractionTrigger::PointerEnter { zone, x, y } => self.enter(zone, *x, *y),
            InteractionTrigger::PointerLeave { zone } => self.leave(zone),
            InteractionTrigger::Click { .. } => Effects::new(),
        }
    }

    fn enter(&mut self, zone: &ElementId, x: f64, y: f64) -> Effects {
        let mut effects = Effects::new();
        let Some(pair) = self.pairs.iter_mut().find(|pair| &pair.zone == zone) else {
            trace!(zone = %zone, "pointer enter on unknown zone ignored");
            return effects;
        };
        pair.state = HoverState::Shown;
        self.hovers += 1;

        let total = pair.reveals.len();
        let amount = self.sample_size.min(total);
        let mut sample = index::sample(&mut self.rng, total, amount).into_vec();
        sample.sort_unstable();

        let mut shown = Vec::with_capacity(sample.len());
        for (position, target) in pair.reveals.iter().enumerate() {
            let (opacity, duration_ms) = if sample.binary_search(&position).is_ok() {
                shown.push(target.element.as_str());
                (target.opacity, self.fade_in_ms)
            } else {
                (0.0, 0.0)
            };
            effects.push(InteractionEffect::FadeTo {
                element: target.element.clone(),
                opacity,
                duration_ms,
            });
        }
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::HoverEnter,
            payload: json!({
                "zone": zone.as_str(),
                "group": pair.group.as_str(),
                "x": x,
                "y": y,
                "hover": self.hovers,
                "shown": shown,
                "total": total,
            }),
        });
        effects
    }

    fn leave(&mut self, zone: &ElementId) -> Effects {
        let mut effects = Effects::new();
        let Some(pair) = self.pairs.iter_mut().find(|pair| &pair.zone == zone) else {
            trace!(zone = %zone, "pointer leave on unknown zone ignored");
            return effects;
        };
        pair.state = HoverState::Hidden;
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::HoverLeave,
            payload: json!({ "zone": zone.as_str(), "group": pair.group.as_str() }),
        });
        for target in &pair.reveals {
            effects.push(InteractionEffect::FadeTo {
                element: target.element.clone(),
                opacity: 0.0,
                duration_ms: self.fade_out_ms,
            });
        }
        effects
    }
}
