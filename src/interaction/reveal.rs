use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::trace;

use crate::interaction::{Effects, InteractionEffect, InteractionKind, InteractionTrigger};
use crate::render::ElementId;

/// Progress of a click-to-advance reveal.
///
/// `revealed_count` only grows; the state is terminal at `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    revealed_count: usize,
    total: usize,
}

impl RevealState {
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self {
            revealed_count: 0,
            total,
        }
    }

    #[must_use]
    pub const fn revealed_count(self) -> usize {
        self.revealed_count
    }

    #[must_use]
    pub const fn total(self) -> usize {
        self.total
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.revealed_count >= self.total
    }

    /// Returns the index revealed by this step, `None` at terminal.
    pub fn advance(&mut self) -> Option<usize> {
        if self.is_terminal() {
            return None;
        }
        let index = self.revealed_count;
        self.revealed_count += 1;
        Some(index)
    }
}

/// Display projection of a sequential reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealStatus {
    pub revealed_count: usize,
    pub total: usize,
    pub last_revealed_label: Option<String>,
}

impl RevealStatus {
    /// Status line shown next to the control.
    #[must_use]
    pub fn status_text(&self) -> String {
        match &self.last_revealed_label {
            Some(label) => format!(
                "Lines shown: {}/{} (Last: {label})",
                self.revealed_count, self.total
            ),
            None => format!("Lines shown: {}/{}", self.revealed_count, self.total),
        }
    }
}

/// One line a sequential reveal can show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealLine {
    pub element: ElementId,
    pub label: String,
    pub opacity: f64,
}

/// Click-to-advance reveal over a fixed enumeration of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialReveal {
    control: ElementId,
    lines: Vec<RevealLine>,
    state: RevealState,
    fade_in_ms: f64,
}

impl SequentialReveal {
    #[must_use]
    pub fn new(control: ElementId, lines: Vec<RevealLine>, fade_in_ms: f64) -> Self {
        let state = RevealState::new(lines.len());
        Self {
            control,
            lines,
            state,
            fade_in_ms,
        }
    }

    #[must_use]
    pub fn state(&self) -> RevealState {
        self.state
    }

    #[must_use]
    pub fn control(&self) -> &ElementId {
        &self.control
    }

    #[must_use]
    pub fn status(&self) -> RevealStatus {
        let last_revealed_label = self
            .state
            .revealed_count()
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(|line| line.label.clone());
        RevealStatus {
            revealed_count: self.state.revealed_count(),
            total: self.state.total(),
            last_revealed_label,
        }
    }

    /// A reveal with nothing to show starts with its control disabled.
    #[must_use]
    pub fn setup(&self) -> Effects {
        let mut effects = Effects::new();
        if self.state.is_terminal() {
            effects.push(InteractionEffect::DisableControl {
                element: self.control.clone(),
            });
        }
        effects
    }

    pub fn handle(&mut self, trigger: &InteractionTrigger) -> Effects {
        let mut effects = Effects::new();
        let InteractionTrigger::Click { target, .. } = trigger else {
            return effects;
        };
        if target != &self.control {
            return effects;
        }

        let Some(index) = self.state.advance() else {
            trace!(total = self.state.total(), "advance at terminal state ignored");
            return effects;
        };
        let line = &self.lines[index];
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::Click,
            payload: json!({ "target": self.control.as_str() }),
        });
        effects.push(InteractionEffect::FadeTo {
            element: line.element.clone(),
            opacity: line.opacity,
            duration_ms: self.fade_in_ms,
        });
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::Reveal,
            payload: json!({
                "element": line.element.as_str(),
                "label": line.label,
                "revealed": self.state.revealed_count(),
                "total": self.state.total(),
            }),
        });
        if self.state.is_terminal() {
            effects.push(InteractionEffect::DisableControl {
                element: self.control.clone(),
            });
        }
        effects
    }
}
