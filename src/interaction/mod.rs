//! Interaction state machines driven by abstract pointer and timer events.
//!
//! Machines never touch a rendering surface or a clock: they consume an
//! `InteractionTrigger` (or a fired `TimerPurpose`) and return the effects the
//! owning strategy applies to its element states, timer registry and log.

mod checklist;
mod clock;
mod degraded;
mod fade;
mod hover;
mod log;
mod reveal;
mod shuffle;
mod timers;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::render::ElementId;

pub use checklist::{Checklist, ChecklistEntry, ToggleRouting};
pub use clock::{Clock, ManualClock, SystemClock};
pub use degraded::{DegradedConfig, PoorInteraction, PoorTargets, Tooltip, mismatched_pairing};
pub use fade::FadeTrack;
pub use hover::{
    BrokenTargets, HoverPair, HoverReveal, HoverState, HoverTransform, RevealTarget,
    TransformPair,
};
pub use log::{InteractionEvent, InteractionKind, InteractionLog, InteractionSummary, LogHandle};
pub use reveal::{RevealLine, RevealState, RevealStatus, SequentialReveal};
pub use shuffle::ShuffledHover;
pub use timers::{TimerId, TimerPurpose, TimerRegistry};

/// Discrete external event delivered by the host's event loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InteractionTrigger {
    PointerEnter { zone: ElementId, x: f64, y: f64 },
    PointerLeave { zone: ElementId },
    /// Click on a hit zone or on a control.
    Click { target: ElementId, x: f64, y: f64 },
}

impl InteractionTrigger {
    #[must_use]
    pub fn enter(zone: ElementId) -> Self {
        Self::PointerEnter { zone, x: 0.0, y: 0.0 }
    }

    #[must_use]
    pub fn leave(zone: ElementId) -> Self {
        Self::PointerLeave { zone }
    }

    #[must_use]
    pub fn click(target: ElementId) -> Self {
        Self::Click {
            target,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// Side effect requested by a state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InteractionEffect {
    FadeTo {
        element: ElementId,
        opacity: f64,
        duration_ms: f64,
    },
    SetOffset {
        element: ElementId,
        dx: f64,
        dy: f64,
    },
    Log {
        kind: InteractionKind,
        payload: Value,
    },
    ScheduleOnce {
        purpose: TimerPurpose,
        delay_ms: f64,
    },
    ScheduleEvery {
        purpose: TimerPurpose,
        interval_ms: f64,
    },
    DisableControl {
        element: ElementId,
    },
}

pub type Effects = SmallVec<[InteractionEffect; 4]>;

/// Closed set of interaction machines a strategy can attach.
#[derive(Debug, Clone)]
pub enum InteractionMachine {
    Hover(HoverReveal),
    Transform(HoverTransform),
    Poor(PoorInteraction),
    Sequential(SequentialReveal),
    Checklist(Checklist),
    Shuffled(ShuffledHover),
}

impl InteractionMachine {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hover(_) => "hover-reveal",
            Self::Transform(_) => "hover-transform",
            Self::Poor(_) => "poor-interaction",
            Self::Sequential(_) => "sequential-reveal",
            Self::Checklist(_) => "checklist",
            Self::Shuffled(_) => "shuffled-hover",
        }
    }

    /// Effects applied once when the machine is attached.
    #[must_use]
    pub fn setup(&self) -> Effects {
        match self {
            Self::Hover(machine) => machine.setup(),
            Self::Transform(machine) => machine.setup(),
            Self::Poor(machine) => machine.setup(),
            Self::Sequential(machine) => machine.setup(),
            Self::Checklist(machine) => machine.setup(),
            Self::Shuffled(machine) => machine.setup(),
        }
    }

    pub fn handle(&mut self, trigger: &InteractionTrigger) -> Effects {
        match self {
            Self::Hover(machine) => machine.handle(trigger),
            Self::Transform(machine) => machine.handle(trigger),
            Self::Poor(machine) => machine.handle(trigger),
            Self::Sequential(machine) => machine.handle(trigger),
            Self::Checklist(machine) => machine.handle(trigger),
            Self::Shuffled(machine) => machine.handle(trigger),
        }
    }

    pub fn on_timer(&mut self, purpose: &TimerPurpose) -> Effects {
        match (self, purpose) {
            (Self::Transform(machine), TimerPurpose::Morph) => machine.morph(),
            (Self::Poor(machine), purpose) => machine.on_timer(purpose),
            _ => Effects::new(),
        }
    }

    /// Drops transient state that must not survive teardown.
    pub fn teardown(&mut self) {
        if let Self::Poor(machine) = self {
            machine.clear_tooltips();
        }
    }

    #[must_use]
    pub fn reveal_status(&self) -> Option<RevealStatus> {
        match self {
            Self::Sequential(machine) => Some(machine.status()),
            _ => None,
        }
    }

    #[must_use]
    pub fn active_tooltips(&self) -> &[Tooltip] {
        match self {
            Self::Poor(machine) => machine.active_tooltips(),
            _ => &[],
        }
    }

    #[must_use]
    pub fn hover_state(&self, zone: &ElementId) -> Option<HoverState> {
        match self {
            Self::Hover(machine) => machine.state_of(zone),
            Self::Transform(machine) => machine.state_of(zone),
            Self::Shuffled(machine) => machine.state_of(zone),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_checked(&self, control: &ElementId) -> Option<bool> {
        match self {
            Self::Checklist(machine) => machine.is_checked(control),
            _ => None,
        }
    }
}
