use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::interaction::clock::{Clock, SystemClock};

/// Event type recorded in the interaction log.
///
/// Serialized as its snake_case name; unknown names round-trip as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InteractionKind {
    HoverEnter,
    HoverLeave,
    Click,
    Reveal,
    Hide,
    Transform,
    DelayedInteraction,
    PositionInstability,
    DisappearingTooltip,
    TooltipDismissed,
    BrokenSetup,
    PoorSetup,
    Toggle,
    SelectAll,
    Custom(String),
}

impl InteractionKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::HoverEnter => "hover_enter",
            Self::HoverLeave => "hover_leave",
            Self::Click => "click",
            Self::Reveal => "reveal",
            Self::Hide => "hide",
            Self::Transform => "transform",
            Self::DelayedInteraction => "delayed_interaction",
            Self::PositionInstability => "position_instability",
            Self::DisappearingTooltip => "disappearing_tooltip",
            Self::TooltipDismissed => "tooltip_dismissed",
            Self::BrokenSetup => "broken_setup",
            Self::PoorSetup => "poor_setup",
            Self::Toggle => "toggle",
            Self::SelectAll => "select_all",
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for InteractionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "hover_enter" => Self::HoverEnter,
            "hover_leave" => Self::HoverLeave,
            "click" => Self::Click,
            "reveal" => Self::Reveal,
            "hide" => Self::Hide,
            "transform" => Self::Transform,
            "delayed_interaction" => Self::DelayedInteraction,
            "position_instability" => Self::PositionInstability,
            "disappearing_tooltip" => Self::DisappearingTooltip,
            "tooltip_dismissed" => Self::TooltipDismissed,
            "broken_setup" => Self::BrokenSetup,
            "poor_setup" => Self::PoorSetup,
            "toggle" => Self::Toggle,
            "select_all" => Self::SelectAll,
            _ => Self::Custom(value),
        }
    }
}

impl From<InteractionKind> for String {
    fn from(value: InteractionKind) -> Self {
        match value {
            InteractionKind::Custom(name) => name,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One appended log entry; `elapsed_ms` is sampled at log time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(rename = "data")]
    pub payload: Value,
    #[serde(rename = "timestamp")]
    pub elapsed_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Read-only projection over one session of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSummary {
    pub total_interactions: usize,
    pub interaction_types: Vec<InteractionKind>,
    pub counts_by_type: IndexMap<InteractionKind, usize>,
    pub total_duration_ms: f64,
    pub interactions_per_second: f64,
    pub hover_events: usize,
    pub click_events: usize,
}

#[derive(Debug)]
struct LogState {
    session: u64,
    session_start_ms: f64,
    last_elapsed_ms: f64,
    events: Vec<InteractionEvent>,
}

/// Session-scoped, append-only interaction log.
///
/// Clones share the same session. `reset` starts a new session and hands out
/// a fresh `LogHandle`; handles captured earlier keep working and write into
/// the new session, so a late timer callback can never reach a cleared buffer.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    state: Rc<RefCell<LogState>>,
    clock: Rc<dyn Clock>,
}

impl InteractionLog {
    #[must_use]
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        let session_start_ms = clock.now_ms();
        Self {
            state: Rc::new(RefCell::new(LogState {
                session: 0,
                session_start_ms,
                last_elapsed_ms: 0.0,
                events: Vec::new(),
            })),
            clock,
        }
    }

    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(Rc::new(SystemClock::new()))
    }

    #[must_use]
    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    #[must_use]
    pub fn handle(&self) -> LogHandle {
        LogHandle {
            state: Rc::clone(&self.state),
            clock: Rc::clone(&self.clock),
            session: self.session(),
            condition: None,
        }
    }

    pub fn log(&self, kind: InteractionKind, payload: Value) -> InteractionEvent {
        append(&self.state, self.clock.as_ref(), kind, payload, None)
    }

    /// Clears the log and restarts the session clock.
    pub fn reset(&self) -> LogHandle {
        {
            let mut state = self.state.borrow_mut();
            let dropped = state.events.len();
            state.session += 1;
            state.session_start_ms = self.clock.now_ms();
            state.last_elapsed_ms = 0.0;
            state.events.clear();
            debug!(session = state.session, dropped, "interaction log reset");
        }
        self.handle()
    }

    #[must_use]
    pub fn session(&self) -> u64 {
        self.state.borrow().session
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn events(&self) -> Vec<InteractionEvent> {
        self.state.borrow().events.clone()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<InteractionKind> {
        self.state
            .borrow()
            .events
            .iter()
            .map(|event| event.kind.clone())
            .collect()
    }

    #[must_use]
    pub fn count_of(&self, kind: &InteractionKind) -> usize {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|event| &event.kind == kind)
            .count()
    }

    /// Counts per type, keyed in first-seen order.
    #[must_use]
    pub fn count_by_kind(&self) -> IndexMap<InteractionKind, usize> {
        let mut counts = IndexMap::new();
        for event in &self.state.borrow().events {
            *counts.entry(event.kind.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Largest elapsed time in the session, 0 when empty.
    #[must_use]
    pub fn total_duration_ms(&self) -> f64 {
        self.state
            .borrow()
            .events
            .iter()
            .map(|event| event.elapsed_ms)
            .fold(0.0, f64::max)
    }

    /// Events per second over the session duration; 0 when the duration is 0.
    #[must_use]
    pub fn rate_per_second(&self) -> f64 {
        let duration_ms = self.total_duration_ms();
        if duration_ms <= 0.0 {
            return 0.0;
        }
        self.len() as f64 / (duration_ms / 1000.0)
    }

    #[must_use]
    pub fn summary(&self) -> InteractionSummary {
        let counts_by_type = self.count_by_kind();
        InteractionSummary {
            total_interactions: self.len(),
            interaction_types: counts_by_type.keys().cloned().collect(),
            hover_events: counts_by_type
                .get(&InteractionKind::HoverEnter)
                .copied()
                .unwrap_or(0),
            click_events: counts_by_type
                .get(&InteractionKind::Click)
                .copied()
                .unwrap_or(0),
            counts_by_type,
            total_duration_ms: self.total_duration_ms(),
            interactions_per_second: self.rate_per_second(),
        }
    }
}

/// Write handle captured by a strategy at construction time.
#[derive(Debug, Clone)]
pub struct LogHandle {
    state: Rc<RefCell<LogState>>,
    clock: Rc<dyn Clock>,
    session: u64,
    condition: Option<String>,
}

impl LogHandle {
    /// Tags every event written through this handle with a condition slug.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    #[must_use]
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    #[must_use]
    pub fn session(&self) -> u64 {
        self.session
    }

    /// `true` once the log was reset after this handle was issued.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state.borrow().session != self.session
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn log(&self, kind: InteractionKind, payload: Value) -> InteractionEvent {
        if self.is_stale() {
            trace!(
                handle_session = self.session,
                kind = %kind,
                "stale log handle writes into the current session"
            );
        }
        append(
            &self.state,
            self.clock.as_ref(),
            kind,
            payload,
            self.condition.clone(),
        )
    }
}

fn append(
    state: &RefCell<LogState>,
    clock: &dyn Clock,
    kind: InteractionKind,
    payload: Value,
    condition: Option<String>,
) -> InteractionEvent {
    let mut state = state.borrow_mut();
    // Clamp so elapsed time never decreases within a session.
    let elapsed_ms = (clock.now_ms() - state.session_start_ms).max(state.last_elapsed_ms);
    state.last_elapsed_ms = elapsed_ms;
    let event = InteractionEvent {
        kind,
        payload,
        elapsed_ms,
        condition,
    };
    trace!(kind = %event.kind, elapsed_ms, "interaction logged");
    state.events.push(event.clone());
    event
}
