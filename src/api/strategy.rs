use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::CanonicalDataset;
use crate::error::ConditionResult;
use crate::interaction::{
    Clock, Effects, FadeTrack, HoverState, InteractionEffect, InteractionLog, InteractionMachine,
    InteractionTrigger, LogHandle, RevealStatus, TimerPurpose, TimerRegistry, Tooltip,
};
use crate::render::{DrawPlan, ElementId, Renderer};

use super::machine_builder::build_machine;
use super::plan_builder::build_draw_plan;
use super::validation::{validate_display_override, validate_group_count};
use super::{DisplayOverride, StrategyKind, VisualConfig};

/// Lifecycle position of a strategy instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyPhase {
    Created,
    Rendered,
    Attached,
    CleanedUp,
}

/// Runtime state of one drawn element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    /// Logical visibility; flips synchronously while the fade catches up.
    pub visible: bool,
    pub fade: FadeTrack,
    pub offset_px: (f64, f64),
    pub enabled: bool,
}

impl ElementState {
    fn initial(visible: bool, opacity: f64) -> Self {
        Self {
            visible,
            fade: FadeTrack::settled(opacity),
            offset_px: (0.0, 0.0),
            enabled: true,
        }
    }
}

/// One mounted condition: its draw plan, interaction machine and timers.
///
/// The strategy owns every timer it schedules; `cleanup` cancels them as a
/// group, so nothing keeps firing once the condition is switched away.
#[derive(Debug)]
pub struct ConditionStrategy {
    kind: StrategyKind,
    dataset: Rc<CanonicalDataset>,
    config: VisualConfig,
    display: DisplayOverride,
    log: LogHandle,
    clock: Rc<dyn Clock>,
    plan: Option<DrawPlan>,
    machine: Option<InteractionMachine>,
    timers: TimerRegistry,
    elements: IndexMap<ElementId, ElementState>,
    phase: StrategyPhase,
}

impl ConditionStrategy {
    /// Validates inputs and captures a log handle tagged with the condition.
    pub fn new(
        kind: StrategyKind,
        dataset: Rc<CanonicalDataset>,
        config: VisualConfig,
        display: DisplayOverride,
        log: &InteractionLog,
    ) -> ConditionResult<Self> {
        config.validate()?;
        validate_group_count(&dataset)?;
        validate_display_override(&display, &dataset)?;

        debug!(strategy = kind.slug(), index = kind.index(), "strategy created");
        Ok(Self {
            kind,
            dataset,
            config,
            display,
            log: log.handle().with_condition(kind.slug()),
            clock: log.clock(),
            plan: None,
            machine: None,
            timers: TimerRegistry::new(),
            elements: IndexMap::new(),
            phase: StrategyPhase::Created,
        })
    }

    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> StrategyPhase {
        self.phase
    }

    #[must_use]
    pub fn dataset(&self) -> &Rc<CanonicalDataset> {
        &self.dataset
    }

    #[must_use]
    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    #[must_use]
    pub fn log_handle(&self) -> &LogHandle {
        &self.log
    }

    #[must_use]
    pub fn plan(&self) -> Option<&DrawPlan> {
        self.plan.as_ref()
    }

    /// Builds the draw plan. Repeated calls rebuild an equal plan and keep
    /// runtime element state untouched.
    pub fn render(&mut self) -> ConditionResult<&DrawPlan> {
        let plan = build_draw_plan(self.kind, &self.dataset, &self.config, &self.display)?;
        if self.elements.is_empty() {
            self.elements = plan
                .instructions
                .iter()
                .map(|instruction| {
                    (
                        instruction.element.clone(),
                        ElementState::initial(
                            instruction.initially_visible,
                            instruction.initial_opacity(),
                        ),
                    )
                })
                .collect();
        }
        if self.phase == StrategyPhase::Created {
            self.phase = StrategyPhase::Rendered;
        }
        trace!(strategy = self.kind.slug(), elements = plan.len(), "strategy rendered");
        let plan = self.plan.insert(plan);
        Ok(&*plan)
    }

    /// Renders and hands the plan to a geometry provider.
    pub fn render_with<R: Renderer>(&mut self, renderer: &mut R) -> ConditionResult<()> {
        self.render()?;
        if let Some(plan) = &self.plan {
            renderer.render(plan, &self.dataset)?;
        }
        Ok(())
    }

    /// Installs the interaction machine, rendering first when needed.
    /// Attaching twice is a no-op.
    pub fn attach_interactions(&mut self) -> ConditionResult<()> {
        match self.phase {
            StrategyPhase::Attached | StrategyPhase::CleanedUp => return Ok(()),
            StrategyPhase::Created => {
                self.render()?;
            }
            StrategyPhase::Rendered => {}
        }
        let Some(plan) = &self.plan else {
            return Ok(());
        };

        self.machine = build_machine(self.kind, plan, &self.dataset, &self.config);
        if let Some(machine) = &self.machine {
            let effects = machine.setup();
            self.apply(effects);
        }
        self.phase = StrategyPhase::Attached;
        debug!(
            strategy = self.kind.slug(),
            interactive = self.machine.is_some(),
            "interactions attached"
        );
        Ok(())
    }

    /// Delivers one pointer event. Events before attach or after cleanup,
    /// and events for unknown targets, are ignored.
    pub fn handle(&mut self, trigger: &InteractionTrigger) {
        if self.phase != StrategyPhase::Attached {
            trace!(strategy = self.kind.slug(), "event outside attached phase ignored");
            return;
        }
        if let InteractionTrigger::Click { target, .. } = trigger {
            if self
                .elements
                .get(target)
                .is_some_and(|state| !state.enabled)
            {
                trace!(target = %target, "click on disabled control ignored");
                return;
            }
        }
        let Some(machine) = self.machine.as_mut() else {
            return;
        };
        let effects = machine.handle(trigger);
        self.apply(effects);
    }

    /// Fires every timer due at the current clock time, in due order.
    /// Returns how many fired.
    pub fn run_due_timers(&mut self) -> usize {
        let mut fired = 0;
        loop {
            let now_ms = self.clock.now_ms();
            let Some((id, purpose)) = self.timers.pop_due(now_ms) else {
                break;
            };
            fired += 1;
            trace!(timer = id.raw(), ?purpose, "timer fired");
            let Some(machine) = self.machine.as_mut() else {
                continue;
            };
            let effects = machine.on_timer(&purpose);
            self.apply(effects);
        }
        fired
    }

    /// Cancels every timer and detaches the machine. Safe to call twice.
    pub fn cleanup(&mut self) {
        if self.phase == StrategyPhase::CleanedUp {
            return;
        }
        let cancelled = self.timers.cancel_all();
        if let Some(machine) = self.machine.as_mut() {
            machine.teardown();
        }
        self.machine = None;
        self.phase = StrategyPhase::CleanedUp;
        debug!(strategy = self.kind.slug(), cancelled, "strategy cleaned up");
    }

    fn apply(&mut self, effects: Effects) {
        let now_ms = self.clock.now_ms();
        for effect in effects {
            match effect {
                InteractionEffect::FadeTo {
                    element,
                    opacity,
                    duration_ms,
                } => match self.elements.get_mut(&element) {
                    Some(state) => {
                        state.visible = opacity > 0.0;
                        state.fade.retarget(opacity, now_ms, duration_ms);
                    }
                    None => trace!(element = %element, "fade on unknown element ignored"),
                },
                InteractionEffect::SetOffset { element, dx, dy } => {
                    if let Some(state) = self.elements.get_mut(&element) {
                        state.offset_px = (dx, dy);
                    }
                }
                InteractionEffect::Log { kind, payload } => {
                    self.log.log(kind, payload);
                }
                InteractionEffect::ScheduleOnce { purpose, delay_ms } => {
                    self.timers.schedule_once(purpose, now_ms, delay_ms);
                }
                InteractionEffect::ScheduleEvery {
                    purpose,
                    interval_ms,
                } => {
                    if self
                        .timers
                        .schedule_every(purpose, now_ms, interval_ms)
                        .is_none()
                    {
                        warn!(interval_ms, "recurring timer with non-positive interval dropped");
                    }
                }
                InteractionEffect::DisableControl { element } => {
                    if let Some(state) = self.elements.get_mut(&element) {
                        state.enabled = false;
                    }
                }
            }
        }
    }

    #[must_use]
    pub fn element_state(&self, element: &ElementId) -> Option<&ElementState> {
        self.elements.get(element)
    }

    #[must_use]
    pub fn is_visible(&self, element: &ElementId) -> bool {
        self.elements.get(element).is_some_and(|state| state.visible)
    }

    /// Opacity at the current clock time.
    #[must_use]
    pub fn opacity_at(&self, element: &ElementId) -> Option<f64> {
        self.opacity_at_ms(element, self.clock.now_ms())
    }

    #[must_use]
    pub fn opacity_at_ms(&self, element: &ElementId, now_ms: f64) -> Option<f64> {
        self.elements
            .get(element)
            .map(|state| state.fade.opacity_at(now_ms))
    }

    #[must_use]
    pub fn offset(&self, element: &ElementId) -> (f64, f64) {
        self.elements
            .get(element)
            .map_or((0.0, 0.0), |state| state.offset_px)
    }

    #[must_use]
    pub fn control_enabled(&self, element: &ElementId) -> bool {
        self.elements.get(element).is_some_and(|state| state.enabled)
    }

    /// Elements logically visible right now, in draw order.
    #[must_use]
    pub fn visible_elements(&self) -> Vec<&ElementId> {
        self.elements
            .iter()
            .filter(|(_, state)| state.visible)
            .map(|(element, _)| element)
            .collect()
    }

    #[must_use]
    pub fn reveal_status(&self) -> Option<RevealStatus> {
        self.machine
            .as_ref()
            .and_then(InteractionMachine::reveal_status)
    }

    #[must_use]
    pub fn hover_state(&self, zone: &ElementId) -> Option<HoverState> {
        self.machine
            .as_ref()
            .and_then(|machine| machine.hover_state(zone))
    }

    /// Checked state of a checkbox control; `None` for other elements.
    #[must_use]
    pub fn is_checked(&self, control: &ElementId) -> Option<bool> {
        self.machine
            .as_ref()
            .and_then(|machine| machine.is_checked(control))
    }

    #[must_use]
    pub fn active_tooltips(&self) -> &[Tooltip] {
        match &self.machine {
            Some(machine) => machine.active_tooltips(),
            None => &[],
        }
    }

    #[must_use]
    pub fn pending_timer_count(&self) -> usize {
        self.timers.pending_count()
    }

    #[must_use]
    pub fn next_timer_due_ms(&self) -> Option<f64> {
        self.timers.next_due_ms()
    }

    #[must_use]
    pub fn has_pending(&self, purpose: &TimerPurpose) -> bool {
        self.timers.has_purpose(purpose)
    }
}

impl Drop for ConditionStrategy {
    fn drop(&mut self) {
        self.cleanup();
    }
}
