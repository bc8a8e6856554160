use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{GroupId, ScenarioId, SeriesRef, ValueScale};
use crate::error::{ConditionError, ConditionResult};
use crate::render::{DrawStyle, PlanLayer};

/// Stable identifier of one drawn element inside a plan.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn historical(group: &GroupId) -> Self {
        Self(format!("historical/{group}"))
    }

    #[must_use]
    pub fn aggregated(group: &GroupId) -> Self {
        Self(format!("aggregated/{group}"))
    }

    #[must_use]
    pub fn bounds(group: &GroupId) -> Self {
        Self(format!("bounds/{group}"))
    }

    #[must_use]
    pub fn scenario(group: &GroupId, scenario: &ScenarioId) -> Self {
        Self(format!("scenario/{group}/{scenario}"))
    }

    #[must_use]
    pub fn zone(group: &GroupId) -> Self {
        Self(format!("zone/{group}"))
    }

    #[must_use]
    pub fn next_line_control() -> Self {
        Self("control/next-line".to_owned())
    }

    /// Checkbox toggling one scenario line.
    #[must_use]
    pub fn toggle_control(group: &GroupId, scenario: &ScenarioId) -> Self {
        Self(format!("control/toggle/{group}/{scenario}"))
    }

    #[must_use]
    pub fn select_all_control() -> Self {
        Self("control/select-all".to_owned())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Footprint of a host-rendered control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlSize {
    #[default]
    Regular,
    /// Squeezed into a thin strip with shrunken hit targets.
    Compact,
}

/// Pointer gesture a hit zone listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneTrigger {
    Hover,
    Click,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawKind {
    /// Open path through a line series.
    Line { series: SeriesRef, anchored: bool },
    /// Filled envelope between the min and max of a bounds series.
    Area { series: SeriesRef, anchored: bool },
    /// Invisible, wide stroke following `target`; displaced by `offset_px`.
    HitZone {
        target: SeriesRef,
        anchored: bool,
        trigger: ZoneTrigger,
        offset_px: (f64, f64),
    },
    /// Host-rendered control outside the plot (a button or a checkbox).
    Control {
        label: String,
        #[serde(default)]
        size: ControlSize,
    },
}

impl DrawKind {
    #[must_use]
    pub fn series(&self) -> Option<(&SeriesRef, bool)> {
        match self {
            Self::Line { series, anchored } | Self::Area { series, anchored } => {
                Some((series, *anchored))
            }
            Self::HitZone {
                target, anchored, ..
            } => Some((target, *anchored)),
            Self::Control { .. } => None,
        }
    }
}

/// One layered draw command with style and initial visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawInstruction {
    pub element: ElementId,
    pub layer: PlanLayer,
    pub kind: DrawKind,
    pub style: DrawStyle,
    /// Opacity the element takes while shown.
    pub opacity: f64,
    pub initially_visible: bool,
}

impl DrawInstruction {
    #[must_use]
    pub fn new(
        element: ElementId,
        layer: PlanLayer,
        kind: DrawKind,
        style: DrawStyle,
        opacity: f64,
    ) -> Self {
        Self {
            element,
            layer,
            kind,
            style,
            opacity,
            initially_visible: true,
        }
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.initially_visible = false;
        self
    }

    #[must_use]
    pub fn initial_opacity(&self) -> f64 {
        if self.initially_visible {
            self.opacity
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> ConditionResult<()> {
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConditionError::InvalidConfiguration(format!(
                "element `{}` opacity must be finite and in [0, 1]",
                self.element
            )));
        }
        if let DrawKind::HitZone { offset_px, .. } = &self.kind {
            if !offset_px.0.is_finite() || !offset_px.1.is_finite() {
                return Err(ConditionError::InvalidConfiguration(format!(
                    "hit zone `{}` offset must be finite",
                    self.element
                )));
            }
        }
        self.style.validate()
    }
}

/// Ordered, layered list of draw instructions produced by one strategy.
///
/// Consumers draw instructions in list order; the plan keeps them sorted by
/// layer with insertion order preserved inside a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawPlan {
    pub strategy: String,
    pub value_scale: ValueScale,
    pub instructions: Vec<DrawInstruction>,
}

impl DrawPlan {
    #[must_use]
    pub fn new(strategy: impl Into<String>, value_scale: ValueScale) -> Self {
        Self {
            strategy: strategy.into(),
            value_scale,
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: DrawInstruction) {
        self.instructions.push(instruction);
    }

    /// Stable sort by layer.
    pub fn normalize_layers(&mut self) {
        self.instructions.sort_by_key(|instruction| instruction.layer);
    }

    #[must_use]
    pub fn instruction(&self, element: &ElementId) -> Option<&DrawInstruction> {
        self.instructions
            .iter()
            .find(|instruction| &instruction.element == element)
    }

    #[must_use]
    pub fn contains(&self, element: &ElementId) -> bool {
        self.instruction(element).is_some()
    }

    pub fn in_layer(&self, layer: PlanLayer) -> impl Iterator<Item = &DrawInstruction> {
        self.instructions
            .iter()
            .filter(move |instruction| instruction.layer == layer)
    }

    /// Element ids in draw order.
    #[must_use]
    pub fn element_ids(&self) -> Vec<&ElementId> {
        self.instructions
            .iter()
            .map(|instruction| &instruction.element)
            .collect()
    }

    pub fn validate(&self) -> ConditionResult<()> {
        let mut seen = HashSet::with_capacity(self.instructions.len());
        for instruction in &self.instructions {
            if !seen.insert(&instruction.element) {
                return Err(ConditionError::InvalidConfiguration(format!(
                    "duplicate element `{}` in draw plan",
                    instruction.element
                )));
            }
            instruction.validate()?;
        }
        if self
            .instructions
            .windows(2)
            .any(|pair| pair[0].layer > pair[1].layer)
        {
            return Err(ConditionError::InvalidConfiguration(
                "draw plan instructions must be ordered by layer".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
