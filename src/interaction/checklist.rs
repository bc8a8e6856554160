use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use crate::interaction::{
    Effects, InteractionEffect, InteractionKind, InteractionTrigger, RevealLine,
};
use crate::render::ElementId;

/// Which line a checkbox click lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ToggleRouting {
    /// The clicked checkbox toggles its own line.
    #[default]
    Direct,
    /// The clicked checkbox flips, but the next entry (wrapping to the
    /// first) takes its checked state and toggles its line instead.
    NextEntry,
}

/// One checkbox and the scenario line it controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub control: ElementId,
    pub line: RevealLine,
    #[serde(default)]
    pub checked: bool,
}

/// Per-line visibility checkboxes with a select-all box.
///
/// Every box starts unchecked and every line hidden. Select-all follows the
/// individual boxes: it reads checked exactly when all of them are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    entries: Vec<ChecklistEntry>,
    select_all: ElementId,
    select_all_checked: bool,
    routing: ToggleRouting,
    fade_in_ms: f64,
    fade_out_ms: f64,
}

impl Checklist {
    #[must_use]
    pub fn new(
        entries: Vec<ChecklistEntry>,
        select_all: ElementId,
        fade_in_ms: f64,
        fade_out_ms: f64,
    ) -> Self {
        Self {
            entries,
            select_all,
            select_all_checked: false,
            routing: ToggleRouting::Direct,
            fade_in_ms,
            fade_out_ms,
        }
    }

    #[must_use]
    pub fn with_routing(mut self, routing: ToggleRouting) -> Self {
        self.routing = routing;
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }

    #[must_use]
    pub fn routing(&self) -> ToggleRouting {
        self.routing
    }

    /// Checked state of a checkbox or of the select-all box.
    #[must_use]
    pub fn is_checked(&self, control: &ElementId) -> Option<bool> {
        if control == &self.select_all {
            return Some(self.select_all_checked);
        }
        self.entries
            .iter()
            .find(|entry| &entry.control == control)
            .map(|entry| entry.checked)
    }

    #[must_use]
    pub fn setup(&self) -> Effects {
        if self.entries.is_empty() {
            debug!(control = %self.select_all, "checklist has no lines, kept inert");
        }
        Effects::new()
    }

    pub fn handle(&mut self, trigger: &InteractionTrigger) -> Effects {
        let mut effects = Effects::new();
        let InteractionTrigger::Click { target, .. } = trigger else {
            return effects;
        };
        if target == &self.select_all {
            self.toggle_all(&mut effects);
            return effects;
        }
        let Some(index) = self.entries.iter().position(|entry| &entry.control == target) else {
            trace!(target = %target, "click on unknown checkbox ignored");
            return effects;
        };

        let checked = !self.entries[index].checked;
        self.entries[index].checked = checked;
        let affected = match self.routing {
            ToggleRouting::Direct => index,
            ToggleRouting::NextEntry => (index + 1) % self.entries.len(),
        };
        self.entries[affected].checked = checked;
        self.push_line_fade(affected, checked, &mut effects);

        let entry = &self.entries[affected];
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::Toggle,
            payload: json!({
                "control": target.as_str(),
                "checked": checked,
                "element": entry.line.element.as_str(),
                "label": entry.line.label,
                "misrouted": affected != index,
            }),
        });
        self.select_all_checked = self.entries.iter().all(|entry| entry.checked);
        effects
    }

    fn toggle_all(&mut self, effects: &mut Effects) {
        let checked = !self.select_all_checked;
        self.select_all_checked = checked;
        for index in 0..self.entries.len() {
            self.entries[index].checked = checked;
            self.push_line_fade(index, checked, effects);
        }
        effects.push(InteractionEffect::Log {
            kind: InteractionKind::SelectAll,
            payload: json!({
                "control": self.select_all.as_str(),
                "checked": checked,
                "lines": self.entries.len(),
            }),
        });
    }

    fn push_line_fade(&self, index: usize, shown: bool, effects: &mut Effects) {
        let line = &self.entries[index].line;
        let (opacity, duration_ms) = if shown {
            (line.opacity, self.fade_in_ms)
        } else {
            (0.0, self.fade_out_ms)
        };
        effects.push(InteractionEffect::FadeTo {
            element: line.element.clone(),
            opacity,
            duration_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{Checklist, ChecklistEntry, ToggleRouting};
    use crate::interaction::{InteractionEffect, InteractionTrigger, RevealLine};
    use crate::render::ElementId;

    fn checklist(routing: ToggleRouting) -> Checklist {
        let entries = (1..=3)
            .map(|n| ChecklistEntry {
                control: ElementId::new(format!("control/toggle/A/s{n}")),
                line: RevealLine {
                    element: ElementId::new(format!("scenario/A/s{n}")),
                    label: format!("A - Scenario {n}"),
                    opacity: 0.6,
                },
                checked: false,
            })
            .collect();
        Checklist::new(entries, ElementId::select_all_control(), 0.0, 0.0).with_routing(routing)
    }

    fn faded(effects: &[InteractionEffect]) -> Vec<(&str, f64)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                InteractionEffect::FadeTo {
                    element, opacity, ..
                } => Some((element.as_str(), *opacity)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn last_checkbox_of_a_misrouted_list_wraps_to_the_first_line() {
        let mut list = checklist(ToggleRouting::NextEntry);
        let last = ElementId::new("control/toggle/A/s3");
        let effects = list.handle(&InteractionTrigger::click(last.clone()));
        assert_eq!(faded(&effects), vec![("scenario/A/s1", 0.6)]);
        assert_eq!(list.is_checked(&last), Some(true));
        assert_eq!(
            list.is_checked(&ElementId::new("control/toggle/A/s1")),
            Some(true)
        );
        assert_eq!(list.is_checked(&ElementId::select_all_control()), Some(false));
    }

    #[test]
    fn empty_list_ignores_checkbox_clicks() {
        let mut list = Checklist::new(Vec::new(), ElementId::select_all_control(), 0.0, 0.0)
            .with_routing(ToggleRouting::NextEntry);
        let effects = list.handle(&InteractionTrigger::click(ElementId::new("control/toggle/x")));
        assert!(effects.is_empty());
        assert_eq!(list.is_checked(&ElementId::select_all_control()), Some(false));
    }
}
