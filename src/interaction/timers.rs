use serde::{Deserialize, Serialize};

use crate::core::GroupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// What a scheduled continuation does when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimerPurpose {
    /// Reveal gated behind a click, fired after the artificial delay.
    DelayedReveal { group: GroupId, x: f64, y: f64 },
    /// Recurring positional perturbation.
    Jitter,
    /// Auto-dismissal of a transient tooltip.
    DismissTooltip { tooltip: u64 },
    /// Timed band-to-ensemble transition.
    Morph,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScheduledTimer {
    id: TimerId,
    purpose: TimerPurpose,
    due_ms: f64,
    repeat_every_ms: Option<f64>,
}

/// Owner of every delayed or recurring continuation a strategy installs.
///
/// Nothing fires on its own: the host's event loop calls `pop_due` with the
/// current time. `cancel_all` is the unit of teardown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerRegistry {
    next_id: u64,
    timers: Vec<ScheduledTimer>,
}

impl TimerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, purpose: TimerPurpose, now_ms: f64, delay_ms: f64) -> TimerId {
        self.insert(purpose, now_ms + delay_ms.max(0.0), None)
    }

    /// Schedules a recurring timer. A non-finite or non-positive interval
    /// would re-arm at the same instant forever and is refused.
    pub fn schedule_every(
        &mut self,
        purpose: TimerPurpose,
        now_ms: f64,
        interval_ms: f64,
    ) -> Option<TimerId> {
        if !interval_ms.is_finite() || interval_ms <= 0.0 {
            return None;
        }
        Some(self.insert(purpose, now_ms + interval_ms, Some(interval_ms)))
    }

    fn insert(&mut self, purpose: TimerPurpose, due_ms: f64, repeat: Option<f64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(ScheduledTimer {
            id,
            purpose,
            due_ms,
            repeat_every_ms: repeat,
        });
        id
    }

    /// Cancels every pending timer and returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    #[must_use]
    pub fn has_purpose(&self, purpose: &TimerPurpose) -> bool {
        self.timers.iter().any(|timer| &timer.purpose == purpose)
    }

    #[must_use]
    pub fn next_due_ms(&self) -> Option<f64> {
        self.timers
            .iter()
            .map(|timer| timer.due_ms)
            .min_by(f64::total_cmp)
    }

    /// Pops the earliest timer due at `now_ms` (ties fire in scheduling
    /// order). One-shot timers are removed; recurring ones are re-armed one
    /// interval later, so a large clock jump yields one fire per interval.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerId, TimerPurpose)> {
        let position = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(position, _)| position)?;

        let timer = &mut self.timers[position];
        let fired = (timer.id, timer.purpose.clone());
        match timer.repeat_every_ms {
            Some(interval) => timer.due_ms += interval,
            None => {
                self.timers.remove(position);
            }
        }
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::{TimerPurpose, TimerRegistry};

    #[test]
    fn one_shot_fires_once_and_recurring_rearms() {
        let mut timers = TimerRegistry::new();
        timers.schedule_once(TimerPurpose::Morph, 0.0, 100.0);
        timers.schedule_every(TimerPurpose::Jitter, 0.0, 40.0);

        let mut fired = Vec::new();
        while let Some((_, purpose)) = timers.pop_due(100.0) {
            fired.push(purpose);
        }
        assert_eq!(
            fired,
            vec![
                TimerPurpose::Jitter,
                TimerPurpose::Jitter,
                TimerPurpose::Morph
            ]
        );
        assert_eq!(timers.pending_count(), 1);
        assert_eq!(timers.next_due_ms(), Some(120.0));
    }

    #[test]
    fn cancel_all_drops_everything() {
        let mut timers = TimerRegistry::new();
        let id = timers.schedule_once(TimerPurpose::Morph, 0.0, 10.0);
        timers.schedule_every(TimerPurpose::Jitter, 0.0, 10.0);
        assert!(timers.is_pending(id));
        assert_eq!(timers.cancel_all(), 2);
        assert!(!timers.is_pending(id));
        assert!(timers.pop_due(1_000.0).is_none());
    }

    #[test]
    fn recurring_timers_need_a_positive_interval() {
        let mut timers = TimerRegistry::new();
        for interval in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(
                timers
                    .schedule_every(TimerPurpose::Jitter, 0.0, interval)
                    .is_none()
            );
        }
        assert_eq!(timers.pending_count(), 0);
        assert!(timers.pop_due(0.0).is_none());

        assert!(timers.schedule_every(TimerPurpose::Jitter, 0.0, 1.0).is_some());
        assert_eq!(timers.pop_due(5.0).map(|(_, purpose)| purpose), Some(TimerPurpose::Jitter));
    }
}
