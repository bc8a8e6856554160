use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::CanonicalDataset;
use crate::error::{ConditionError, ConditionResult};
use crate::interaction::InteractionLog;

use super::{ConditionStrategy, DisplayOverride, StrategyKind, VisualConfig};

/// Instantiates the strategy assigned to `index`.
///
/// Unknown indices fail with `InvalidConfiguration` before anything is
/// rendered or logged.
pub fn create(
    index: usize,
    dataset: Rc<CanonicalDataset>,
    config: VisualConfig,
    log: &InteractionLog,
) -> ConditionResult<ConditionStrategy> {
    let kind = StrategyKind::from_index(index)?;
    ConditionStrategy::new(kind, dataset, config, DisplayOverride::default(), log)
}

/// Owns the shared dataset, visual config and log, and the lifecycle of every
/// mounted strategy.
///
/// Strategies are mounted into named slots; mounting into an occupied slot
/// tears the previous strategy down first.
#[derive(Debug)]
pub struct StrategyFactory {
    dataset: Rc<CanonicalDataset>,
    config: VisualConfig,
    log: InteractionLog,
    mounted: IndexMap<String, MountedStrategy>,
}

#[derive(Debug)]
struct MountedStrategy {
    index: usize,
    display: DisplayOverride,
    strategy: ConditionStrategy,
}

impl StrategyFactory {
    pub fn new(
        dataset: CanonicalDataset,
        config: VisualConfig,
        log: InteractionLog,
    ) -> ConditionResult<Self> {
        config.validate()?;
        Ok(Self {
            dataset: Rc::new(dataset),
            config,
            log,
            mounted: IndexMap::new(),
        })
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
    pub fn log(&self) -> &InteractionLog {
        &self.log
    }

    pub fn create(&self, index: usize) -> ConditionResult<ConditionStrategy> {
        create(index, Rc::clone(&self.dataset), self.config.clone(), &self.log)
    }

    pub fn create_with_display(
        &self,
        index: usize,
        display: DisplayOverride,
    ) -> ConditionResult<ConditionStrategy> {
        let kind = StrategyKind::from_index(index)?;
        if !display.is_empty() && kind != StrategyKind::Parameterized {
            return Err(ConditionError::InvalidConfiguration(format!(
                "display override is only accepted by the parameterized strategy, not `{kind}`"
            )));
        }
        ConditionStrategy::new(
            kind,
            Rc::clone(&self.dataset),
            self.config.clone(),
            display,
            &self.log,
        )
    }

    /// Creates, renders and attaches a strategy into `slot`.
    pub fn mount(&mut self, slot: &str, index: usize) -> ConditionResult<&mut ConditionStrategy> {
        self.mount_with_display(slot, index, DisplayOverride::default())
    }

    pub fn mount_with_display(
        &mut self,
        slot: &str,
        index: usize,
        display: DisplayOverride,
    ) -> ConditionResult<&mut ConditionStrategy> {
        let mut strategy = self.create_with_display(index, display.clone())?;
        strategy.render()?;

        if let Some(mut previous) = self.mounted.shift_remove(slot) {
            previous.strategy.cleanup();
            debug!(slot, previous = previous.strategy.kind().slug(), "slot replaced");
        }
        strategy.attach_interactions()?;
        debug!(slot, strategy = strategy.kind().slug(), "strategy mounted");
        let entry = self
            .mounted
            .entry(slot.to_owned())
            .or_insert(MountedStrategy {
                index,
                display,
                strategy,
            });
        Ok(&mut entry.strategy)
    }

    /// Tears down the strategy in `slot`. Returns `true` when one was mounted.
    pub fn unmount(&mut self, slot: &str) -> bool {
        match self.mounted.shift_remove(slot) {
            Some(mut mounted) => {
                mounted.strategy.cleanup();
                debug!(slot, "strategy unmounted");
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn strategy(&self, slot: &str) -> Option<&ConditionStrategy> {
        self.mounted.get(slot).map(|mounted| &mounted.strategy)
    }

    pub fn strategy_mut(&mut self, slot: &str) -> Option<&mut ConditionStrategy> {
        self.mounted.get_mut(slot).map(|mounted| &mut mounted.strategy)
    }

    #[must_use]
    pub fn mounted_slots(&self) -> Vec<&str> {
        self.mounted.keys().map(String::as_str).collect()
    }

    /// Runs due timers of every mounted strategy; returns the total fired.
    pub fn run_due_timers(&mut self) -> usize {
        self.mounted
            .values_mut()
            .map(|mounted| mounted.strategy.run_due_timers())
            .sum()
    }

    /// Tears down every mounted strategy. Returns how many were removed.
    pub fn cleanup_all(&mut self) -> usize {
        let count = self.mounted.len();
        for (_, mut mounted) in self.mounted.drain(..) {
            mounted.strategy.cleanup();
        }
        debug!(count, "all strategies cleaned up");
        count
    }

    /// Swaps in a freshly aggregated dataset and re-mounts every slot with its
    /// previous assignment. When a replacement fails to build, the old
    /// strategies stay mounted.
    pub fn replace_dataset(&mut self, dataset: CanonicalDataset) -> ConditionResult<()> {
        let dataset = Rc::new(dataset);
        let mut replacements = Vec::with_capacity(self.mounted.len());
        for (slot, mounted) in &self.mounted {
            let kind = StrategyKind::from_index(mounted.index)?;
            let mut strategy = ConditionStrategy::new(
                kind,
                Rc::clone(&dataset),
                self.config.clone(),
                mounted.display.clone(),
                &self.log,
            )?;
            strategy.render()?;
            replacements.push((slot.clone(), mounted.index, mounted.display.clone(), strategy));
        }

        self.cleanup_all();
        self.dataset = dataset;
        for (slot, index, display, mut strategy) in replacements {
            strategy.attach_interactions()?;
            self.mounted.insert(
                slot,
                MountedStrategy {
                    index,
                    display,
                    strategy,
                },
            );
        }
        debug!(slots = self.mounted.len(), "dataset replaced");
        Ok(())
    }
}

impl Drop for StrategyFactory {
    fn drop(&mut self) {
        self.cleanup_all();
    }
}
