//! forecast-conditions: condition-rendering engine for forecast-uncertainty
//! visualization studies.
//!
//! Raw per-scenario records are aggregated once into a read-only
//! [`CanonicalDataset`]; one of seventeen rendering strategies turns it into a
//! layered [`DrawPlan`] and, for interactive conditions, attaches a state
//! machine whose events land in a session-scoped [`InteractionLog`].

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ConditionStrategy, StrategyFactory, StrategyKind, VisualConfig};
pub use crate::core::{CanonicalDataset, RawRecord, aggregate, aggregate_with_config};
pub use error::{ConditionError, ConditionResult};
pub use interaction::{InteractionLog, InteractionTrigger};
pub use render::DrawPlan;
