use serde::{Deserialize, Serialize};

use crate::error::{ConditionError, ConditionResult};
use crate::interaction::{InteractionEvent, InteractionLog, InteractionSummary};
use crate::render::DrawPlan;

pub const INTERACTION_LOG_JSON_SCHEMA_V1: u32 = 1;
pub const DRAW_PLAN_JSON_SCHEMA_V1: u32 = 1;

/// Versioned interaction-log export consumed by analytics writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionLogJsonContractV1 {
    pub schema_version: u32,
    pub session: u64,
    pub events: Vec<InteractionEvent>,
    pub summary: InteractionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawPlanJsonContractV1 {
    pub schema_version: u32,
    pub plan: DrawPlan,
}

impl InteractionLog {
    #[must_use]
    pub fn to_json_contract_v1(&self) -> InteractionLogJsonContractV1 {
        InteractionLogJsonContractV1 {
            schema_version: INTERACTION_LOG_JSON_SCHEMA_V1,
            session: self.session(),
            events: self.events(),
            summary: self.summary(),
        }
    }

    pub fn to_json_contract_v1_pretty(&self) -> ConditionResult<String> {
        serde_json::to_string_pretty(&self.to_json_contract_v1()).map_err(|e| {
            ConditionError::InvalidConfiguration(format!(
                "failed to serialize interaction log contract v1: {e}"
            ))
        })
    }
}

/// Parses either a bare event array or the versioned export.
pub fn events_from_json_compat_str(input: &str) -> ConditionResult<Vec<InteractionEvent>> {
    if let Ok(events) = serde_json::from_str::<Vec<InteractionEvent>>(input) {
        return Ok(events);
    }
    let payload: InteractionLogJsonContractV1 = serde_json::from_str(input).map_err(|e| {
        ConditionError::InvalidConfiguration(format!(
            "failed to parse interaction log json payload: {e}"
        ))
    })?;
    if payload.schema_version != INTERACTION_LOG_JSON_SCHEMA_V1 {
        return Err(ConditionError::InvalidConfiguration(format!(
            "unsupported interaction log schema version: {}",
            payload.schema_version
        )));
    }
    Ok(payload.events)
}

impl DrawPlan {
    pub fn to_json_contract_v1_pretty(&self) -> ConditionResult<String> {
        let payload = DrawPlanJsonContractV1 {
            schema_version: DRAW_PLAN_JSON_SCHEMA_V1,
            plan: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ConditionError::InvalidConfiguration(format!(
                "failed to serialize draw plan contract v1: {e}"
            ))
        })
    }

    pub fn from_json_compat_str(input: &str) -> ConditionResult<Self> {
        if let Ok(plan) = serde_json::from_str::<DrawPlan>(input) {
            return Ok(plan);
        }
        let payload: DrawPlanJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ConditionError::InvalidConfiguration(format!(
                "failed to parse draw plan json payload: {e}"
            ))
        })?;
        if payload.schema_version != DRAW_PLAN_JSON_SCHEMA_V1 {
            return Err(ConditionError::InvalidConfiguration(format!(
                "unsupported draw plan schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.plan)
    }
}
