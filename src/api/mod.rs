mod config;
mod factory;
mod json_contract;
mod machine_builder;
mod plan_builder;
mod strategy;
mod strategy_kind;
mod validation;

pub use config::{GroupColors, VisualConfig};
pub use factory::{StrategyFactory, create};
pub use json_contract::{
    DRAW_PLAN_JSON_SCHEMA_V1, DrawPlanJsonContractV1, INTERACTION_LOG_JSON_SCHEMA_V1,
    InteractionLogJsonContractV1, events_from_json_compat_str,
};
pub use plan_builder::{
    AGGREGATED_DASH_PX, AGGREGATED_STROKE_WIDTH, CLICK_ZONE_STROKE_WIDTH,
    HISTORICAL_STROKE_WIDTH, HOVER_ZONE_STROKE_WIDTH, NEXT_LINE_LABEL, SCENARIO_STROKE_WIDTH,
    build_draw_plan, line_label, select_scenarios,
};
pub use strategy::{ConditionStrategy, ElementState, StrategyPhase};
pub use strategy_kind::{
    ConditionInfo, DisplayOverride, GroupDisplay, StrategyKind, condition_info,
};
