use serde::{Deserialize, Serialize};

use crate::core::ScenarioId;
use crate::error::{ConditionError, ConditionResult};
use crate::interaction::DegradedConfig;
use crate::render::Color;

use super::validation::validate_visual_config;

/// Per-group palette; groups beyond the second have no color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupColors {
    pub group_a: Color,
    pub group_b: Color,
}

impl Default for GroupColors {
    fn default() -> Self {
        Self {
            group_a: Color::from_rgb8(0x08, 0x91, 0xB2),
            group_b: Color::from_rgb8(0x7C, 0x3A, 0xED),
        }
    }
}

/// Static visual configuration shared by every strategy.
///
/// This type is serializable so study hosts can keep condition styling in a
/// config file instead of code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualConfig {
    #[serde(default)]
    pub colors: GroupColors,
    #[serde(default = "default_shade_opacity")]
    pub shade_opacity: f64,
    #[serde(default = "default_alternative_opacity")]
    pub alternative_opacity: f64,
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: f64,
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: f64,
    /// Cross-fade duration of the band-to-ensemble transition.
    #[serde(default = "default_transform_ms")]
    pub transform_ms: f64,
    /// Timed band-to-ensemble morph; hover-only when unset.
    #[serde(default)]
    pub morph_after_ms: Option<f64>,
    /// Preferred scenarios for partial line subsets, in priority order.
    #[serde(default = "default_sampled_scenarios")]
    pub sampled_scenarios: Vec<ScenarioId>,
    #[serde(default)]
    pub degraded: DegradedConfig,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            colors: GroupColors::default(),
            shade_opacity: default_shade_opacity(),
            alternative_opacity: default_alternative_opacity(),
            fade_in_ms: default_fade_in_ms(),
            fade_out_ms: default_fade_out_ms(),
            transform_ms: default_transform_ms(),
            morph_after_ms: None,
            sampled_scenarios: default_sampled_scenarios(),
            degraded: DegradedConfig::default(),
        }
    }
}

impl VisualConfig {
    #[must_use]
    pub fn with_colors(mut self, group_a: Color, group_b: Color) -> Self {
        self.colors = GroupColors { group_a, group_b };
        self
    }

    #[must_use]
    pub fn with_shade_opacity(mut self, shade_opacity: f64) -> Self {
        self.shade_opacity = shade_opacity;
        self
    }

    #[must_use]
    pub fn with_alternative_opacity(mut self, alternative_opacity: f64) -> Self {
        self.alternative_opacity = alternative_opacity;
        self
    }

    #[must_use]
    pub fn with_fade_durations(mut self, fade_in_ms: f64, fade_out_ms: f64) -> Self {
        self.fade_in_ms = fade_in_ms;
        self.fade_out_ms = fade_out_ms;
        self
    }

    #[must_use]
    pub fn with_transform_ms(mut self, transform_ms: f64) -> Self {
        self.transform_ms = transform_ms;
        self
    }

    #[must_use]
    pub fn with_morph_after_ms(mut self, morph_after_ms: f64) -> Self {
        self.morph_after_ms = Some(morph_after_ms);
        self
    }

    #[must_use]
    pub fn with_sampled_scenarios<I, S>(mut self, scenarios: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sampled_scenarios = scenarios.into_iter().map(ScenarioId::new).collect();
        self
    }

    #[must_use]
    pub fn with_degraded(mut self, degraded: DegradedConfig) -> Self {
        self.degraded = degraded;
        self
    }

    pub fn validate(&self) -> ConditionResult<()> {
        validate_visual_config(self)
    }

    /// Color of the group at `index` in dataset order.
    pub fn color_for(&self, index: usize) -> ConditionResult<Color> {
        match index {
            0 => Ok(self.colors.group_a),
            1 => Ok(self.colors.group_b),
            _ => Err(ConditionError::InvalidConfiguration(format!(
                "no color configured for group #{index}; at most two groups are supported"
            ))),
        }
    }

    /// Parses a config from JSON, filling omitted fields with defaults.
    pub fn from_json_str(input: &str) -> ConditionResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ConditionError::InvalidConfiguration(format!("failed to parse visual config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn default_shade_opacity() -> f64 {
    0.2
}

fn default_alternative_opacity() -> f64 {
    1.0
}

fn default_fade_in_ms() -> f64 {
    200.0
}

fn default_fade_out_ms() -> f64 {
    200.0
}

fn default_transform_ms() -> f64 {
    400.0
}

fn default_sampled_scenarios() -> Vec<ScenarioId> {
    [1, 2, 3, 5, 8]
        .iter()
        .map(|n| ScenarioId::new(format!("scenario_{n}")))
        .collect()
}
