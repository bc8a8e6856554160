use crate::core::CanonicalDataset;
use crate::error::{ConditionError, ConditionResult};

use super::{DisplayOverride, GroupDisplay, VisualConfig};

pub(super) fn validate_visual_config(config: &VisualConfig) -> ConditionResult<()> {
    config.colors.group_a.validate()?;
    config.colors.group_b.validate()?;

    for (name, value) in [
        ("shade_opacity", config.shade_opacity),
        ("alternative_opacity", config.alternative_opacity),
    ] {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConditionError::InvalidConfiguration(format!(
                "`{name}` must be finite and in [0, 1]"
            )));
        }
    }

    for (name, value) in [
        ("fade_in_ms", config.fade_in_ms),
        ("fade_out_ms", config.fade_out_ms),
        ("transform_ms", config.transform_ms),
    ] {
        validate_duration(name, value)?;
    }
    if let Some(morph_after_ms) = config.morph_after_ms {
        validate_duration("morph_after_ms", morph_after_ms)?;
    }

    config.degraded.validate()
}

fn validate_duration(name: &str, value: f64) -> ConditionResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConditionError::InvalidConfiguration(format!(
            "`{name}` must be finite and >= 0"
        )));
    }
    Ok(())
}

pub(super) fn validate_display_override(
    display: &DisplayOverride,
    dataset: &CanonicalDataset,
) -> ConditionResult<()> {
    for (group, format) in display.entries() {
        if dataset.group(group).is_none() {
            return Err(ConditionError::InvalidConfiguration(format!(
                "display override names unknown group `{group}`"
            )));
        }
        if let GroupDisplay::Lines { count: 0 } = format {
            return Err(ConditionError::InvalidConfiguration(format!(
                "display override for group `{group}` must show at least one line"
            )));
        }
    }
    Ok(())
}

/// Rejects datasets the two-color palette cannot draw.
pub(super) fn validate_group_count(dataset: &CanonicalDataset) -> ConditionResult<()> {
    let groups = dataset.groups().len();
    if groups > 2 {
        return Err(ConditionError::InvalidConfiguration(format!(
            "dataset has {groups} groups; at most two groups are supported"
        )));
    }
    Ok(())
}
