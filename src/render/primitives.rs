use serde::{Deserialize, Serialize};

use crate::error::{ConditionError, ConditionResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        )
    }

    /// Parses `#RRGGBB` (leading `#` optional).
    pub fn from_hex(input: &str) -> ConditionResult<Self> {
        let hex = input.trim().trim_start_matches('#');
        let invalid = || {
            ConditionError::InvalidConfiguration(format!("color `{input}` must be #RRGGBB"))
        };
        if hex.len() != 6 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn validate(self) -> ConditionResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConditionError::InvalidConfiguration(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Stroke pattern for line-like instructions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum StrokePattern {
    #[default]
    Solid,
    Dashed {
        dash_px: f64,
        gap_px: f64,
    },
}

/// Visual style attached to one draw instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawStyle {
    pub color: Color,
    pub stroke_width: f64,
    pub pattern: StrokePattern,
}

impl DrawStyle {
    #[must_use]
    pub const fn solid(color: Color, stroke_width: f64) -> Self {
        Self {
            color,
            stroke_width,
            pattern: StrokePattern::Solid,
        }
    }

    #[must_use]
    pub const fn dashed(color: Color, stroke_width: f64, dash_px: f64, gap_px: f64) -> Self {
        Self {
            color,
            stroke_width,
            pattern: StrokePattern::Dashed { dash_px, gap_px },
        }
    }

    pub fn validate(self) -> ConditionResult<()> {
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(ConditionError::InvalidConfiguration(
                "stroke width must be finite and >= 0".to_owned(),
            ));
        }
        if let StrokePattern::Dashed { dash_px, gap_px } = self.pattern {
            if !dash_px.is_finite() || !gap_px.is_finite() || dash_px <= 0.0 || gap_px <= 0.0 {
                return Err(ConditionError::InvalidConfiguration(
                    "dash pattern lengths must be finite and > 0".to_owned(),
                ));
            }
        }
        self.color.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::Color;
    use approx::assert_relative_eq;

    #[test]
    fn hex_colors_parse_into_normalized_channels() {
        let color = Color::from_hex("#0891B2").expect("hex");
        assert_relative_eq!(color.red, 8.0 / 255.0);
        assert_relative_eq!(color.green, 145.0 / 255.0);
        assert_relative_eq!(color.blue, 178.0 / 255.0);
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("zzzzzz").is_err());
    }

    #[test]
    fn signed_channels_are_not_hex() {
        assert!(Color::from_hex("+12345").is_err());
        assert!(Color::from_hex("#+1+2+3").is_err());
        assert!(Color::from_hex("-0ff00").is_err());
    }
}
