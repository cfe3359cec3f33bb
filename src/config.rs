//! Editor tunables with environment overrides.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{
    CANVAS_IMAGE_WIDTH, GRID_SIZE, LINE_HEIGHT_PX, MIN_ELEMENT_SIZE, PLACEMENT_OFFSET,
    POPOUT_IMAGE_WIDTH, RESIZE_HANDLE_PX, TEXT_PADDING_PX,
};
use crate::text_edit::LineMetrics;

pub const GRID_SIZE_VAR: &str = "FREEFORM_GRID_SIZE";
pub const MIN_SIZE_VAR: &str = "FREEFORM_MIN_SIZE";
pub const CANVAS_IMAGE_WIDTH_VAR: &str = "FREEFORM_CANVAS_IMAGE_WIDTH";
pub const POPOUT_IMAGE_WIDTH_VAR: &str = "FREEFORM_POPOUT_IMAGE_WIDTH";
pub const PLACEMENT_OFFSET_VAR: &str = "FREEFORM_PLACEMENT_OFFSET";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Snap cell size for dropped elements.
    pub grid_size: f64,
    /// Resize floor on each axis.
    pub min_size: f64,
    pub canvas_image_width: f64,
    pub popout_image_width: f64,
    /// Offset from the canvas origin for new elements.
    pub placement_offset: f64,
    pub resize_handle_px: f64,
    pub text: LineMetrics,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            min_size: MIN_ELEMENT_SIZE,
            canvas_image_width: CANVAS_IMAGE_WIDTH,
            popout_image_width: POPOUT_IMAGE_WIDTH,
            placement_offset: PLACEMENT_OFFSET,
            resize_handle_px: RESIZE_HANDLE_PX,
            text: LineMetrics {
                line_height: LINE_HEIGHT_PX,
                padding: TEXT_PADDING_PX,
                wrap_chars: None,
            },
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables.
    ///
    /// Optional, all positive numbers:
    /// - `FREEFORM_GRID_SIZE`: default 20
    /// - `FREEFORM_MIN_SIZE`: default 20
    /// - `FREEFORM_CANVAS_IMAGE_WIDTH`: default 300
    /// - `FREEFORM_POPOUT_IMAGE_WIDTH`: default 500
    /// - `FREEFORM_PLACEMENT_OFFSET`: default 20 (zero allowed)
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a set variable that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a present key whose value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            grid_size: parse_f64(&lookup, GRID_SIZE_VAR, defaults.grid_size, false)?,
            min_size: parse_f64(&lookup, MIN_SIZE_VAR, defaults.min_size, false)?,
            canvas_image_width: parse_f64(
                &lookup,
                CANVAS_IMAGE_WIDTH_VAR,
                defaults.canvas_image_width,
                false,
            )?,
            popout_image_width: parse_f64(
                &lookup,
                POPOUT_IMAGE_WIDTH_VAR,
                defaults.popout_image_width,
                false,
            )?,
            placement_offset: parse_f64(
                &lookup,
                PLACEMENT_OFFSET_VAR,
                defaults.placement_offset,
                true,
            )?,
            ..defaults
        })
    }
}

fn parse_f64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: f64,
    allow_zero: bool,
) -> Result<f64, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && (v > 0.0 || (allow_zero && v >= 0.0)) => Ok(v),
        _ => Err(ConfigError::Invalid {
            var: var.to_string(),
            value: raw,
        }),
    }
}
