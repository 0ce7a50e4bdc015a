use serde::{Deserialize, Serialize};

use crate::foundation::{
    color::Background,
    error::{SheetError, SheetResult},
};

pub const DEFAULT_OUTPUT_SIZE: u32 = 1024;

/// Everything that controls how a sprite sheet is laid out and drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Width and height of the square output, in pixels.
    pub output_size: u32,
    /// Fixed column count; unset picks one from the frame count.
    pub columns: Option<u32>,
    /// Frames dropped between kept frames (0 keeps all).
    pub frame_skip: u32,
    /// Fill-and-crop each cell instead of stretching, and search for an aspect-matching grid.
    pub preserve_aspect: bool,
    /// Nearest-neighbour scaling instead of smoothing.
    pub pixel_perfect: bool,
    pub background: Background,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            columns: None,
            frame_skip: 0,
            preserve_aspect: false,
            pixel_perfect: false,
            background: Background::Transparent,
        }
    }
}

impl RenderConfig {
    /// Reject configurations that could never produce a sheet.
    pub fn validate(&self) -> SheetResult<()> {
        if self.output_size == 0 {
            return Err(SheetError::invalid_config("output_size", "must be > 0"));
        }
        if self.columns == Some(0) {
            return Err(SheetError::invalid_config("columns", "must be > 0 when set"));
        }
        Ok(())
    }

    /// Cell placement mode implied by `preserve_aspect`.
    pub fn placement(&self) -> Placement {
        if self.preserve_aspect {
            Placement::FillAndCrop
        } else {
            Placement::Stretch
        }
    }
}

/// How a frame is fitted into its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Non-uniform scale to exactly the cell size.
    Stretch,
    /// Uniform scale to cover the cell, centered and clipped.
    FillAndCrop,
}

impl Placement {
    pub fn label(self) -> &'static str {
        match self {
            Placement::Stretch => "Stretch",
            Placement::FillAndCrop => "Keep Aspect / Fill & Crop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        RenderConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_output_size_is_rejected() {
        let cfg = RenderConfig {
            output_size: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SheetError::InvalidConfig {
                field: "output_size",
                ..
            })
        ));
    }

    #[test]
    fn zero_columns_is_rejected() {
        let cfg = RenderConfig {
            columns: Some(0),
            ..RenderConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SheetError::InvalidConfig {
                field: "columns",
                ..
            })
        ));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let cfg: RenderConfig = serde_json::from_value(json!({
            "output_size": 256,
            "preserve_aspect": true,
            "background": "#ffffff"
        }))
        .unwrap();
        assert_eq!(cfg.output_size, 256);
        assert_eq!(cfg.columns, None);
        assert_eq!(cfg.frame_skip, 0);
        assert!(cfg.preserve_aspect);
        assert_eq!(cfg.background, Background::Color([255, 255, 255, 255]));
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let res: Result<RenderConfig, _> = serde_json::from_value(json!({"size": 3}));
        assert!(res.is_err());
    }
}
