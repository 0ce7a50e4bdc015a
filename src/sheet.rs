//! The sprite sheet pass: composite, select, lay out, draw.

use std::sync::atomic::AtomicBool;

use crate::{
    accumulate::composite_selected_frames,
    config::{Placement, RenderConfig},
    foundation::core::Bitmap,
    foundation::error::{SheetError, SheetResult},
    layout::{GridLayout, plan_layout},
    render::render_cells,
    source::FrameSource,
};

/// A finished sheet plus the decisions that shaped it.
#[derive(Clone, Debug)]
pub struct SpriteSheet {
    pub bitmap: Bitmap,
    pub layout: GridLayout,
    pub placement: Placement,
    /// Frames drawn onto the sheet.
    pub placed_frames: usize,
    /// Frames in the source before skipping.
    pub source_frames: usize,
}

impl SpriteSheet {
    /// One-line description, e.g. `Stretch | Grid: 4 cols × 3 rows | Frames: 10`.
    pub fn summary(&self) -> String {
        format!(
            "{} | Grid: {} cols × {} rows | Frames: {}",
            self.placement.label(),
            self.layout.columns,
            self.layout.rows,
            self.placed_frames
        )
    }
}

/// Build the sprite sheet bitmap for `source`.
pub fn build_sprite_sheet(source: &dyn FrameSource, config: &RenderConfig) -> SheetResult<Bitmap> {
    render_sprite_sheet(source, config).map(|sheet| sheet.bitmap)
}

/// Like [`build_sprite_sheet`], but gives up with [`SheetError::Cancelled`] once `cancel` is set.
///
/// The flag is polled between frames and between cells.
pub fn build_sprite_sheet_with_cancel(
    source: &dyn FrameSource,
    config: &RenderConfig,
    cancel: &AtomicBool,
) -> SheetResult<Bitmap> {
    render_sprite_sheet_with_cancel(source, config, cancel).map(|sheet| sheet.bitmap)
}

pub fn render_sprite_sheet(
    source: &dyn FrameSource,
    config: &RenderConfig,
) -> SheetResult<SpriteSheet> {
    render_sprite_sheet_with_cancel(source, config, &AtomicBool::new(false))
}

#[tracing::instrument(
    skip_all,
    fields(frames = source.frame_count(), output_size = config.output_size)
)]
pub fn render_sprite_sheet_with_cancel(
    source: &dyn FrameSource,
    config: &RenderConfig,
    cancel: &AtomicBool,
) -> SheetResult<SpriteSheet> {
    config.validate()?;

    let source_frames = source.frame_count();
    if source_frames == 0 {
        return Err(SheetError::invalid_config(
            "frame_count",
            "source has no frames",
        ));
    }
    let (width, height) = (source.canvas_width(), source.canvas_height());
    if width == 0 || height == 0 {
        return Err(SheetError::invalid_config(
            "canvas",
            format!("source canvas is {width}x{height}"),
        ));
    }

    let selected = composite_selected_frames(source, config.frame_skip, cancel)?;

    let frame_aspect = f64::from(width) / f64::from(height);
    let layout = plan_layout(
        selected.len(),
        frame_aspect,
        config.columns,
        config.preserve_aspect,
    );
    let placement = config.placement();
    tracing::info!(
        columns = layout.columns,
        rows = layout.rows,
        placed = selected.len(),
        placement = placement.label(),
        "planned sprite sheet"
    );

    let bitmap = render_cells(&selected, layout, config, cancel)?;

    Ok(SpriteSheet {
        bitmap,
        layout,
        placement,
        placed_frames: selected.len(),
        source_frames,
    })
}
