//! Drawing composited frames into their grid cells.

use std::sync::atomic::{AtomicBool, Ordering};

use image::imageops::{self, FilterType};

use crate::{
    accumulate::CompositedFrame,
    composite::{blit_over, premultiply_in_place, unpremultiply_in_place},
    config::{Placement, RenderConfig},
    foundation::core::{Bitmap, TRANSPARENT, rgba_len},
    foundation::error::{SheetError, SheetResult},
    layout::{CellRect, GridLayout, cell_rect},
};

/// Size and crop offset of a frame scaled to cover a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverGeometry {
    pub width: u32,
    pub height: u32,
    /// Pixels cut from the left of the scaled frame.
    pub offset_x: u32,
    /// Pixels cut from the top of the scaled frame.
    pub offset_y: u32,
}

/// Uniformly scale a `frame_w x frame_h` frame so it covers `cell`, centered.
pub fn cover_geometry(frame_w: u32, frame_h: u32, cell: CellRect) -> CoverGeometry {
    let frame_ratio = f64::from(frame_w) / f64::from(frame_h);
    let cell_ratio = f64::from(cell.width) / f64::from(cell.height);

    let (width, height) = if frame_ratio > cell_ratio {
        let w = (f64::from(cell.height) * frame_ratio).round() as u32;
        (w.max(cell.width), cell.height)
    } else {
        let h = (f64::from(cell.width) / frame_ratio).round() as u32;
        (cell.width, h.max(cell.height))
    };

    CoverGeometry {
        width,
        height,
        offset_x: (width - cell.width) / 2,
        offset_y: (height - cell.height) / 2,
    }
}

/// The part of a `frame_w x frame_h` frame that stays visible once covered onto `cell`.
///
/// Rounded outwards to whole source pixels so the window never shrinks to nothing.
pub(crate) fn visible_source(frame_w: u32, frame_h: u32, cell: CellRect) -> CellRect {
    let g = cover_geometry(frame_w, frame_h, cell);
    let (x, width) = source_span(g.offset_x, cell.width, g.width, frame_w);
    let (y, height) = source_span(g.offset_y, cell.height, g.height, frame_h);
    CellRect {
        x,
        y,
        width,
        height,
    }
}

/// Map `[offset, offset + visible)` of a `scaled`-long axis back onto a `source`-long one.
fn source_span(offset: u32, visible: u32, scaled: u32, source: u32) -> (u32, u32) {
    let factor = f64::from(source) / f64::from(scaled);
    let start = (f64::from(offset) * factor).floor() as u32;
    let end = (f64::from(offset + visible) * factor).ceil() as u32;
    let start = start.min(source - 1);
    let end = end.clamp(start + 1, source);
    (start, end - start)
}

pub(crate) fn filter_for(pixel_perfect: bool) -> FilterType {
    if pixel_perfect {
        FilterType::Nearest
    } else {
        FilterType::Lanczos3
    }
}

/// Draw `frames` in grid order onto a fresh `output_size x output_size` canvas.
pub fn render_cells(
    frames: &[CompositedFrame],
    layout: GridLayout,
    config: &RenderConfig,
    cancel: &AtomicBool,
) -> SheetResult<Bitmap> {
    let size = config.output_size;
    rgba_len(size, size)?;
    let mut out = Bitmap::filled(size, size, config.background.rgba().unwrap_or(TRANSPARENT));

    let placement = config.placement();
    let filter = filter_for(config.pixel_perfect);

    for (idx, frame) in frames.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!(cell = idx, "rendering cancelled");
            return Err(SheetError::Cancelled);
        }

        let cell = cell_rect(idx, layout, size);
        if cell.is_empty() || frame.pixels.width == 0 || frame.pixels.height == 0 {
            tracing::debug!(cell = idx, ?cell, "skipping empty cell");
            continue;
        }

        let src = frame.pixels.to_rgba_image()?;
        let visible = match placement {
            Placement::Stretch => scale(&src, cell.width, cell.height, filter),
            Placement::FillAndCrop => {
                let window = visible_source(src.width(), src.height(), cell);
                let cropped =
                    imageops::crop_imm(&src, window.x, window.y, window.width, window.height)
                        .to_image();
                scale(&cropped, cell.width, cell.height, filter)
            }
        };

        tracing::trace!(cell = idx, frame = frame.meta.index, ?cell, "placing frame");
        blit_over(&mut out, &Bitmap::from(visible), cell.x, cell.y);
    }

    Ok(out)
}

fn scale(src: &image::RgbaImage, width: u32, height: u32, filter: FilterType) -> image::RgbaImage {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    if matches!(filter, FilterType::Nearest) {
        return imageops::resize(src, width, height, filter);
    }

    // Smoothing filters mix neighbours; do it on premultiplied colour so fully transparent
    // texels contribute no colour at edges.
    let mut premul = src.clone();
    premultiply_in_place(&mut premul);
    let mut out = imageops::resize(&premul, width, height, filter);
    unpremultiply_in_place(&mut out);
    out
}
