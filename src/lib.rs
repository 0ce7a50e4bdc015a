//! gifsheet turns an animated image into a single sprite sheet.
//!
//! # Pipeline overview
//!
//! 1. **Composite**: replay the frames of a [`FrameSource`] on one canvas, honoring each frame's
//!    [`Disposal`], so every frame becomes the full picture a viewer would see.
//! 2. **Select**: keep every `frame_skip + 1`-th composited frame.
//! 3. **Lay out**: pick a [`GridLayout`] (explicit columns, aspect search, or square-ish).
//! 4. **Draw**: stretch or fill-and-crop each frame into its cell of a square output [`Bitmap`].
//!
//! The pass is synchronous and pure: identical inputs give byte-identical sheets, and a failed or
//! cancelled pass never hands out a partial sheet.
#![forbid(unsafe_code)]

mod accumulate;
mod assets;
mod composite;
mod config;
mod foundation;
mod layout;
mod render;
mod select;
mod sheet;
mod source;

pub use accumulate::{
    Accumulator, CompositedFrame, composite_frames, composite_frames_with_cancel,
    composite_selected_frames,
};
pub use assets::GifFrameSource;
pub use composite::{blit_over, over, over_in_place};
pub use config::{DEFAULT_OUTPUT_SIZE, Placement, RenderConfig};
pub use foundation::color::Background;
pub use foundation::core::{Bitmap, Rgba8};
pub use foundation::error::{SheetError, SheetResult};
pub use layout::{CellRect, GridLayout, boundary, cell_rect, plan_layout};
pub use render::{CoverGeometry, cover_geometry, render_cells};
pub use select::{keeps, select_frames};
pub use sheet::{
    SpriteSheet, build_sprite_sheet, build_sprite_sheet_with_cancel, render_sprite_sheet,
    render_sprite_sheet_with_cancel,
};
pub use source::{Disposal, FrameMeta, FrameSource, MemoryFrameSource};
