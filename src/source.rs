//! The decoder-facing side of the pipeline.
//!
//! A [`FrameSource`] hands out canvas-sized RGBA frames plus their disposal metadata. Frames that
//! a container stores as sub-rectangles must already be placed on a transparent canvas-sized
//! buffer before they reach the accumulator.

use crate::foundation::core::Bitmap;
use crate::foundation::error::{SheetError, SheetResult};

/// What happens to the canvas after a frame has been shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Disposal {
    /// No disposal specified; the frame stays in place.
    #[default]
    None,
    /// Leave the frame in place.
    Keep,
    /// Clear to the background color (or transparent).
    RestoreBackground,
    /// Roll the canvas back to what it was before the frame was drawn.
    RestorePrevious,
}

impl Disposal {
    /// Map a raw disposal code. Unknown codes behave like [`Disposal::None`].
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Disposal::Keep,
            2 => Disposal::RestoreBackground,
            3 => Disposal::RestorePrevious,
            _ => Disposal::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Disposal::None => "none",
            Disposal::Keep => "keep",
            Disposal::RestoreBackground => "restore-background",
            Disposal::RestorePrevious => "restore-previous",
        }
    }
}

impl From<gif::DisposalMethod> for Disposal {
    fn from(d: gif::DisposalMethod) -> Self {
        match d {
            gif::DisposalMethod::Any => Disposal::None,
            gif::DisposalMethod::Keep => Disposal::Keep,
            gif::DisposalMethod::Background => Disposal::RestoreBackground,
            gif::DisposalMethod::Previous => Disposal::RestorePrevious,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameMeta {
    pub index: usize,
    pub disposal: Disposal,
}

/// Random access to the decoded frames of one animation.
///
/// Every bitmap returned by [`FrameSource::frame_rgba`] is `canvas_width x canvas_height`.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    fn canvas_width(&self) -> u32;

    fn canvas_height(&self) -> u32;

    /// Metadata for frame `index`, `0 <= index < frame_count()`.
    fn frame_meta(&self, index: usize) -> FrameMeta;

    /// The frame's own pixels on a canvas-sized buffer.
    fn frame_rgba(&self, index: usize) -> SheetResult<Bitmap>;

    /// Opaque RGB background declared by the container, if any.
    fn background_color(&self) -> Option<[u8; 3]>;
}

/// A [`FrameSource`] over frames that were decoded elsewhere.
#[derive(Clone, Debug)]
pub struct MemoryFrameSource {
    width: u32,
    height: u32,
    frames: Vec<(Disposal, Bitmap)>,
    background: Option<[u8; 3]>,
}

impl MemoryFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
            background: None,
        }
    }

    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = Some(rgb);
        self
    }

    /// Append a frame; its bitmap must match the canvas size.
    pub fn push_frame(&mut self, disposal: Disposal, pixels: Bitmap) -> SheetResult<()> {
        if pixels.width != self.width || pixels.height != self.height {
            return Err(SheetError::decode(
                self.frames.len(),
                format!(
                    "frame is {}x{}, canvas is {}x{}",
                    pixels.width, pixels.height, self.width, self.height
                ),
            ));
        }
        self.frames.push((disposal, pixels));
        Ok(())
    }
}

impl FrameSource for MemoryFrameSource {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn canvas_width(&self) -> u32 {
        self.width
    }

    fn canvas_height(&self) -> u32 {
        self.height
    }

    fn frame_meta(&self, index: usize) -> FrameMeta {
        let disposal = self
            .frames
            .get(index)
            .map(|(d, _)| *d)
            .unwrap_or_default();
        FrameMeta { index, disposal }
    }

    fn frame_rgba(&self, index: usize) -> SheetResult<Bitmap> {
        self.frames
            .get(index)
            .map(|(_, b)| b.clone())
            .ok_or_else(|| SheetError::decode(index, "frame index out of range"))
    }

    fn background_color(&self) -> Option<[u8; 3]> {
        self.background
    }
}
