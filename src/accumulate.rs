//! Disposal-aware frame compositing.
//!
//! Animated images store most frames as deltas against whatever is already on screen. The
//! [`Accumulator`] replays the animation on one canvas and snapshots the visible result after
//! each frame.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    composite::over_in_place,
    foundation::core::{Bitmap, TRANSPARENT},
    foundation::error::{SheetError, SheetResult},
    select::keeps,
    source::{Disposal, FrameMeta, FrameSource},
};

/// The visible image after a frame has been drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositedFrame {
    pub pixels: Bitmap,
    pub meta: FrameMeta,
}

/// Running canvas state for one composition pass.
#[derive(Debug)]
pub struct Accumulator {
    canvas: Bitmap,
    previous: Option<Bitmap>,
    background: Option<[u8; 3]>,
    last_disposal: Option<Disposal>,
}

impl Accumulator {
    pub fn new(width: u32, height: u32, background: Option<[u8; 3]>) -> Self {
        let mut canvas = Bitmap::new(width, height);
        fill_background(&mut canvas, background);
        Self {
            canvas,
            previous: None,
            background,
            last_disposal: None,
        }
    }

    pub fn canvas(&self) -> &Bitmap {
        &self.canvas
    }

    /// Dispose of the previous frame, draw `pixels`, and return the composited result.
    ///
    /// Frames must be fed in order; `meta.index` is only carried through.
    pub fn step(&mut self, meta: FrameMeta, pixels: &Bitmap) -> SheetResult<CompositedFrame> {
        self.advance(meta, pixels)?;
        Ok(CompositedFrame {
            pixels: self.canvas.clone(),
            meta,
        })
    }

    /// Like [`Accumulator::step`] without copying the canvas out; read it through
    /// [`Accumulator::canvas`] when the frame is wanted.
    pub fn advance(&mut self, meta: FrameMeta, pixels: &Bitmap) -> SheetResult<()> {
        if !pixels.has_same_size(&self.canvas) {
            return Err(SheetError::decode(
                meta.index,
                format!(
                    "frame is {}x{}, canvas is {}x{}",
                    pixels.width, pixels.height, self.canvas.width, self.canvas.height
                ),
            ));
        }

        if let Some(disposal) = self.last_disposal {
            self.dispose(disposal);
        }

        if meta.disposal == Disposal::RestorePrevious {
            self.previous = Some(self.canvas.clone());
        }

        over_in_place(&mut self.canvas, pixels)?;

        tracing::trace!(
            frame = meta.index,
            disposal = meta.disposal.as_str(),
            "composited frame"
        );

        self.last_disposal = Some(meta.disposal);
        Ok(())
    }

    fn dispose(&mut self, disposal: Disposal) {
        match disposal {
            Disposal::None | Disposal::Keep => {}
            Disposal::RestoreBackground => {
                self.canvas.fill(TRANSPARENT);
                fill_background(&mut self.canvas, self.background);
            }
            Disposal::RestorePrevious => match &self.previous {
                Some(prev) => self.canvas.data.copy_from_slice(&prev.data),
                None => {
                    // Nothing was saved yet: the initial canvas is the only prior state.
                    self.canvas.fill(TRANSPARENT);
                    fill_background(&mut self.canvas, self.background);
                }
            },
        }
    }
}

/// Composite every frame of `source` in order.
///
/// Returns one [`CompositedFrame`] per source frame. Stops at the first decode error; nothing
/// accumulated so far is returned.
pub fn composite_frames(source: &dyn FrameSource) -> SheetResult<Vec<CompositedFrame>> {
    composite_frames_with_cancel(source, &AtomicBool::new(false))
}

pub fn composite_frames_with_cancel(
    source: &dyn FrameSource,
    cancel: &AtomicBool,
) -> SheetResult<Vec<CompositedFrame>> {
    composite_kept(source, |_| true, cancel)
}

/// Composite `source`, copying out only the frames a skip of `stride` keeps.
///
/// Every frame still goes through the accumulator, so disposal is replayed exactly; only the
/// canvas copies are skipped. Equivalent to [`composite_frames`] followed by
/// [`select_frames`](crate::select_frames), without holding the dropped frames.
pub fn composite_selected_frames(
    source: &dyn FrameSource,
    stride: u32,
    cancel: &AtomicBool,
) -> SheetResult<Vec<CompositedFrame>> {
    let frame_count = source.frame_count();
    let selected = composite_kept(source, |i| keeps(i, stride), cancel)?;
    if selected.is_empty() {
        return Err(SheetError::EmptySelection {
            stride,
            frame_count,
        });
    }
    tracing::debug!(
        stride,
        frame_count,
        selected = selected.len(),
        "selected frames"
    );
    Ok(selected)
}

fn composite_kept(
    source: &dyn FrameSource,
    keep: impl Fn(usize) -> bool,
    cancel: &AtomicBool,
) -> SheetResult<Vec<CompositedFrame>> {
    let count = source.frame_count();
    let mut acc = Accumulator::new(
        source.canvas_width(),
        source.canvas_height(),
        source.background_color(),
    );
    let mut out = Vec::new();

    for i in 0..count {
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!(frame = i, "compositing cancelled");
            return Err(SheetError::Cancelled);
        }
        let meta = source.frame_meta(i);
        let pixels = source.frame_rgba(i)?;
        acc.advance(meta, &pixels)?;
        if keep(i) {
            out.push(CompositedFrame {
                pixels: acc.canvas().clone(),
                meta,
            });
        }
    }

    Ok(out)
}

fn fill_background(canvas: &mut Bitmap, background: Option<[u8; 3]>) {
    if let Some([r, g, b]) = background {
        canvas.fill([r, g, b, 255]);
    }
}
