use std::path::Path;

use anyhow::Context;

use crate::{
    SheetError, SheetResult,
    foundation::core::{Bitmap, rgba_len},
    source::{Disposal, FrameMeta, FrameSource},
};

/// A [`FrameSource`] backed by the `gif` crate.
///
/// The whole stream is read up front. Each frame keeps only its own sub-rectangle; it is placed
/// onto a transparent canvas-sized buffer when requested. If the stream breaks part-way, the
/// frames before the break stay available and the broken frame reports a decode error.
#[derive(Clone, Debug)]
pub struct GifFrameSource {
    width: u32,
    height: u32,
    background: Option<[u8; 3]>,
    frames: Vec<GifFrame>,
    failure: Option<(usize, String)>,
}

#[derive(Clone, Debug)]
struct GifFrame {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    disposal: Disposal,
    delay_cs: u16,
    rgba: Vec<u8>,
}

impl GifFrameSource {
    pub fn open(path: &Path) -> SheetResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read gif '{}'", path.display()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> SheetResult<Self> {
        let mut opts = gif::DecodeOptions::new();
        opts.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = opts
            .read_info(bytes)
            .map_err(|e| SheetError::container(format!("read gif header: {e}")))?;

        let width = u32::from(decoder.width());
        let height = u32::from(decoder.height());
        let background = background_rgb(decoder.global_palette(), decoder.bg_color());

        let mut frames = Vec::new();
        let mut failure = None;
        loop {
            match decoder.read_next_frame() {
                Ok(Some(frame)) => frames.push(GifFrame {
                    left: u32::from(frame.left),
                    top: u32::from(frame.top),
                    width: u32::from(frame.width),
                    height: u32::from(frame.height),
                    disposal: Disposal::from(frame.dispose),
                    delay_cs: frame.delay,
                    rgba: frame.buffer.to_vec(),
                }),
                Ok(None) => break,
                Err(e) => {
                    let index = frames.len();
                    tracing::warn!(frame = index, error = %e, "gif stream ended with a decode error");
                    failure = Some((index, e.to_string()));
                    break;
                }
            }
        }

        tracing::debug!(
            width,
            height,
            frames = frames.len(),
            has_background = background.is_some(),
            "decoded gif"
        );

        Ok(Self {
            width,
            height,
            background,
            frames,
            failure,
        })
    }

    /// Frame delay in milliseconds, if the frame exists.
    pub fn frame_delay_ms(&self, index: usize) -> Option<u32> {
        self.frames
            .get(index)
            .map(|f| u32::from(f.delay_cs) * 10)
    }
}

impl FrameSource for GifFrameSource {
    fn frame_count(&self) -> usize {
        self.frames.len() + usize::from(self.failure.is_some())
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
            .map(|f| f.disposal)
            .unwrap_or_default();
        FrameMeta { index, disposal }
    }

    fn frame_rgba(&self, index: usize) -> SheetResult<Bitmap> {
        if let Some((failed, msg)) = &self.failure
            && *failed == index
        {
            return Err(SheetError::decode(index, msg.clone()));
        }
        let frame = self
            .frames
            .get(index)
            .ok_or_else(|| SheetError::decode(index, "frame index out of range"))?;
        if frame.rgba.len() != rgba_len(frame.width, frame.height)? {
            return Err(SheetError::decode(
                index,
                format!(
                    "frame buffer is {} bytes for a {}x{} region",
                    frame.rgba.len(),
                    frame.width,
                    frame.height
                ),
            ));
        }

        let mut canvas = Bitmap::new(self.width, self.height);
        place_region(&mut canvas, frame);
        Ok(canvas)
    }

    fn background_color(&self) -> Option<[u8; 3]> {
        self.background
    }
}

fn place_region(canvas: &mut Bitmap, frame: &GifFrame) {
    if frame.left >= canvas.width || frame.top >= canvas.height {
        return;
    }
    let cols = frame.width.min(canvas.width - frame.left) as usize;
    let rows = frame.height.min(canvas.height - frame.top) as usize;
    let dst_stride = canvas.width as usize * 4;
    let src_stride = frame.width as usize * 4;

    for row in 0..rows {
        let d0 = (frame.top as usize + row) * dst_stride + frame.left as usize * 4;
        let s0 = row * src_stride;
        canvas.data[d0..d0 + cols * 4].copy_from_slice(&frame.rgba[s0..s0 + cols * 4]);
    }
}

fn background_rgb(palette: Option<&[u8]>, index: Option<usize>) -> Option<[u8; 3]> {
    let palette = palette?;
    let i = index?.checked_mul(3)?;
    let rgb = palette.get(i..i + 3)?;
    Some([rgb[0], rgb[1], rgb[2]])
}
