use crate::{
    accumulate::CompositedFrame,
    foundation::error::{SheetError, SheetResult},
};

/// Whether position `i` survives a frame-skip of `stride`.
pub fn keeps(i: usize, stride: u32) -> bool {
    (i as u64).is_multiple_of(u64::from(stride) + 1)
}

/// Keep every `stride + 1`-th frame, starting with the first.
pub fn select_frames(
    frames: Vec<CompositedFrame>,
    stride: u32,
) -> SheetResult<Vec<CompositedFrame>> {
    let frame_count = frames.len();
    let selected: Vec<CompositedFrame> = frames
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keeps(*i, stride))
        .map(|(_, f)| f)
        .collect();

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
