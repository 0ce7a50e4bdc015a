//! Grid selection and cell geometry.

/// Columns and rows of the sprite sheet grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
}

impl GridLayout {
    /// Grid with `columns` columns and just enough rows for `frame_count` frames.
    pub fn with_columns(frame_count: usize, columns: u32) -> Self {
        let columns = columns.max(1);
        let rows = (frame_count as u64).div_ceil(u64::from(columns)).max(1);
        Self {
            columns,
            rows: u32::try_from(rows).unwrap_or(u32::MAX),
        }
    }

    pub fn capacity(self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }
}

/// Choose the grid for `frame_count` frames.
///
/// An explicit column count wins. Otherwise `preserve_aspect` searches for the column count whose
/// `rows / columns` is closest to `frame_aspect`, keeping the first (smallest) column count on
/// ties. The fallback is a square-ish `ceil(sqrt(n))` columns.
pub fn plan_layout(
    frame_count: usize,
    frame_aspect: f64,
    columns: Option<u32>,
    preserve_aspect: bool,
) -> GridLayout {
    let n = frame_count.max(1);
    if let Some(columns) = columns {
        return GridLayout::with_columns(n, columns);
    }
    if preserve_aspect {
        return best_aspect_layout(n, frame_aspect);
    }
    let columns = (n as f64).sqrt().ceil() as u32;
    GridLayout::with_columns(n, columns)
}

fn best_aspect_layout(n: usize, frame_aspect: f64) -> GridLayout {
    let mut best = GridLayout::with_columns(n, 1);
    let mut best_diff = f64::INFINITY;
    let max_columns = u32::try_from(n).unwrap_or(u32::MAX);

    for columns in 1..=max_columns {
        let candidate = GridLayout::with_columns(n, columns);
        let cell_aspect = f64::from(candidate.rows) / f64::from(columns);
        let diff = (cell_aspect - frame_aspect).abs();
        if diff < best_diff {
            best_diff = diff;
            best = candidate;
        }
    }
    best
}

/// A cell of the output canvas, in output pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellRect {
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// `round(index * size / count)`: a shared boundary between adjacent cells.
pub fn boundary(index: u32, size: u32, count: u32) -> u32 {
    let step = f64::from(size) / f64::from(count.max(1));
    (f64::from(index) * step).round() as u32
}

/// The rectangle of grid position `idx` on a square `output_size` canvas.
pub fn cell_rect(idx: usize, layout: GridLayout, output_size: u32) -> CellRect {
    let columns = layout.columns.max(1);
    let row = u32::try_from(idx / columns as usize).unwrap_or(u32::MAX);
    let col = (idx % columns as usize) as u32;

    let x = boundary(col, output_size, columns);
    let y = boundary(row, output_size, layout.rows);
    let x_end = boundary(col.saturating_add(1), output_size, columns);
    let y_end = boundary(row.saturating_add(1), output_size, layout.rows);

    CellRect {
        x,
        y,
        width: x_end.saturating_sub(x),
        height: y_end.saturating_sub(y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_heuristic_for_ten_frames() {
        let l = plan_layout(10, 1.0, None, false);
        assert_eq!(l, GridLayout { columns: 4, rows: 3 });
    }

    #[test]
    fn explicit_columns_derive_rows() {
        let l = plan_layout(10, 1.0, Some(3), false);
        assert_eq!(l, GridLayout { columns: 3, rows: 4 });

        // The override also wins over the aspect search.
        let l = plan_layout(10, 1.0, Some(3), true);
        assert_eq!(l, GridLayout { columns: 3, rows: 4 });
    }

    #[test]
    fn more_columns_than_frames_is_one_row() {
        let l = plan_layout(3, 1.0, Some(8), false);
        assert_eq!(l, GridLayout { columns: 8, rows: 1 });
    }

    #[test]
    fn aspect_search_minimizes_distance() {
        // n=4, aspect 1: c=1 -> 4/1, c=2 -> 2/2 = 1 (exact), c=3 -> 2/3, c=4 -> 1/4.
        assert_eq!(
            plan_layout(4, 1.0, None, true),
            GridLayout { columns: 2, rows: 2 }
        );
        // n=6, aspect 2: c=1 -> 6, c=2 -> 1.5, c=3 -> 0.67 ... closest is c=2.
        assert_eq!(
            plan_layout(6, 2.0, None, true),
            GridLayout { columns: 2, rows: 3 }
        );
    }

    #[test]
    fn aspect_search_ties_keep_smallest_columns() {
        // n=2, aspect 1.25: c=1 -> |2 - 1.25| = 0.75, c=2 -> |0.5 - 1.25| = 0.75.
        assert_eq!(
            plan_layout(2, 1.25, None, true),
            GridLayout { columns: 1, rows: 2 }
        );
    }

    #[test]
    fn layout_always_holds_every_frame() {
        for n in 1..40usize {
            for aspect in [0.25, 1.0, 1.7, 4.0] {
                for preserve in [false, true] {
                    let l = plan_layout(n, aspect, None, preserve);
                    assert!(l.capacity() >= n as u64);
                    assert_eq!(u64::from(l.rows), (n as u64).div_ceil(u64::from(l.columns)));
                }
            }
        }
    }

    #[test]
    fn boundaries_round_shared_edges() {
        let xs: Vec<u32> = (0..=3).map(|i| boundary(i, 100, 3)).collect();
        assert_eq!(xs, vec![0, 33, 67, 100]);
    }

    #[test]
    fn cells_tile_the_canvas_without_gaps() {
        let layout = GridLayout { columns: 3, rows: 2 };
        let cells: Vec<CellRect> = (0..6).map(|i| cell_rect(i, layout, 100)).collect();

        let row_width: u32 = cells[..3].iter().map(|c| c.width).sum();
        assert_eq!(row_width, 100);
        let col_height: u32 = [cells[0], cells[3]].iter().map(|c| c.height).sum();
        assert_eq!(col_height, 100);

        for pair in cells[..3].windows(2) {
            assert_eq!(pair[0].x + pair[0].width, pair[1].x);
        }
        assert_eq!(cells[4], CellRect { x: 33, y: 50, width: 34, height: 50 });
    }

    #[test]
    fn tiny_output_produces_empty_cells() {
        let layout = GridLayout { columns: 4, rows: 1 };
        let empty = (0..4)
            .map(|i| cell_rect(i, layout, 2))
            .filter(|c| c.is_empty())
            .count();
        assert!(empty > 0);
    }
}
