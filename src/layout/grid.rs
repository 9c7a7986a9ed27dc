//! Occupancy map used by the first-fit packer.
//!
//! The map is a dense `rows x columns` boolean grid. Columns are fixed for a
//! pass; rows are elastic and grow whenever a probe needs them, so a fit is
//! always found eventually.

use crate::geometry::Span;

/// Top-left cell assigned to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub col: u32,
    pub row: u32,
}

impl GridPosition {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone)]
pub struct OccupancyMap {
    columns: u32,
    cells: Vec<Vec<bool>>,
}

impl OccupancyMap {
    /// Start with a single empty row.
    pub fn new(columns: u32) -> Self {
        let columns = columns.max(1);
        Self {
            columns,
            cells: vec![vec![false; columns as usize]],
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn ensure_rows(&mut self, rows: u32) {
        while self.cells.len() < rows as usize {
            self.cells.push(vec![false; self.columns as usize]);
        }
    }

    pub fn is_occupied(&self, col: u32, row: u32) -> bool {
        self.cells
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(false)
    }

    /// True when every cell covered by `span` at `pos` is free and inside the
    /// column bounds. Rows past the current end count as free.
    pub fn fits(&self, pos: GridPosition, span: Span) -> bool {
        if pos.col + span.cols > self.columns {
            return false;
        }
        for row in pos.row..pos.row + span.rows {
            for col in pos.col..pos.col + span.cols {
                if self.is_occupied(col, row) {
                    return false;
                }
            }
        }
        true
    }

    pub fn occupy(&mut self, pos: GridPosition, span: Span) {
        self.ensure_rows(pos.row + span.rows);
        for row in pos.row..pos.row + span.rows {
            for col in pos.col..pos.col + span.cols {
                self.cells[row as usize][col as usize] = true;
            }
        }
    }

    /// Row-major scan for the first cell where `span` fits. `span.cols` must
    /// already be clamped to the column count.
    pub fn first_fit(&mut self, span: Span) -> GridPosition {
        debug_assert!(span.cols <= self.columns);
        let mut row = 0;
        loop {
            self.ensure_rows(row + span.rows);
            for col in 0..=(self.columns - span.cols) {
                let pos = GridPosition::new(col, row);
                if self.fits(pos, span) {
                    return pos;
                }
            }
            row += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_map_has_one_row() {
        let map = OccupancyMap::new(3);
        assert_eq!(map.rows(), 1);
        assert_eq!(map.columns(), 3);
    }

    #[test]
    fn zero_columns_clamped() {
        let map = OccupancyMap::new(0);
        assert_eq!(map.columns(), 1);
    }

    #[test]
    fn fits_rejects_column_overflow() {
        let map = OccupancyMap::new(2);
        assert!(!map.fits(GridPosition::new(1, 0), Span::new(2, 1)));
        assert!(map.fits(GridPosition::new(0, 0), Span::new(2, 1)));
    }

    #[test]
    fn rows_past_end_are_free() {
        let map = OccupancyMap::new(2);
        assert!(map.fits(GridPosition::new(0, 5), Span::new(1, 3)));
    }

    #[test]
    fn first_fit_skips_occupied_cells() {
        let mut map = OccupancyMap::new(3);
        map.occupy(GridPosition::new(0, 0), Span::new(2, 2));
        assert_eq!(map.first_fit(Span::new(1, 1)), GridPosition::new(2, 0));
        map.occupy(GridPosition::new(2, 0), Span::unit());
        assert_eq!(map.first_fit(Span::new(1, 1)), GridPosition::new(2, 1));
        assert_eq!(map.first_fit(Span::new(2, 1)), GridPosition::new(0, 2));
    }

    #[test]
    fn occupy_grows_rows() {
        let mut map = OccupancyMap::new(1);
        map.occupy(GridPosition::new(0, 2), Span::new(1, 2));
        assert_eq!(map.rows(), 4);
        assert!(map.is_occupied(0, 3));
        assert!(!map.is_occupied(0, 1));
    }
}
