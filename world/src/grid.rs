//! Occupancy table for the plantable grid.

use lawn_defence_core::{CellCoord, OccupancyView};

/// Dense row-major table recording which cells hold a defender.
///
/// `occupy` and `free` are only called in lockstep with defender creation and
/// reaping, so a cell is marked iff it holds a live defender.
#[derive(Clone, Debug)]
pub(crate) struct GridMap {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl GridMap {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![false; capacity],
        }
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.view().is_occupied(cell)
    }

    pub(crate) fn occupy(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = true;
            }
        }
    }

    pub(crate) fn free(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = false;
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(false);
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
