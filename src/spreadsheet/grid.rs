use crate::spreadsheet::cell::Cell;

/// Ordered rows of cells decoded from the first sheet of an upload.
/// Rows are not guaranteed to have equal lengths.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell at `(row, col)`; positions past a short row are `None`.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }
}

impl<C: Into<Cell>> From<Vec<Vec<C>>> for Grid {
    fn from(rows: Vec<Vec<C>>) -> Self {
        Grid::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// Collects positioned cells from a decoder and anchors them at the used range.
pub(crate) struct GridBuilder {
    cells: Vec<(usize, usize, Cell)>,
    /// Used range; rows are trimmed individually so only the left column edge is kept
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
}

impl GridBuilder {
    pub(crate) fn new() -> Self {
        Self {
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
        }
    }

    /// Adds a cell; blank cells do not widen the used range.
    pub(crate) fn push(&mut self, row: usize, col: usize, cell: Cell) {
        if cell.is_empty() {
            return;
        }
        self.update_bound(row, col);
        self.cells.push((row, col, cell));
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
    }

    /// Lays the collected cells out row by row, relative to the top-left used cell.
    /// Rows keep only up to their last non-blank cell.
    pub(crate) fn finish(self) -> Grid {
        let (row_lower, row_upper, col_lower) = match (self.row_lower_bound, self.row_upper_bound, self.col_lower_bound) {
            (Some(row_lower), Some(row_upper), Some(col_lower)) => (row_lower, row_upper, col_lower),
            _ => return Grid::default(),
        };
        let mut rows = vec![Vec::<Cell>::new(); row_upper - row_lower + 1];
        for (row, col, cell) in self.cells {
            let record = &mut rows[row - row_lower];
            let col = col - col_lower;
            if record.len() <= col {
                record.resize(col + 1, Cell::Empty);
            }
            record[col] = cell;
        }
        Grid::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_initial() {
        let builder = GridBuilder::new();

        assert_eq!(builder.row_lower_bound, None);
        assert_eq!(builder.row_upper_bound, None);
        assert_eq!(builder.col_lower_bound, None);
        assert!(builder.finish().is_empty());
    }

    #[test]
    fn builder_update() {
        let mut builder = GridBuilder::new();
        builder.push(1, 1, Cell::from("a"));
        builder.push(1, 3, Cell::from("b"));
        builder.push(3, 2, Cell::from("c"));

        assert_eq!(builder.row_lower_bound, Some(1));
        assert_eq!(builder.row_upper_bound, Some(3));
        assert_eq!(builder.col_lower_bound, Some(1));

        let grid = builder.finish();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.rows()[0], vec![Cell::from("a"), Cell::Empty, Cell::from("b")]);
        assert!(grid.rows()[1].is_empty());
        assert_eq!(grid.rows()[2], vec![Cell::Empty, Cell::from("c")]);
    }

    #[test]
    fn builder_ignores_blank_cells() {
        let mut builder = GridBuilder::new();
        builder.push(0, 0, Cell::from("  "));
        builder.push(2, 4, Cell::Number(0.0));

        let grid = builder.finish();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get(0, 0), Some(&Cell::Number(0.0)));
    }

    #[test]
    fn builder_accepts_out_of_order_cells() {
        let mut builder = GridBuilder::new();
        builder.push(5, 2, Cell::from("late"));
        builder.push(4, 0, Cell::from("early"));

        let grid = builder.finish();
        assert_eq!(grid.get(0, 0), Some(&Cell::from("early")));
        assert_eq!(grid.get(1, 2), Some(&Cell::from("late")));
    }

    #[test]
    fn grid_from_literal_rows() {
        let grid = Grid::from(vec![vec!["TOSA Level"], vec!["", "Mon"]]);
        assert_eq!(grid.get(1, 0), Some(&Cell::Empty));
        assert_eq!(grid.get(1, 1), Some(&Cell::from("Mon")));
        assert_eq!(grid.get(0, 1), None);
    }
}
