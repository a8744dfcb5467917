//! Score landscapes.

use std::fmt;

use ndarray::Array2;

use crate::grid::{GridPoint, ParameterGrid};

/// A `width × width` array of scores; cell `(row, col)` belongs to grid
/// point `col + row·width`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreLandscape {
    grid: ParameterGrid,
    scores: Array2<f64>,
}

/// A cell together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub point: GridPoint,
    pub score: f64,
}

impl ScoreLandscape {
    /// Wrap `scores`, which must be `grid.len()` values in row-major order.
    pub(crate) fn from_row_major(grid: ParameterGrid, scores: Vec<f64>) -> Option<Self> {
        let width = grid.width();
        let scores = Array2::from_shape_vec((width, width), scores).ok()?;
        Some(Self { grid, scores })
    }

    pub fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    /// Score at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.scores.get((row, col)).copied()
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.grid.points().map(|point| Cell {
            point,
            score: self.scores[(point.row, point.col)],
        })
    }

    /// Lowest-scoring cell; ties go to the earliest cell.
    pub fn argmin(&self) -> Option<Cell> {
        self.cells().fold(None, |best, cell| match best {
            Some(b) if b.score <= cell.score => Some(b),
            _ => Some(cell),
        })
    }

    /// Highest-scoring cell; ties go to the earliest cell.
    pub fn argmax(&self) -> Option<Cell> {
        self.cells().fold(None, |best, cell| match best {
            Some(b) if b.score >= cell.score => Some(b),
            _ => Some(cell),
        })
    }

    /// Mean over all cells.
    pub fn mean(&self) -> Option<f64> {
        self.scores.mean()
    }

    /// Elementwise `self - other`, when both cover the same grid.
    pub fn difference(&self, other: &ScoreLandscape) -> Option<Array2<f64>> {
        (self.grid == other.grid).then(|| &self.scores - &other.scores)
    }
}

impl fmt::Display for ScoreLandscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.scores.rows() {
            let cells: Vec<String> = row.iter().map(|s| format!("{s:>7.3}")).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landscape() -> ScoreLandscape {
        let grid = ParameterGrid::new(2).unwrap();
        ScoreLandscape::from_row_major(grid, vec![0.5, -1.0, 2.0, -1.0]).unwrap()
    }

    #[test]
    fn test_cell_layout() {
        let l = landscape();
        assert_eq!(l.get(0, 1), Some(-1.0));
        assert_eq!(l.get(1, 0), Some(2.0));
        assert_eq!(l.get(2, 0), None);
    }

    #[test]
    fn test_extrema() {
        let l = landscape();
        let min = l.argmin().unwrap();
        assert_eq!((min.point.row, min.point.col, min.score), (0, 1, -1.0));
        let max = l.argmax().unwrap();
        assert_eq!((max.point.index, max.score), (2, 2.0));
        assert_eq!(l.mean(), Some(0.125));
    }

    #[test]
    fn test_shape_mismatch() {
        let grid = ParameterGrid::new(2).unwrap();
        assert!(ScoreLandscape::from_row_major(grid, vec![0.0; 3]).is_none());
    }

    #[test]
    fn test_difference() {
        let l = landscape();
        let d = l.difference(&l).unwrap();
        assert!(d.iter().all(|v| *v == 0.0));
        let other = ScoreLandscape::from_row_major(ParameterGrid::new(1).unwrap(), vec![0.0]).unwrap();
        assert!(l.difference(&other).is_none());
    }
}
