//! Square (β, γ) parameter grids.

use std::f64::consts::PI;

use qfence_ir::ParameterBindings;
use serde::{Deserialize, Serialize};

use crate::ansatz::{BETA, GAMMA};
use crate::error::{LandscapeError, LandscapeResult};

/// A `width × width` grid over `[0, π]²`.
///
/// Both axes take `width` evenly spaced values from 0 to π inclusive (a
/// single value, 0, when `width == 1`). Points are ordered row-major: point
/// `col + row·width` is `(β, γ) = (values[row], values[col])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    width: usize,
    values: Vec<f64>,
}

/// One grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Row-major index.
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub beta: f64,
    pub gamma: f64,
}

impl GridPoint {
    /// Bindings for the circuit's two free parameters.
    pub fn bindings(&self) -> ParameterBindings {
        let mut bindings = ParameterBindings::default();
        bindings.insert(BETA.to_string(), self.beta);
        bindings.insert(GAMMA.to_string(), self.gamma);
        bindings
    }
}

impl ParameterGrid {
    pub fn new(width: usize) -> LandscapeResult<Self> {
        if width == 0 {
            return Err(LandscapeError::InvalidGrid("width must be positive".into()));
        }
        let values = if width == 1 {
            vec![0.0]
        } else {
            let step = PI / (width - 1) as f64;
            (0..width)
                .map(|i| if i == width - 1 { PI } else { i as f64 * step })
                .collect()
        };
        Ok(Self { width, values })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.width * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Axis values shared by β and γ.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Point at row-major `index`.
    pub fn point(&self, index: usize) -> Option<GridPoint> {
        (index < self.len()).then(|| {
            let (row, col) = (index / self.width, index % self.width);
            GridPoint {
                index,
                row,
                col,
                beta: self.values[row],
                gamma: self.values[col],
            }
        })
    }

    /// All points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.len()).filter_map(|i| self.point(i))
    }
}
