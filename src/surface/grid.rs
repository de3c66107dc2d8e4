//! Rectangular evaluation grids over (log-moneyness, year fraction).

use serde::{Deserialize, Serialize};

use crate::error::{self, SurfaceError};
use crate::smile::spline::linspace;
use crate::types::SurfacePoint;
use crate::validate::validate_percentiles;

/// Node coordinates of a rectangular grid: `x` is log-moneyness, `y` is
/// year fraction.
///
/// # Examples
/// ```
/// use ivsurf::surface::Grid;
///
/// let grid = Grid::linspace((-0.2, 0.2), (0.1, 1.0), 5, 3)?;
/// assert_eq!(grid.x().len(), 5);
/// assert_eq!(grid.y(), &[0.1, 0.55, 1.0]);
/// # Ok::<(), ivsurf::SurfaceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Grid {
    /// Grid from explicit node coordinates.
    ///
    /// # Errors
    /// Returns [`SurfaceError::InvalidInput`] if either axis is empty or holds
    /// a non-finite value.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> error::Result<Self> {
        for (axis, values) in [("x", &x), ("y", &y)] {
            if values.is_empty() {
                return Err(SurfaceError::InvalidInput {
                    message: format!("grid axis {axis} is empty"),
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(SurfaceError::InvalidInput {
                    message: format!("grid axis {axis} has non-finite nodes"),
                });
            }
        }
        Ok(Self { x, y })
    }

    /// Evenly spaced grid with `nx × ny` nodes spanning both ranges inclusively.
    pub fn linspace(
        x_range: (f64, f64),
        y_range: (f64, f64),
        nx: usize,
        ny: usize,
    ) -> error::Result<Self> {
        Self::new(
            linspace(x_range.0, x_range.1, nx),
            linspace(y_range.0, y_range.1, ny),
        )
    }

    /// Default display grid for a point cloud: `x` spans the `percentiles`
    /// of the points' log-moneyness (which trims far-wing outliers), `y`
    /// spans their full year-fraction range.
    ///
    /// # Errors
    /// Returns [`SurfaceError::InvalidInput`] if `points` is empty or the
    /// percentiles are not ordered within `[0, 100]`.
    pub fn from_points(
        points: &[SurfacePoint],
        percentiles: (f64, f64),
        nx: usize,
        ny: usize,
    ) -> error::Result<Self> {
        if points.is_empty() {
            return Err(SurfaceError::InvalidInput {
                message: "cannot derive a grid from zero points".into(),
            });
        }
        let (lo, hi) = validate_percentiles(percentiles, "grid percentiles")?;

        let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        xs.sort_by(f64::total_cmp);
        let y_min = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let y_max = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Self::linspace(
            (percentile(&xs, lo), percentile(&xs, hi)),
            (y_min, y_max),
            nx,
            ny,
        )
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.x.len() * self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node coordinates in row-major order (rows follow `y`).
    pub fn nodes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.y
            .iter()
            .flat_map(move |&y| self.x.iter().map(move |&x| (x, y)))
    }
}

/// Linear-interpolation percentile of sorted data, `p` in `[0, 100]`.
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = p / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Implied vols evaluated on a [`Grid`]. Masked nodes are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Row-major: `values[j * x.len() + i]` is the node `(x[i], y[j])`.
    pub values: Vec<Option<f64>>,
}

impl VolGrid {
    /// Vol at node `(x[i], y[j])`; `None` if masked or out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.x.len() || j >= self.y.len() {
            return None;
        }
        self.values.get(j * self.x.len() + i).copied().flatten()
    }

    /// One row per `y` node.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.values.chunks(self.x.len().max(1))
    }

    /// Number of masked nodes.
    pub fn masked_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn percentile_matches_linear_rule() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&xs, 0.0), 1.0);
        assert_eq!(percentile(&xs, 100.0), 5.0);
        assert_eq!(percentile(&xs, 50.0), 3.0);
        assert_abs_diff_eq!(percentile(&xs, 5.0), 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&xs, 95.0), 4.8, epsilon = 1e-12);
        assert_eq!(percentile(&[7.0], 30.0), 7.0);
    }

    #[test]
    fn from_points_trims_x_and_spans_y() {
        let points: Vec<SurfacePoint> = (0..21)
            .map(|i| {
                let x = -1.0 + 0.1 * i as f64;
                let y = if i % 2 == 0 { 0.1 } else { 0.9 };
                SurfacePoint::new(x, y, 0.2)
            })
            .collect();
        let grid = Grid::from_points(&points, (5.0, 95.0), 80, 40).unwrap();
        assert_eq!(grid.x().len(), 80);
        assert_eq!(grid.y().len(), 40);
        assert_abs_diff_eq!(grid.x()[0], -0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.x()[79], 0.9, epsilon = 1e-12);
        assert_eq!(grid.y()[0], 0.1);
        assert_eq!(grid.y()[39], 0.9);
    }

    #[test]
    fn from_points_rejects_bad_input() {
        assert!(Grid::from_points(&[], (5.0, 95.0), 10, 10).is_err());
        let p = [SurfacePoint::new(0.0, 0.5, 0.2)];
        assert!(Grid::from_points(&p, (95.0, 5.0), 10, 10).is_err());
        assert!(Grid::from_points(&p, (-1.0, 95.0), 10, 10).is_err());
    }

    #[test]
    fn new_rejects_empty_and_non_finite_axes() {
        assert!(Grid::new(vec![], vec![0.5]).is_err());
        assert!(Grid::new(vec![0.0], vec![f64::NAN]).is_err());
        assert!(Grid::linspace((0.0, 1.0), (0.1, 1.0), 0, 3).is_err());
    }

    #[test]
    fn nodes_are_row_major() {
        let grid = Grid::new(vec![0.0, 1.0], vec![0.5, 1.5]).unwrap();
        let nodes: Vec<_> = grid.nodes().collect();
        assert_eq!(nodes, vec![(0.0, 0.5), (1.0, 0.5), (0.0, 1.5), (1.0, 1.5)]);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn vol_grid_accessors() {
        let vg = VolGrid {
            x: vec![0.0, 1.0, 2.0],
            y: vec![0.5, 1.0],
            values: vec![Some(0.1), None, Some(0.3), Some(0.4), Some(0.5), None],
        };
        assert_eq!(vg.get(0, 0), Some(0.1));
        assert_eq!(vg.get(1, 0), None);
        assert_eq!(vg.get(1, 1), Some(0.5));
        assert_eq!(vg.get(3, 0), None);
        assert_eq!(vg.masked_count(), 2);
        assert_eq!(vg.rows().count(), 2);
        assert_eq!(vg.rows().nth(1).unwrap(), &[Some(0.4), Some(0.5), None]);
    }

    #[test]
    fn short_values_read_as_masked() {
        let vg = VolGrid {
            x: vec![0.0, 1.0],
            y: vec![0.5, 1.0],
            values: vec![Some(0.2), Some(0.3)],
        };
        assert_eq!(vg.get(1, 0), Some(0.3));
        assert_eq!(vg.get(0, 1), None);
        assert_eq!(vg.get(1, 1), None);
    }
}
