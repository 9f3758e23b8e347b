//! Contiguous 2D grid buffer.
//!
//! [`Grid`] is the single buffer type the sharpening pipeline works with:
//! the source image, the padded image, partial and merged convolution
//! buffers, and the cropped output are all grids.
//!
//! # Memory Layout
//!
//! Cells are stored in **row-major** order in one `Vec<T>`:
//!
//! ```text
//! Memory: [c(0,0) c(0,1) ... c(0,cols-1)]  <- row 0
//!         [c(1,0) c(1,1) ... c(1,cols-1)]  <- row 1
//!         ...
//! ```
//!
//! so `grid[(i, j)]` lives at flat index `i * cols + j`. That flat index is
//! also the pixel number the work partitioner hands out.
//!
//! # Usage
//!
//! ```rust
//! use sharpen_core::Grid;
//!
//! let mut g: Grid<f64> = Grid::new(4, 3).unwrap();
//! g[(2, 1)] = 5.0;
//! assert_eq!(g.row(2), &[0.0, 5.0, 0.0]);
//! assert_eq!(g.as_slice()[2 * 3 + 1], 5.0);
//! ```

use crate::{Error, Result};
use std::ops::{Index, IndexMut};

/// Owned, contiguous, row-major 2D buffer.
///
/// Allocation is fallible: every constructor reserves its storage with
/// [`Vec::try_reserve_exact`] and reports [`Error::AllocationFailed`]
/// rather than aborting the process.
#[derive(Clone, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a grid filled with `T::default()` (zero for numbers).
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, T::default())
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Result<Self> {
        let len = checked_len::<T>(rows, cols)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::allocation_failed(len * std::mem::size_of::<T>(), e.to_string()))?;
        data.resize(len, value);
        Ok(Self { data, rows, cols })
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid<T> {
    /// Wraps an existing row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != rows * cols`
    /// or either dimension is zero.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        let len = checked_len::<T>(rows, cols)?;
        if data.len() != len {
            return Err(Error::invalid_dimensions(
                rows,
                cols,
                format!("buffer holds {} cells, expected {}", data.len(), len),
            ));
        }
        Ok(Self { data, rows, cols })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: zero-sized grids cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One row as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// One row as a mutable slice.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Iterator over rows.
    pub fn iter_rows(&self) -> std::slice::Chunks<'_, T> {
        self.data.chunks(self.cols)
    }

    /// The whole buffer in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The whole buffer in row-major order, mutable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// `true` if `other` has the same `(rows, cols)`.
    #[inline]
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.dims() == other.dims()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        debug_assert!(col < self.cols, "column {col} out of range {}", self.cols);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        debug_assert!(col < self.cols, "column {col} out of range {}", self.cols);
        &mut self.data[row * self.cols + col]
    }
}

impl<T> std::fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("size_bytes", &(self.data.len() * std::mem::size_of::<T>()))
            .finish()
    }
}

fn checked_len<T>(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(Error::invalid_dimensions(rows, cols, "dimensions must be > 0"));
    }
    rows.checked_mul(cols)
        .filter(|len| len.checked_mul(std::mem::size_of::<T>()).is_some_and(|b| b <= isize::MAX as usize))
        .ok_or_else(|| Error::invalid_dimensions(rows, cols, "size calculation overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_new_is_zeroed() {
        let g: Grid<f64> = Grid::new(5, 7).unwrap();
        assert_eq!(g.dims(), (5, 7));
        assert_eq!(g.len(), 35);
        assert!(g.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_grid_row_major_layout() {
        let g = Grid::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(g[(0, 2)], 3);
        assert_eq!(g[(1, 0)], 4);
        assert_eq!(g.row(1), &[4, 5, 6]);
        assert_eq!(g.as_slice()[5], 6);
        assert_eq!(g.iter_rows().count(), 2);
    }

    #[test]
    fn test_grid_index_mut() {
        let mut g: Grid<i32> = Grid::new(3, 3).unwrap();
        g[(1, 1)] = 9;
        g.row_mut(2)[0] = 7;
        assert_eq!(g.as_slice(), &[0, 0, 0, 0, 9, 0, 7, 0, 0]);
    }

    #[test]
    fn test_grid_rejects_bad_shapes() {
        assert!(Grid::<f64>::new(0, 4).is_err());
        assert!(Grid::from_vec(2, 2, vec![1.0, 2.0, 3.0]).is_err());
        assert!(Grid::<f64>::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_grid_shape_check() {
        let a: Grid<f64> = Grid::new(4, 4).unwrap();
        let b: Grid<i32> = Grid::new(4, 4).unwrap();
        let c: Grid<f64> = Grid::new(4, 5).unwrap();
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn test_grid_fill() {
        let mut g: Grid<f64> = Grid::new(2, 2).unwrap();
        g.fill(0.5);
        approx::assert_relative_eq!(g.as_slice().iter().sum::<f64>(), 2.0);
    }
}
