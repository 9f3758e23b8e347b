//! Merging partial convolution buffers.
//!
//! Every pixel is written by exactly one worker and is zero everywhere
//! else, so summing partials reproduces the single-worker result exactly.

use crate::partition::Partition;
use crate::{OpsError, OpsResult};
use sharpen_core::Grid;

/// Adds `part` into `acc` element-wise.
pub fn sum_into(acc: &mut Grid<f64>, part: &Grid<f64>) -> OpsResult<()> {
    if !acc.same_shape(part) {
        return Err(OpsError::SizeMismatch(format!(
            "cannot add {}x{} partial into {}x{} buffer",
            part.rows(),
            part.cols(),
            acc.rows(),
            acc.cols()
        )));
    }
    for (a, &b) in acc.as_mut_slice().iter_mut().zip(part.as_slice()) {
        *a += b;
    }
    Ok(())
}

/// Adds a compact strided partial (see
/// [`accumulate_owned`](crate::accumulate::accumulate_owned)) into `grid`
/// at the positions owned by `partition`.
pub fn scatter_add(grid: &mut Grid<f64>, partition: Partition, values: &[f64]) -> OpsResult<()> {
    let total = grid.len();
    let expected = partition.owned_count(total);
    if values.len() != expected {
        return Err(OpsError::SizeMismatch(format!(
            "partition {partition} owns {expected} of {total} cells, got {} values",
            values.len()
        )));
    }
    let cells = grid.as_mut_slice();
    for (p, &v) in partition.owned(total).zip(values) {
        cells[p] += v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_into() {
        let mut a = Grid::from_vec(2, 2, vec![1.0, 0.0, 0.0, 4.0]).unwrap();
        let b = Grid::from_vec(2, 2, vec![0.0, 2.0, 3.0, 0.0]).unwrap();
        sum_into(&mut a, &b).unwrap();
        assert_eq!(a.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sum_into_shape_mismatch() {
        let mut a: Grid<f64> = Grid::new(2, 3).unwrap();
        let b: Grid<f64> = Grid::new(3, 2).unwrap();
        assert!(matches!(sum_into(&mut a, &b), Err(OpsError::SizeMismatch(_))));
    }

    #[test]
    fn test_scatter_add_strided() {
        let mut g: Grid<f64> = Grid::new(2, 5).unwrap();
        let part = Partition::new(1, 4).unwrap();
        scatter_add(&mut g, part, &[10.0, 50.0, 90.0]).unwrap();
        assert_eq!(
            g.as_slice(),
            &[0.0, 10.0, 0.0, 0.0, 0.0, 50.0, 0.0, 0.0, 0.0, 90.0]
        );
        assert!(scatter_add(&mut g, part, &[1.0]).is_err());
    }
}
