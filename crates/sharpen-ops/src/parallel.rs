//! Thread-level accumulation using Rayon.
//!
//! Every thread of a pool computes its own slice of the cyclic partition
//! and the compact results are scatter-added into the process partial.
//! The padded grid and stencil are shared read-only; nothing is locked.
//!
//! # Example
//!
//! ```rust
//! use sharpen_core::Grid;
//! use sharpen_ops::{buffer::pad, kernel::Stencil, parallel, partition::Partition};
//!
//! let src = Grid::filled(32, 32, 7).unwrap();
//! let padded = pad(&src, 4).unwrap();
//! let stencil = Stencil::new(4).unwrap();
//! let pool = parallel::build_pool(4, "doc").unwrap();
//!
//! let mut conv: Grid<f64> = Grid::new(32, 32).unwrap();
//! parallel::accumulate_threads(&pool, &padded, &stencil, Partition::whole(), &mut conv).unwrap();
//! ```

use crate::accumulate::accumulate_owned;
use crate::buffer::pad;
use crate::combine::scatter_add;
use crate::kernel::Stencil;
use crate::partition::Partition;
use crate::postprocess::finish;
use crate::{OpsError, OpsResult};
use rayon::ThreadPool;
use sharpen_core::Grid;
use tracing::trace;

/// Builds a pool of `threads` workers named `{name}-t{index}`.
pub fn build_pool(threads: usize, name: &str) -> OpsResult<ThreadPool> {
    if threads == 0 {
        return Err(OpsError::InvalidParameter("thread count must be >= 1".into()));
    }
    let name = name.to_owned();
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |index| format!("{name}-t{index}"))
        .build()
        .map_err(|e| OpsError::InvalidParameter(format!("failed to build thread pool: {e}")))
}

/// Accumulates the pixels of `process` using every thread of `pool`.
///
/// Thread `t` of `T` works on `Partition::compose(process.id(),
/// process.count(), t, T)`. The result in `partial` is identical to a
/// single-threaded [`accumulate`](crate::accumulate::accumulate) over
/// `process`.
pub fn accumulate_threads(
    pool: &ThreadPool,
    padded: &Grid<f64>,
    stencil: &Stencil,
    process: Partition,
    partial: &mut Grid<f64>,
) -> OpsResult<()> {
    let results = pool.broadcast(|ctx| -> OpsResult<(Partition, Vec<f64>)> {
        let part = Partition::compose(process.id(), process.count(), ctx.index(), ctx.num_threads())?;
        trace!(%part, thread = ctx.index(), "thread accumulating");
        accumulate_owned(padded, stencil, part).map(|values| (part, values))
    });

    for result in results {
        let (part, values) = result?;
        scatter_add(partial, part, &values)?;
    }
    Ok(())
}

/// Multi-threaded [`sharpen_image`](crate::serial::sharpen_image).
pub fn sharpen_image(pool: &ThreadPool, source: &Grid<i32>, d: usize) -> OpsResult<Grid<f64>> {
    let stencil = Stencil::new(d)?;
    let padded = pad(source, d)?;
    let mut conv: Grid<f64> = Grid::new(source.rows(), source.cols())?;
    accumulate_threads(pool, &padded, &stencil, Partition::whole(), &mut conv)?;
    finish(&padded, &conv, d)
}
