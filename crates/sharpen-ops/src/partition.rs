//! Cyclic work partitioning.
//!
//! Pixels are numbered row-major (`p = i * ny + j`) and dealt out like
//! cards: worker `id` of `count` owns every pixel with `p % count == id`.
//! Consecutive pixels land on different workers, which evens out the cost
//! of border pixels without any cost model.
//!
//! Process and thread levels collapse into one flat id space with
//! [`Partition::compose`], so the accumulator only ever sees a single
//! `(id, count)` pair.

use crate::{OpsError, OpsResult};

/// One worker's share of a cyclic partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    id: usize,
    count: usize,
}

impl Partition {
    /// Creates a partition for worker `id` of `count`.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] unless `count >= 1` and `id < count`.
    pub fn new(id: usize, count: usize) -> OpsResult<Self> {
        if count == 0 {
            return Err(OpsError::InvalidParameter("worker count must be >= 1".into()));
        }
        if id >= count {
            return Err(OpsError::InvalidParameter(format!(
                "worker id {id} out of range for {count} workers"
            )));
        }
        Ok(Self { id, count })
    }

    /// The single partition of a one-worker run (owns everything).
    pub const fn whole() -> Self {
        Self { id: 0, count: 1 }
    }

    /// Flattens a two-level topology.
    ///
    /// Thread `level2_id` of `level2_count` inside process `level1_id` of
    /// `level1_count` becomes global worker
    /// `level1_id * level2_count + level2_id` of
    /// `level1_count * level2_count`.
    pub fn compose(
        level1_id: usize,
        level1_count: usize,
        level2_id: usize,
        level2_count: usize,
    ) -> OpsResult<Self> {
        Self::new(level1_id, level1_count)?;
        Self::new(level2_id, level2_count)?;
        let count = level1_count
            .checked_mul(level2_count)
            .ok_or_else(|| OpsError::InvalidParameter("worker count overflows".into()))?;
        Self::new(level1_id * level2_count + level2_id, count)
    }

    /// Global worker id.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Global worker count.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// `true` if flat pixel index `p` belongs to this worker.
    #[inline]
    pub fn owns(&self, p: usize) -> bool {
        p % self.count == self.id
    }

    /// Owned flat indices below `total`, ascending.
    pub fn owned(&self, total: usize) -> impl Iterator<Item = usize> + use<> {
        (self.id..total).step_by(self.count)
    }

    /// Number of owned indices below `total`.
    pub fn owned_count(&self, total: usize) -> usize {
        if self.id >= total {
            0
        } else {
            (total - self.id).div_ceil(self.count)
        }
    }
}

impl Default for Partition {
    fn default() -> Self {
        Self::whole()
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.id, self.count)
    }
}
