//! Worker topology.
//!
//! A run uses `procs` ranks of `threads` threads each, giving
//! `procs * threads` workers in one flat id space
//! (`g = rank * threads + thread`).

use crate::{ComputeError, ComputeResult};
use std::fmt;

/// Shape of a run, derived from the worker counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyKind {
    /// One rank, one thread.
    Serial,
    /// One rank, several threads.
    Threads,
    /// Several ranks, one thread each.
    Processes,
    /// Several ranks of several threads.
    Hybrid,
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Serial => "serial",
            Self::Threads => "threads",
            Self::Processes => "processes",
            Self::Hybrid => "hybrid",
        })
    }
}

/// Ranks x threads-per-rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    procs: usize,
    threads: usize,
}

impl Topology {
    /// Creates a topology of `procs` ranks with `threads` threads each.
    pub fn new(procs: usize, threads: usize) -> ComputeResult<Self> {
        if procs == 0 || threads == 0 {
            return Err(ComputeError::InvalidTopology(format!(
                "{procs} process(es) x {threads} thread(s): both must be >= 1"
            )));
        }
        if procs.checked_mul(threads).is_none() {
            return Err(ComputeError::InvalidTopology("worker count overflows".into()));
        }
        Ok(Self { procs, threads })
    }

    /// One rank, one thread.
    pub const fn serial() -> Self {
        Self { procs: 1, threads: 1 }
    }

    /// Number of ranks.
    pub fn procs(&self) -> usize {
        self.procs
    }

    /// Threads per rank.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Total worker count `G`.
    pub fn workers(&self) -> usize {
        self.procs * self.threads
    }

    pub fn kind(&self) -> TopologyKind {
        match (self.procs > 1, self.threads > 1) {
            (false, false) => TopologyKind::Serial,
            (false, true) => TopologyKind::Threads,
            (true, false) => TopologyKind::Processes,
            (true, true) => TopologyKind::Hybrid,
        }
    }

    /// Flat id of thread `thread` in rank `rank`.
    pub fn worker_id(&self, rank: usize, thread: usize) -> usize {
        rank * self.threads + thread
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::serial()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} ({})", self.procs, self.threads, self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Topology::serial().kind(), TopologyKind::Serial);
        assert_eq!(Topology::new(1, 4).unwrap().kind(), TopologyKind::Threads);
        assert_eq!(Topology::new(4, 1).unwrap().kind(), TopologyKind::Processes);
        assert_eq!(Topology::new(2, 2).unwrap().kind(), TopologyKind::Hybrid);
    }

    #[test]
    fn test_rejects_zero() {
        assert!(Topology::new(0, 1).is_err());
        assert!(Topology::new(1, 0).is_err());
    }

    #[test]
    fn test_worker_ids() {
        let t = Topology::new(3, 2).unwrap();
        assert_eq!(t.workers(), 6);
        assert_eq!(t.worker_id(2, 1), 5);
        assert_eq!(t.to_string(), "3x2 (hybrid)");
    }
}
