//! Parallel execution of the sharpen pipeline.
//!
//! Work is split over *ranks* (separate address spaces, each with its own
//! copy of every grid) and over *threads* inside a rank (sharing the
//! rank's read-only padded image).
//!
//! # Architecture
//!
//! ```text
//! engine::run_rank (one per rank)
//!     ├── Communicator (broadcast / barrier / reduce)
//!     │       └── Link trait
//!     │               ├── ChannelLink (ranks on threads, mpsc)
//!     │               └── StreamLink  (ranks in child processes, pipes)
//!     └── rayon pool (threads of the rank)
//!             └── sharpen_ops::parallel::accumulate_threads
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sharpen_compute::{engine, source::MemorySource, Topology};
//!
//! let topo = Topology::new(2, 4)?;
//! let report = engine::sharpen_local(topo, MemorySource::new(image), 8)?;
//! println!("{}x{}", report.image.rows(), report.image.cols());
//! ```

pub mod comm;
pub mod engine;
pub mod placement;
pub mod source;
pub mod topology;
pub mod wire;

pub use comm::{Communicator, Link, ROOT};
pub use engine::{EngineConfig, RunReport};
pub use source::{ImageSource, MemorySource};
pub use topology::{Topology, TopologyKind};

#[cfg(feature = "io")]
pub use source::PgmSource;

use thiserror::Error;

/// Worker and communication errors
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Peer rank {peer} disconnected")]
    Disconnected { peer: usize },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Input rejected on rank {rank}: {reason}")]
    InputRejected { rank: usize, reason: String },

    #[error("Worker failed: {0}")]
    WorkerFailed(String),

    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ops(#[from] sharpen_ops::OpsError),

    #[error(transparent)]
    Core(#[from] sharpen_core::Error),

    #[cfg(feature = "io")]
    #[error(transparent)]
    Image(#[from] sharpen_io::IoError),
}

impl ComputeError {
    /// `true` if this error only reflects a failure elsewhere in the group.
    pub fn is_secondary(&self) -> bool {
        matches!(self, Self::Disconnected { .. } | Self::InputRejected { .. })
    }
}

pub type ComputeResult<T> = Result<T, ComputeError>;
