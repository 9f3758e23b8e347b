//! Hidden worker command: one non-root rank of a `run --spawn`.
//!
//! Frames go over stdin/stdout, so nothing else may be printed to stdout.

use crate::WorkerArgs;
use anyhow::{Context, Result};
use sharpen_compute::engine::{run_worker, EngineConfig};
use tracing::debug;

pub fn run(args: WorkerArgs) -> Result<()> {
    debug!(rank = args.rank, size = args.size, threads = args.threads, "worker starting");
    let config = EngineConfig::new(args.radius, args.threads)?;
    run_worker(args.rank, args.size, &config)
        .with_context(|| format!("Worker rank {} of {} failed", args.rank, args.size))
}
