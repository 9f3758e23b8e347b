//! Per-rank sharpening engine.
//!
//! Every rank runs [`run_rank`]; the root additionally reads the image
//! and ends up with the cropped result.
//!
//! ```text
//! root: load ─┐
//!             ├─ broadcast dims ─ check ─ broadcast image ─ pad ─ barrier
//! all ranks ──┘
//!   ─ accumulate (rank's threads) ─ barrier ─ reduce ─ root: sharpen + crop
//! ```
//!
//! The root always broadcasts the image size, `(0, 0)` when reading
//! failed, so every rank leaves at the same point instead of waiting on
//! a collective that will never complete.

use crate::comm::{local_group, Communicator, ProcessGroup};
use crate::placement::Placement;
use crate::source::ImageSource;
use crate::topology::Topology;
use crate::{ComputeError, ComputeResult};
use sharpen_core::Grid;
use sharpen_ops::buffer::{check_dims, pad};
use sharpen_ops::parallel::{accumulate_threads, build_pool};
use sharpen_ops::postprocess::finish;
use sharpen_ops::kernel::stencil_width;
use sharpen_ops::{Partition, Stencil, RADIUS};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Per-rank settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Filter radius `d`.
    pub radius: usize,
    /// Threads per rank.
    pub threads: usize,
}

impl EngineConfig {
    /// Validated settings.
    ///
    /// # Errors
    ///
    /// [`sharpen_ops::OpsError::InvalidParameter`] for a zero radius or one
    /// whose stencil width `2d + 1` does not fit in `usize`;
    /// [`ComputeError::InvalidTopology`] for zero threads.
    pub fn new(radius: usize, threads: usize) -> ComputeResult<Self> {
        stencil_width(radius)?;
        if threads == 0 {
            return Err(ComputeError::InvalidTopology("thread count must be >= 1".into()));
        }
        Ok(Self { radius, threads })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { radius: RADIUS, threads: 1 }
    }
}

/// What the root gets back.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Cropped `(nx-2d) × (ny-2d)` sharpened image.
    pub image: Grid<f64>,
    /// Wall-clock time between the two calculation barriers.
    pub calc_time: Duration,
    pub topology: Topology,
}

/// Runs one rank of the pipeline.
///
/// `source` is read only on the root and must be `Some` there. Returns
/// `Some(report)` on the root and `None` elsewhere.
pub fn run_rank(
    comm: &mut Communicator,
    source: Option<&mut dyn ImageSource>,
    config: &EngineConfig,
) -> ComputeResult<Option<RunReport>> {
    let (rank, size) = (comm.rank(), comm.size());
    let d = config.radius;
    let topology = Topology::new(size, config.threads)?;

    let mut loaded = None;
    let mut failure = None;
    if comm.is_root() {
        info!(%topology, "Image sharpening running on {} worker(s)", topology.workers());
        info!("Using a filter of size {0} x {0}", d.saturating_mul(2).saturating_add(1));
        match source {
            Some(src) => {
                info!(input = %src.describe(), "Reading image file");
                match src.load_checked() {
                    Ok(image) => {
                        info!(nx = image.rows(), ny = image.cols(), "Image read");
                        loaded = Some(image);
                    }
                    Err(e) => failure = Some(e),
                }
            }
            None => {
                failure = Some(ComputeError::Protocol("root rank needs an image source".into()));
            }
        }
    }

    let (nx, ny) = comm.broadcast_dims(loaded.as_ref().map(Grid::dims))?;
    if let Some(e) = failure {
        error!(error = %e, "Error reading image");
        return Err(e);
    }
    if nx == 0 || ny == 0 {
        let reason = "coordinator failed to read the image";
        error!(rank, "Input rejected on rank {rank}: {reason}");
        return Err(ComputeError::InputRejected {
            rank,
            reason: reason.into(),
        });
    }
    if let Err(e) = check_dims(nx, ny, d) {
        error!(rank, "Image rejected on rank {rank}: {e}");
        return Err(e.into());
    }

    let image = comm.broadcast_image(loaded)?;
    if image.dims() != (nx, ny) {
        return Err(ComputeError::Protocol(format!(
            "received {}x{} image after announcing {nx}x{ny}",
            image.rows(),
            image.cols()
        )));
    }
    let stencil = Stencil::new(d)?;
    let padded = pad(&image, d)?;
    drop(image);

    if comm.is_root() {
        info!("Starting calculation ...");
    }
    comm.barrier()?;

    let pool = build_pool(config.threads, &format!("sharpen-r{rank}"))?;
    pool.broadcast(|ctx| {
        let placement = Placement::current(rank, size, ctx.index(), ctx.num_threads());
        info!(worker = topology.worker_id(rank, ctx.index()), "{placement}");
    });

    let start = Instant::now();
    let mut partial: Grid<f64> = Grid::new(nx, ny)?;
    accumulate_threads(&pool, &padded, &stencil, Partition::new(rank, size)?, &mut partial)?;
    debug!(rank, "partial done");
    comm.barrier()?;
    let calc_time = start.elapsed();

    let Some(conv) = comm.reduce_sum(partial)? else {
        return Ok(None);
    };
    info!("... finished");

    let image = finish(&padded, &conv, d)?;
    info!(secs = calc_time.as_secs_f64(), "Calculation time was {:.6} seconds", calc_time.as_secs_f64());
    Ok(Some(RunReport {
        image,
        calc_time,
        topology,
    }))
}

/// Runs a whole group inside this process, one OS thread per rank.
///
/// The calling thread acts as the root.
pub fn sharpen_local<S: ImageSource>(
    topology: Topology,
    mut source: S,
    radius: usize,
) -> ComputeResult<RunReport> {
    let config = EngineConfig::new(radius, topology.threads())?;
    let mut comms = local_group(topology.procs())?.into_iter();
    let mut root = comms
        .next()
        .ok_or_else(|| ComputeError::InvalidTopology("empty group".into()))?;

    thread::scope(|scope| {
        let mut handles = Vec::new();
        for mut comm in comms {
            let config = &config;
            let handle = thread::Builder::new()
                .name(format!("sharpen-rank{}", comm.rank()))
                .spawn_scoped(scope, move || run_rank(&mut comm, None, config))?;
            handles.push(handle);
        }

        let source: &mut dyn ImageSource = &mut source;
        let result = run_rank(&mut root, Some(source), &config);
        drop(root);

        let mut worker_errors = Vec::new();
        for handle in handles {
            match handle.join() {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => worker_errors.push(e),
                Err(_) => worker_errors.push(ComputeError::WorkerFailed("rank thread panicked".into())),
            }
        }
        settle(result, worker_errors)
    })
}

/// Runs the root here and ranks `1..procs` as child processes.
///
/// `make_command(rank)` must start a process that calls [`run_worker`]
/// with the same rank, group size and config.
pub fn sharpen_spawned<S, F>(
    topology: Topology,
    mut source: S,
    radius: usize,
    make_command: F,
) -> ComputeResult<RunReport>
where
    S: ImageSource,
    F: FnMut(usize) -> Command,
{
    let config = EngineConfig::new(radius, topology.threads())?;
    let (mut comm, group) = ProcessGroup::spawn(topology.procs(), make_command)?;

    let source: &mut dyn ImageSource = &mut source;
    let result = run_rank(&mut comm, Some(source), &config);
    drop(comm);

    let worker_errors = group.wait().err().into_iter().collect();
    settle(result, worker_errors)
}

/// Entry point of a child process started by [`sharpen_spawned`].
pub fn run_worker(rank: usize, size: usize, config: &EngineConfig) -> ComputeResult<()> {
    let mut comm = Communicator::from_stdio(rank, size)?;
    run_rank(&mut comm, None, config)?;
    debug!(rank, "worker done");
    Ok(())
}

/// Picks the error that explains a failed run: the root's own failure
/// unless it only reflects a worker going away.
fn settle(
    root: ComputeResult<Option<RunReport>>,
    worker_errors: Vec<ComputeError>,
) -> ComputeResult<RunReport> {
    for e in &worker_errors {
        debug!(error = %e, "worker rank failed");
    }
    match root {
        Ok(Some(report)) => match worker_errors.into_iter().next() {
            None => Ok(report),
            Some(e) => Err(e),
        },
        Ok(None) => Err(ComputeError::Protocol("root rank produced no result".into())),
        Err(e) if e.is_secondary() => Err(worker_errors
            .into_iter()
            .find(|w| !w.is_secondary())
            .unwrap_or(e)),
        Err(e) => Err(e),
    }
}
