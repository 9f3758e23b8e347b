//! Sharpen command.
//!
//! Reads the input on the root rank, runs the engine on the requested
//! topology, writes the cropped result.

use crate::logging::Verbosity;
use crate::RunArgs;
use anyhow::{Context, Result};
use sharpen_compute::engine::{sharpen_local, sharpen_spawned};
use sharpen_compute::{PgmSource, Topology};
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info};

pub fn run(args: RunArgs, verbosity: Verbosity) -> Result<()> {
    let start = Instant::now();
    let threads = super::resolve_threads(args.threads);
    let topology = Topology::new(args.procs, threads)?;

    info!(
        "Image sharpening code running on {} process(es) x {} thread(s)",
        topology.procs(),
        topology.threads()
    );
    info!("Input file is: {}", args.input.display());

    let (nx, ny) = sharpen_io::probe_size(&args.input)
        .with_context(|| format!("Error reading {}", args.input.display()))?;
    info!("Image size is {} x {}", nx, ny);

    let source = PgmSource::new(&args.input);
    let report = if args.spawn && topology.procs() > 1 {
        let exe = std::env::current_exe().context("Cannot locate the sharpen executable")?;
        debug!(exe = %exe.display(), "spawning workers");
        sharpen_spawned(topology, source, args.radius, |rank| {
            worker_command(&exe, rank, topology, args.radius, verbosity)
        })
    } else {
        sharpen_local(topology, source, args.radius)
    }
    .with_context(|| format!("Failed to sharpen {}", args.input.display()))?;

    info!("Writing output file: {}", args.output.display());
    super::save_image(&args.output, &report.image)?;

    println!(
        "{} ({}x{}) -> {} ({}x{})  [{}, calc {:.3}s]",
        args.input.display(),
        nx,
        ny,
        args.output.display(),
        report.image.rows(),
        report.image.cols(),
        report.topology,
        report.calc_time.as_secs_f64()
    );
    info!("Overall run time was {:.6} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

/// Command line for child rank `rank`.
fn worker_command(exe: &Path, rank: usize, topology: Topology, radius: usize, verbosity: Verbosity) -> Command {
    let mut cmd = Command::new(exe);
    cmd.args(verbosity.to_args())
        .arg("worker")
        .arg("--rank")
        .arg(rank.to_string())
        .arg("--size")
        .arg(topology.procs().to_string())
        .arg("--threads")
        .arg(topology.threads().to_string())
        .arg("--radius")
        .arg(radius.to_string());
    cmd
}
