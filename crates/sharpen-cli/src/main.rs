//! sharpen - parallel unsharp-mask sharpening for PGM images
//!
//! Runs the same stencil computation serially, on threads, on ranks in
//! separate processes, or on both.

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use sharpen_ops::RADIUS;
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "sharpen")]
#[command(author, version, about = "Parallel unsharp-mask sharpening for PGM images")]
#[command(long_about = "
Sharpens a plain-text PGM (P2) image with a fixed radial unsharp-mask
filter. The work is split cyclically over processes and threads; every
topology produces the same output.

Examples:
  sharpen run                           # fuzzy.pgm -> sharpened.pgm, serial
  sharpen run in.pgm -o out.pgm -t 8    # 8 threads
  sharpen run in.pgm -n 4               # 4 ranks on threads of this process
  sharpen run in.pgm -n 4 -t 2 --spawn  # 4 worker processes x 2 threads
  sharpen info in.pgm                   # Show image size
  sharpen diff a.pgm b.pgm              # Compare two results
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sharpen an image
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Display image size and sample range
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Compare two images
    #[command(visible_alias = "d")]
    Diff(DiffArgs),

    /// Internal: one rank of a --spawn run, talking on stdin/stdout
    #[command(hide = true)]
    Worker(WorkerArgs),
}

/// Arguments for the `run` command.
#[derive(Args)]
struct RunArgs {
    /// Input image
    #[arg(default_value = "fuzzy.pgm")]
    input: PathBuf,

    /// Output image
    #[arg(short, long, default_value = "sharpened.pgm")]
    output: PathBuf,

    /// Number of ranks
    #[arg(short = 'n', long, env = "SHARPEN_PROCS", default_value_t = 1)]
    procs: usize,

    /// Threads per rank (0 = all cores)
    #[arg(short = 't', long, env = "SHARPEN_THREADS", default_value_t = 1)]
    threads: usize,

    /// Filter radius d (stencil is (2d+1) x (2d+1))
    #[arg(short = 'd', long, default_value_t = RADIUS)]
    radius: usize,

    /// Run ranks 1.. as child processes instead of threads
    #[arg(long)]
    spawn: bool,
}

/// Arguments for the `info` command.
#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Filter radius used to report the output size
    #[arg(short = 'd', long, default_value_t = RADIUS)]
    radius: usize,
}

/// Arguments for the `diff` command.
#[derive(Args)]
struct DiffArgs {
    /// First image
    a: PathBuf,

    /// Second image
    b: PathBuf,

    /// Fail if the max difference exceeds this
    #[arg(short, long, default_value = "0")]
    threshold: f64,
}

/// Arguments for the hidden `worker` command.
#[derive(Args)]
struct WorkerArgs {
    #[arg(long)]
    rank: usize,

    #[arg(long)]
    size: usize,

    #[arg(long, default_value_t = 1)]
    threads: usize,

    #[arg(long, default_value_t = RADIUS)]
    radius: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = logging::Verbosity::new(cli.verbose, cli.quiet);
    let _guard = logging::init(verbosity, cli.log.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run::run(args, verbosity),
        Commands::Info(args) => commands::info::run(args),
        Commands::Diff(args) => commands::diff::run(args),
        Commands::Worker(args) => commands::worker::run(args),
    }
}
