//! Multi-process transport: non-root ranks are child processes speaking
//! the [`wire`](crate::wire) protocol on their stdin/stdout.
//!
//! Children inherit stderr, so their logs interleave with the parent's
//! while stdout stays reserved for frames.

use super::{Communicator, Link, ROOT};
use crate::wire::{read_message, transport_error, write_message, Message};
use crate::{ComputeError, ComputeResult};
use std::io::{BufReader, BufWriter, Read, Write};
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// A link over a byte stream pair.
pub struct StreamLink<R: Read, W: Write> {
    peer: usize,
    reader: BufReader<R>,
    writer: BufWriter<W>,
}

impl<R: Read, W: Write> StreamLink<R, W> {
    pub fn new(reader: R, writer: W, peer: usize) -> Self {
        Self {
            peer,
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
        }
    }
}

impl<R: Read + Send, W: Write + Send> Link for StreamLink<R, W> {
    fn peer(&self) -> usize {
        self.peer
    }

    fn send(&mut self, msg: Message) -> ComputeResult<()> {
        write_message(&mut self.writer, &msg)
            .and_then(|()| self.writer.flush())
            .map_err(|e| transport_error(e, self.peer))
    }

    fn recv(&mut self) -> ComputeResult<Message> {
        read_message(&mut self.reader, self.peer)
    }
}

/// Child processes backing ranks `1..size`.
///
/// Dropping the group without [`wait`](Self::wait) kills any children
/// still running.
pub struct ProcessGroup {
    children: Vec<(usize, Child)>,
}

impl ProcessGroup {
    /// Spawns ranks `1..size` and returns the root communicator.
    ///
    /// `make_command(rank)` builds the command for one rank; its stdio is
    /// overridden here.
    pub fn spawn<F>(size: usize, mut make_command: F) -> ComputeResult<(Communicator, Self)>
    where
        F: FnMut(usize) -> Command,
    {
        let mut group = Self { children: Vec::new() };
        let mut links: Vec<Box<dyn Link>> = Vec::new();

        for rank in 1..size {
            let mut child = make_command(rank)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .spawn()?;
            debug!(rank, pid = child.id(), "spawned worker");

            let stdin = child.stdin.take();
            let stdout = child.stdout.take();
            group.children.push((rank, child));
            let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
                return Err(ComputeError::WorkerFailed(format!(
                    "rank {rank}: child stdio not captured"
                )));
            };
            links.push(Box::new(StreamLink::new(stdout, stdin, rank)));
        }

        let comm = Communicator::new(ROOT, size, links)?;
        Ok((comm, group))
    }

    /// Number of child processes.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Reaps every child; fails if any exited unsuccessfully.
    ///
    /// Drop the root communicator first so children blocked on a read see
    /// end-of-stream.
    pub fn wait(mut self) -> ComputeResult<()> {
        let mut failures = Vec::new();
        for (rank, mut child) in std::mem::take(&mut self.children) {
            let status = child.wait()?;
            if status.success() {
                debug!(rank, "worker exited");
            } else {
                warn!(rank, %status, "worker failed");
                failures.push(format!("rank {rank} exited with {status}"));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ComputeError::WorkerFailed(failures.join("; ")))
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        for (rank, child) in &mut self.children {
            if let Err(e) = child.kill() {
                debug!(rank = *rank, error = %e, "kill failed");
            }
            let _ = child.wait();
        }
    }
}
