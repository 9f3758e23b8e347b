//! Rank-to-rank communication.
//!
//! A [`Communicator`] knows its own rank, the group size, and a set of
//! [`Link`]s arranged as a star around rank [`ROOT`]:
//!
//! ```text
//!            rank 0 (root)
//!          /      |       \
//!     link 1   link 2 ... link P-1
//!        |        |          |
//!     rank 1   rank 2     rank P-1
//! ```
//!
//! The root holds `size - 1` links (index `r - 1` talks to rank `r`), every
//! other rank holds exactly one link to the root. Collectives are built
//! from blocking point-to-point sends on those links.
//!
//! Payloads are moved by value; a broadcast hands each receiver its own
//! copy.

mod local;
mod pipe;

pub use local::{local_group, ChannelLink};
pub use pipe::{ProcessGroup, StreamLink};

use crate::wire::Message;
use crate::{ComputeError, ComputeResult};
use sharpen_core::Grid;
use sharpen_ops::combine::sum_into;
use tracing::trace;

/// Rank that coordinates I/O and receives the reduction.
pub const ROOT: usize = 0;

/// A bidirectional, blocking message channel to one peer rank.
pub trait Link: Send {
    /// Rank at the other end.
    fn peer(&self) -> usize;

    /// Sends a message, taking ownership of its payload.
    fn send(&mut self, msg: Message) -> ComputeResult<()>;

    /// Blocks until the next message arrives.
    fn recv(&mut self) -> ComputeResult<Message>;
}

/// One rank's view of the group.
pub struct Communicator {
    rank: usize,
    size: usize,
    links: Vec<Box<dyn Link>>,
}

impl Communicator {
    /// Assembles a communicator from links.
    ///
    /// # Errors
    ///
    /// [`ComputeError::InvalidTopology`] if the rank is out of range or the
    /// number of links does not match the star layout.
    pub fn new(rank: usize, size: usize, links: Vec<Box<dyn Link>>) -> ComputeResult<Self> {
        if size == 0 || rank >= size {
            return Err(ComputeError::InvalidTopology(format!(
                "rank {rank} out of range for group of {size}"
            )));
        }
        let expected = if rank == ROOT { size - 1 } else { 1 };
        if links.len() != expected {
            return Err(ComputeError::InvalidTopology(format!(
                "rank {rank} of {size} needs {expected} link(s), got {}",
                links.len()
            )));
        }
        Ok(Self { rank, size, links })
    }

    /// A group of one.
    pub fn solo() -> Self {
        Self {
            rank: ROOT,
            size: 1,
            links: Vec::new(),
        }
    }

    /// A non-root rank talking to the root over this process's stdin/stdout.
    pub fn from_stdio(rank: usize, size: usize) -> ComputeResult<Self> {
        if rank == ROOT {
            return Err(ComputeError::InvalidTopology(
                "the root rank cannot run over stdio".into(),
            ));
        }
        let link = StreamLink::new(std::io::stdin(), std::io::stdout(), ROOT);
        Self::new(rank, size, vec![Box::new(link)])
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_root(&self) -> bool {
        self.rank == ROOT
    }

    /// Sends the image size from the root to every rank.
    ///
    /// The root passes `Some(dims)` after a successful read and `None`
    /// on failure, which is sent as `(0, 0)`. Other ranks pass `None`.
    pub fn broadcast_dims(&mut self, dims: Option<(usize, usize)>) -> ComputeResult<(usize, usize)> {
        if self.is_root() {
            let (nx, ny) = dims.unwrap_or((0, 0));
            for link in &mut self.links {
                link.send(Message::Dims(nx, ny))?;
            }
            Ok((nx, ny))
        } else {
            match self.recv_root()? {
                Message::Dims(nx, ny) => Ok((nx, ny)),
                other => Err(unexpected("dims", &other)),
            }
        }
    }

    /// Replicates the source image from the root to every rank.
    pub fn broadcast_image(&mut self, image: Option<Grid<i32>>) -> ComputeResult<Grid<i32>> {
        if self.is_root() {
            let image = image.ok_or_else(|| {
                ComputeError::Protocol("root must supply the image to broadcast".into())
            })?;
            for link in &mut self.links {
                link.send(Message::Image(image.clone()))?;
            }
            Ok(image)
        } else {
            match self.recv_root()? {
                Message::Image(grid) => Ok(grid),
                other => Err(unexpected("image", &other)),
            }
        }
    }

    /// Blocks until every rank has entered the barrier.
    pub fn barrier(&mut self) -> ComputeResult<()> {
        if self.is_root() {
            for link in &mut self.links {
                match link.recv()? {
                    Message::Barrier => {}
                    other => return Err(unexpected("barrier", &other)),
                }
            }
            for link in &mut self.links {
                link.send(Message::Barrier)?;
            }
        } else {
            let root = self.root_link()?;
            root.send(Message::Barrier)?;
            match root.recv()? {
                Message::Barrier => {}
                other => return Err(unexpected("barrier", &other)),
            }
        }
        trace!(rank = self.rank, "passed barrier");
        Ok(())
    }

    /// Element-wise sum of every rank's partial, delivered to the root.
    ///
    /// The root adds contributions in rank order and returns
    /// `Some(merged)`; every other rank returns `None`.
    pub fn reduce_sum(&mut self, partial: Grid<f64>) -> ComputeResult<Option<Grid<f64>>> {
        if self.is_root() {
            let mut acc = partial;
            for link in &mut self.links {
                match link.recv()? {
                    Message::Partial(part) => sum_into(&mut acc, &part)?,
                    other => return Err(unexpected("partial", &other)),
                }
            }
            Ok(Some(acc))
        } else {
            self.root_link()?.send(Message::Partial(partial))?;
            Ok(None)
        }
    }

    fn root_link(&mut self) -> ComputeResult<&mut Box<dyn Link>> {
        self.links
            .first_mut()
            .ok_or_else(|| ComputeError::Protocol("no link to the root".into()))
    }

    fn recv_root(&mut self) -> ComputeResult<Message> {
        self.root_link()?.recv()
    }
}

impl std::fmt::Debug for Communicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .field("links", &self.links.len())
            .finish()
    }
}

fn unexpected(expected: &str, got: &Message) -> ComputeError {
    ComputeError::Protocol(format!("expected {expected} message, got {}", got.kind()))
}
