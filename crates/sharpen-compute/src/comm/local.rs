//! In-process transport: ranks on threads, links over mpsc channels.

use super::{Communicator, Link, ROOT};
use crate::wire::Message;
use crate::{ComputeError, ComputeResult};
use std::sync::mpsc::{channel, Receiver, Sender};

/// One end of a channel pair.
pub struct ChannelLink {
    peer: usize,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl ChannelLink {
    /// Two connected ends: the first belongs to `a`, the second to `b`.
    pub fn pair(a: usize, b: usize) -> (Self, Self) {
        let (tx_ab, rx_ab) = channel();
        let (tx_ba, rx_ba) = channel();
        (
            Self { peer: b, tx: tx_ab, rx: rx_ba },
            Self { peer: a, tx: tx_ba, rx: rx_ab },
        )
    }
}

impl Link for ChannelLink {
    fn peer(&self) -> usize {
        self.peer
    }

    fn send(&mut self, msg: Message) -> ComputeResult<()> {
        self.tx
            .send(msg)
            .map_err(|_| ComputeError::Disconnected { peer: self.peer })
    }

    fn recv(&mut self) -> ComputeResult<Message> {
        self.rx
            .recv()
            .map_err(|_| ComputeError::Disconnected { peer: self.peer })
    }
}

/// Communicators for a group of `size` ranks, indexed by rank.
///
/// Each communicator is meant to be moved onto its own thread. Dropping
/// one disconnects it from the root, so peers blocked on it fail instead
/// of hanging.
pub fn local_group(size: usize) -> ComputeResult<Vec<Communicator>> {
    if size == 0 {
        return Err(ComputeError::InvalidTopology("group size must be >= 1".into()));
    }

    let mut root_links: Vec<Box<dyn Link>> = Vec::with_capacity(size - 1);
    let mut others = Vec::with_capacity(size - 1);
    for rank in 1..size {
        let (at_root, at_rank) = ChannelLink::pair(ROOT, rank);
        root_links.push(Box::new(at_root));
        others.push(Communicator::new(rank, size, vec![Box::new(at_rank)])?);
    }

    let mut group = Vec::with_capacity(size);
    group.push(Communicator::new(ROOT, size, root_links)?);
    group.extend(others);
    Ok(group)
}
