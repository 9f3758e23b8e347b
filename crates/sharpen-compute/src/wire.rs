//! Binary framing for messages between ranks in separate processes.
//!
//! All integers are little-endian. Every frame starts with a one-byte tag:
//!
//! | Tag | Message | Body |
//! |-----|---------|------|
//! | 1 | `Dims` | `u64 nx`, `u64 ny` |
//! | 2 | `Image` | `u64 nx`, `u64 ny`, `nx*ny` x `i32` |
//! | 3 | `Barrier` | (empty) |
//! | 4 | `Partial` | `u64 nx`, `u64 ny`, `nx*ny` x `f64` |
//!
//! Grids travel in row-major order.

use crate::{ComputeError, ComputeResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use sharpen_core::Grid;
use std::io::{self, Read, Write};

const TAG_DIMS: u8 = 1;
const TAG_IMAGE: u8 = 2;
const TAG_BARRIER: u8 = 3;
const TAG_PARTIAL: u8 = 4;

/// A message exchanged between ranks.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Image size `(nx, ny)`; `(0, 0)` signals a failed read.
    Dims(usize, usize),
    /// The source image.
    Image(Grid<i32>),
    /// Synchronisation token.
    Barrier,
    /// A rank's partial convolution.
    Partial(Grid<f64>),
}

impl Message {
    /// Short name for logs and protocol errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dims(..) => "dims",
            Self::Image(_) => "image",
            Self::Barrier => "barrier",
            Self::Partial(_) => "partial",
        }
    }
}

/// Encodes one message.
pub fn write_message<W: Write>(w: &mut W, msg: &Message) -> io::Result<()> {
    match msg {
        Message::Dims(nx, ny) => {
            w.write_u8(TAG_DIMS)?;
            write_dims(w, *nx, *ny)?;
        }
        Message::Image(grid) => {
            w.write_u8(TAG_IMAGE)?;
            write_dims(w, grid.rows(), grid.cols())?;
            for &v in grid.as_slice() {
                w.write_i32::<LittleEndian>(v)?;
            }
        }
        Message::Barrier => w.write_u8(TAG_BARRIER)?,
        Message::Partial(grid) => {
            w.write_u8(TAG_PARTIAL)?;
            write_dims(w, grid.rows(), grid.cols())?;
            for &v in grid.as_slice() {
                w.write_f64::<LittleEndian>(v)?;
            }
        }
    }
    Ok(())
}

/// Decodes one message sent by rank `peer`.
///
/// End of stream (before or inside a frame) is reported as
/// [`ComputeError::Disconnected`].
pub fn read_message<R: Read>(r: &mut R, peer: usize) -> ComputeResult<Message> {
    let disconnected = |e: io::Error| transport_error(e, peer);

    let tag = r.read_u8().map_err(disconnected)?;
    match tag {
        TAG_DIMS => {
            let (nx, ny) = read_dims(r).map_err(disconnected)?;
            Ok(Message::Dims(nx, ny))
        }
        TAG_IMAGE => {
            let (nx, ny) = read_dims(r).map_err(disconnected)?;
            let mut grid: Grid<i32> = Grid::new(nx, ny)?;
            r.read_i32_into::<LittleEndian>(grid.as_mut_slice())
                .map_err(disconnected)?;
            Ok(Message::Image(grid))
        }
        TAG_BARRIER => Ok(Message::Barrier),
        TAG_PARTIAL => {
            let (nx, ny) = read_dims(r).map_err(disconnected)?;
            let mut grid: Grid<f64> = Grid::new(nx, ny)?;
            r.read_f64_into::<LittleEndian>(grid.as_mut_slice())
                .map_err(disconnected)?;
            Ok(Message::Partial(grid))
        }
        other => Err(ComputeError::Protocol(format!(
            "unknown message tag {other} from rank {peer}"
        ))),
    }
}

/// Maps a closed stream to [`ComputeError::Disconnected`].
pub fn transport_error(e: io::Error, peer: usize) -> ComputeError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset => {
            ComputeError::Disconnected { peer }
        }
        _ => ComputeError::Io(e),
    }
}

fn write_dims<W: Write>(w: &mut W, nx: usize, ny: usize) -> io::Result<()> {
    w.write_u64::<LittleEndian>(nx as u64)?;
    w.write_u64::<LittleEndian>(ny as u64)
}

fn read_dims<R: Read>(r: &mut R) -> io::Result<(usize, usize)> {
    let nx = r.read_u64::<LittleEndian>()?;
    let ny = r.read_u64::<LittleEndian>()?;
    let conv = |v: u64| {
        usize::try_from(v).map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "dimension exceeds usize"))
    };
    Ok((conv(nx)?, conv(ny)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frames_in_sequence() {
        let image = Grid::from_vec(2, 3, vec![1, -2, 3, 4, 5, 600]).unwrap();
        let partial = Grid::from_vec(1, 2, vec![0.5, -1.25e-7]).unwrap();
        let msgs = [
            Message::Dims(640, 480),
            Message::Image(image),
            Message::Barrier,
            Message::Partial(partial),
            Message::Dims(0, 0),
        ];

        let mut buf = Vec::new();
        for m in &msgs {
            write_message(&mut buf, m).unwrap();
        }
        // tag + 2 u64 + 6 i32
        assert_eq!(buf[17], TAG_IMAGE);

        let mut cursor = Cursor::new(buf);
        for m in &msgs {
            assert_eq!(&read_message(&mut cursor, 1).unwrap(), m);
        }
        assert!(matches!(
            read_message(&mut cursor, 1),
            Err(ComputeError::Disconnected { peer: 1 })
        ));
    }

    #[test]
    fn test_truncated_frame_is_disconnect() {
        let mut buf = Vec::new();
        write_message(&mut buf, &Message::Partial(Grid::filled(4, 4, 1.0).unwrap())).unwrap();
        buf.truncate(buf.len() - 3);
        assert!(matches!(
            read_message(&mut Cursor::new(buf), 2),
            Err(ComputeError::Disconnected { peer: 2 })
        ));
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(
            read_message(&mut Cursor::new(vec![9u8]), 0),
            Err(ComputeError::Protocol(_))
        ));
    }
}
