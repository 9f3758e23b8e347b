//! Plain-text grey map (PGM `P2`) support.
//!
//! # File layout
//!
//! ```text
//! P2                      <- header line 1 (ignored on read)
//! # comment               <- header line 2 (ignored on read)
//! 256 192                 <- width (nx) and height (ny)
//! 255                     <- threshold / max grey (ignored on read)
//! 12 13 14 ...            <- nx * ny samples, top scanline first
//! ```
//!
//! Grids are indexed `[x][y]` with `y` growing upwards, so the first
//! scanline in the file is the *last* grid column: sample `s` lands at
//! `grid[(s % nx, ny - 1 - s / nx)]`. The writer applies the same flip in
//! reverse.
//!
//! Everything after the two header lines is read as whitespace-separated
//! tokens, so line breaks inside the size line or the sample block do not
//! matter.

use crate::{IoError, IoResult};
use sharpen_core::Grid;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Maximum grey level written to the output header.
pub const MAX_GREY: f64 = 255.0;

/// Samples per output line.
pub const SAMPLES_PER_LINE: usize = 16;

const MAGIC: &str = "P2";

/// Reads only the header of a PGM file and returns `(nx, ny)`.
pub fn probe_size<P: AsRef<Path>>(path: P) -> IoResult<(usize, usize)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let dims = probe_size_from(BufReader::new(file))?;
    debug!(path = %path.display(), nx = dims.0, ny = dims.1, "probed PGM size");
    Ok(dims)
}

/// [`probe_size`] over any buffered reader.
pub fn probe_size_from<R: BufRead>(reader: R) -> IoResult<(usize, usize)> {
    let mut tokens = Tokens::after_header(reader)?;
    read_dims(&mut tokens)
}

/// Reads a PGM file into an `nx x ny` grid of non-negative intensities.
///
/// # Errors
///
/// - [`IoError::Io`] if the file cannot be opened
/// - [`IoError::InvalidFile`] if the header is missing or the size is malformed
/// - [`IoError::DecodeError`] if a sample is not a non-negative integer or
///   the sample block is truncated
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Grid<i32>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let grid = read_from(BufReader::new(file))?;
    debug!(path = %path.display(), nx = grid.rows(), ny = grid.cols(), "read PGM");
    Ok(grid)
}

/// [`read`] over any buffered reader.
pub fn read_from<R: BufRead>(reader: R) -> IoResult<Grid<i32>> {
    let mut tokens = Tokens::after_header(reader)?;
    let (nx, ny) = read_dims(&mut tokens)?;

    // Threshold is not used by the pipeline.
    tokens
        .next_token()?
        .ok_or_else(|| IoError::InvalidFile("missing threshold value".into()))?;

    let mut grid: Grid<i32> = Grid::new(nx, ny)?;
    let total = nx * ny;
    for s in 0..total {
        let token = tokens.next_token()?.ok_or_else(|| {
            IoError::DecodeError(format!("truncated data: expected {total} samples, found {s}"))
        })?;
        let value: i32 = token
            .parse()
            .map_err(|_| IoError::DecodeError(format!("sample {s} is not an integer: {token:?}")))?;
        if value < 0 {
            return Err(IoError::DecodeError(format!("sample {s} is negative: {value}")));
        }
        grid[(s % nx, ny - 1 - s / nx)] = value;
    }
    trace!(nx, ny, "decoded samples");

    Ok(grid)
}

/// Writes a grid as a PGM file, rescaling into `[0, 255]` when needed.
pub fn write<P: AsRef<Path>>(path: P, image: &Grid<f64>) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_to(BufWriter::new(file), image)?;
    debug!(path = %path.display(), nx = image.rows(), ny = image.cols(), "wrote PGM");
    Ok(())
}

/// [`write`] into any writer.
///
/// The min/max of `|value|` decide the mapping: if the data exceeds 255
/// (or the minimum is negative) every sample becomes
/// `trunc(255 * |v - min| / (max - min) + 0.5)`, otherwise
/// `trunc(|v| + 0.5)`.
pub fn write_to<W: Write>(mut writer: W, image: &Grid<f64>) -> IoResult<()> {
    let (nx, ny) = image.dims();
    let (min, max) = abs_range(image.as_slice());
    let rescale = min < 0.0 || max > MAX_GREY;
    trace!(nx, ny, min, max, rescale, "encoding PGM");

    writeln!(writer, "{MAGIC}")?;
    writeln!(writer, "# Written by sharpen")?;
    writeln!(writer, "{nx} {ny}")?;
    writeln!(writer, "{}", MAX_GREY as i32)?;

    let mut count = 0usize;
    for y in (0..ny).rev() {
        for x in 0..nx {
            let grey = grey_level(image[(x, y)], min, max, rescale);
            write!(writer, "{grey:3} ")?;
            count += 1;
            if count % SAMPLES_PER_LINE == 0 {
                writeln!(writer)?;
            }
        }
    }
    if count % SAMPLES_PER_LINE != 0 {
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Integer grey level for one sample.
pub fn grey_level(value: f64, min: f64, max: f64, rescale: bool) -> i32 {
    if rescale {
        (MAX_GREY * ((value - min).abs() / (max - min)) + 0.5) as i32
    } else {
        (value.abs() + 0.5) as i32
    }
}

/// Minimum and maximum of `|v|` over `values`.
fn abs_range(values: &[f64]) -> (f64, f64) {
    let first = values.first().map_or(0.0, |v| v.abs());
    values.iter().fold((first, first), |(min, max), v| {
        let a = v.abs();
        (min.min(a), max.max(a))
    })
}

fn read_dims<R: BufRead>(tokens: &mut Tokens<R>) -> IoResult<(usize, usize)> {
    let mut dim = |name: &str| -> IoResult<usize> {
        let token = tokens
            .next_token()?
            .ok_or_else(|| IoError::InvalidFile(format!("missing {name}")))?;
        let value: usize = token
            .parse()
            .map_err(|_| IoError::InvalidFile(format!("malformed {name}: {token:?}")))?;
        if value == 0 {
            return Err(IoError::InvalidFile(format!("{name} is zero")));
        }
        Ok(value)
    };
    let nx = dim("width")?;
    let ny = dim("height")?;
    Ok((nx, ny))
}

/// Whitespace tokenizer that pulls lines on demand.
struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
    line: String,
}

impl<R: BufRead> Tokens<R> {
    /// Skips the two header lines and positions at the size line.
    fn after_header(mut reader: R) -> IoResult<Self> {
        let mut line = String::new();
        for n in 1..=2 {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(IoError::InvalidFile(format!("missing header line {n}")));
            }
        }
        Ok(Self {
            reader,
            pending: VecDeque::new(),
            line,
        })
    }

    fn next_token(&mut self) -> IoResult<Option<String>> {
        while self.pending.is_empty() {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(self.line.split_ascii_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SMALL: &str = "P2\n# test\n3 2\n255\n1 2 3\n4 5 6\n";

    #[test]
    fn test_probe_size() {
        assert_eq!(probe_size_from(Cursor::new(SMALL)).unwrap(), (3, 2));
    }

    #[test]
    fn test_probe_size_malformed() {
        let err = probe_size_from(Cursor::new("P2\n# c\nabc def\n")).unwrap_err();
        assert!(matches!(err, IoError::InvalidFile(_)));
        let err = probe_size_from(Cursor::new("P2\n")).unwrap_err();
        assert!(matches!(err, IoError::InvalidFile(_)));
    }

    #[test]
    fn test_read_flips_vertically() {
        let grid = read_from(Cursor::new(SMALL)).unwrap();
        assert_eq!(grid.dims(), (3, 2));
        // First file scanline is the top row, i.e. y = ny - 1.
        assert_eq!(grid[(0, 1)], 1);
        assert_eq!(grid[(2, 1)], 3);
        assert_eq!(grid[(0, 0)], 4);
        assert_eq!(grid[(2, 0)], 6);
    }

    #[test]
    fn test_read_ignores_line_breaks() {
        let grid = read_from(Cursor::new("P2\n# c\n3\n2 255 1 2\n3 4\n5\n6")).unwrap();
        assert_eq!(grid[(1, 0)], 5);
    }

    #[test]
    fn test_read_truncated() {
        let err = read_from(Cursor::new("P2\n# c\n3 2\n255\n1 2 3 4\n")).unwrap_err();
        assert!(matches!(err, IoError::DecodeError(ref m) if m.contains("truncated")));
    }

    #[test]
    fn test_read_rejects_bad_samples() {
        assert!(read_from(Cursor::new("P2\n# c\n2 1\n255\n1 x\n")).is_err());
        assert!(read_from(Cursor::new("P2\n# c\n2 1\n255\n1 -4\n")).is_err());
        assert!(read_from(Cursor::new("P2\n# c\n0 1\n255\n")).is_err());
    }

    #[test]
    fn test_write_layout_and_wrapping() {
        let data: Vec<f64> = (0..20).map(|v| v as f64).collect();
        let grid = Grid::from_vec(5, 4, data).unwrap();
        let mut out = Vec::new();
        write_to(&mut out, &grid).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "P2");
        assert!(lines[1].starts_with('#'));
        assert_eq!(lines[2], "5 4");
        assert_eq!(lines[3], "255");
        // 20 samples -> one full line of 16 and one partial line of 4.
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[4].split_whitespace().count(), SAMPLES_PER_LINE);
        assert_eq!(lines[5].split_whitespace().count(), 4);
        // First sample written is x = 0, y = ny - 1.
        assert_eq!(lines[4].split_whitespace().next(), Some("3"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_write_rescales_out_of_range() {
        let grid = Grid::from_vec(1, 3, vec![-10.0, 100.0, 510.0]).unwrap();
        let mut out = Vec::new();
        write_to(&mut out, &grid).unwrap();
        let text = String::from_utf8(out).unwrap();
        let samples: Vec<i32> = text
            .lines()
            .skip(4)
            .flat_map(|l| l.split_whitespace())
            .map(|t| t.parse().unwrap())
            .collect();
        // |v| range is [10, 510]; written top row first (y = 2, 1, 0).
        assert_eq!(samples, vec![255, 46, 10]);
    }

    #[test]
    fn test_grey_level_rounding() {
        assert_eq!(grey_level(-3.4, 0.0, 200.0, false), 3);
        assert_eq!(grey_level(3.5, 0.0, 200.0, false), 4);
        assert_eq!(grey_level(0.0, 0.0, 300.0, true), 0);
        assert_eq!(grey_level(300.0, 0.0, 300.0, true), 255);
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.pgm");

        let mut grid: Grid<f64> = Grid::new(20, 12).unwrap();
        for x in 5..10 {
            for y in 3..7 {
                grid[(x, y)] = 200.0;
            }
        }
        write(&path, &grid).unwrap();

        assert_eq!(probe_size(&path).unwrap(), (20, 12));
        let back = read(&path).unwrap();
        for x in 0..20 {
            for y in 0..12 {
                approx::assert_relative_eq!(back[(x, y)] as f64, grid[(x, y)]);
            }
        }
    }

    #[test]
    fn test_read_missing_file() {
        let err = read("/definitely/not/here.pgm").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
