//! Integration tests for the sharpen crates.
//!
//! End-to-end checks that span the codec, the stencil arithmetic and the
//! worker engine: exact agreement between topologies, the reference
//! square scenario, and failure propagation.

#[cfg(test)]
mod golden;

#[cfg(test)]
mod tests {
    use crate::golden;
    use sharpen_compute::engine::sharpen_local;
    use sharpen_compute::{ComputeError, MemorySource, PgmSource, Topology};
    use sharpen_core::Grid;
    use sharpen_ops::kernel::Stencil;
    use sharpen_ops::postprocess::{norm, SCALE};
    use sharpen_ops::{serial, RADIUS};
    use tempfile::tempdir;

    fn run(procs: usize, threads: usize, image: &Grid<i32>) -> Grid<f64> {
        let topo = Topology::new(procs, threads).unwrap();
        sharpen_local(topo, MemorySource::new(image.clone()), RADIUS)
            .unwrap()
            .image
    }

    /// Pseudo-random texture so every tap matters.
    fn noise(nx: usize, ny: usize) -> Grid<i32> {
        let mut state = 0x2545_f491_u32;
        let data = (0..nx * ny)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state % 256) as i32
            })
            .collect();
        Grid::from_vec(nx, ny, data).unwrap()
    }

    #[test]
    fn test_topologies_bit_identical() {
        let image = noise(57, 43);
        let reference = serial::sharpen_image(&image, RADIUS).unwrap();
        for (p, t) in [(1, 1), (1, 4), (4, 1), (2, 2), (3, 5)] {
            let out = run(p, t, &image);
            assert_eq!(out.dims(), (57 - 16, 43 - 16));
            assert!(
                out.as_slice().iter().zip(reference.as_slice()).all(|(a, b)| a.to_bits() == b.to_bits()),
                "{p}x{t} differs from serial"
            );
        }
    }

    #[test]
    fn test_more_workers_than_pixels_per_row() {
        let image = noise(17, 17);
        let reference = serial::sharpen_image(&image, RADIUS).unwrap();
        assert_eq!(reference.dims(), (1, 1));
        assert_eq!(run(3, 7, &image), reference);
    }

    #[test]
    fn test_square_scenario_golden() {
        let image = golden::square_image();
        let one = run(1, 1, &image);
        golden::check_cropped(&one);
        assert_eq!(run(4, 1, &image), one);
        assert_eq!(run(2, 2, &image), one);
    }

    #[test]
    fn test_square_edge_contrast_enhanced() {
        let out = run(1, 2, &golden::square_image());
        let d = RADIUS;
        // Across the top edge of the square, column 32.
        let inside = out[(golden::SQUARE_LO - d, 32 - d)];
        let outside = out[(golden::SQUARE_LO - 1 - d, 32 - d)];
        assert!(inside - outside > f64::from(golden::SQUARE_VALUE));
        // Far from the square nothing changes.
        assert_eq!(out[(0, 0)], 0.0);
    }

    #[test]
    fn test_flat_image_constant_response() {
        let c = 80;
        let image = Grid::filled(50, 40, c).unwrap();
        let out = run(2, 3, &image);
        let expected = f64::from(c) - SCALE / norm(RADIUS) * f64::from(c) * Stencil::new(RADIUS).unwrap().sum();
        for &v in out.as_slice() {
            approx::assert_relative_eq!(v, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_file_pipeline() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("fuzzy.pgm");
        let output = dir.path().join("sharpened.pgm");

        let mut image: Grid<f64> = Grid::new(golden::SIZE, golden::SIZE).unwrap();
        for (dst, &src) in image.as_mut_slice().iter_mut().zip(golden::square_image().as_slice()) {
            *dst = f64::from(src);
        }
        sharpen_io::write(&input, &image).unwrap();

        let report = sharpen_local(Topology::new(2, 2).unwrap(), PgmSource::new(&input), RADIUS).unwrap();
        golden::check_cropped(&report.image);
        sharpen_io::write(&output, &report.image).unwrap();

        // Rescaled into [0, 255] because the result exceeds 255.
        let written = sharpen_io::read(&output).unwrap();
        assert_eq!(written.dims(), (48, 48));
        let max = written.as_slice().iter().copied().max().unwrap();
        assert_eq!(max, 255);
        assert_eq!(written[(32 - RADIUS, 32 - RADIUS)], 255);
    }

    #[test]
    fn test_corrupt_file_fails_every_topology() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("corrupt.pgm");
        std::fs::write(&input, "P2\n# corrupt\n40 40\n255\n1 2 x 4\n").unwrap();

        for (p, t) in [(1, 1), (1, 3), (3, 1), (2, 2)] {
            let err = sharpen_local(Topology::new(p, t).unwrap(), PgmSource::new(&input), RADIUS).unwrap_err();
            assert!(matches!(err, ComputeError::Image(_)), "{p}x{t}: {err}");
        }
    }
}
