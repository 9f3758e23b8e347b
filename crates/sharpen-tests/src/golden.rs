//! Golden values for the reference scenario.
//!
//! A 64x64 black image with a 10x10 square of intensity 200 at
//! `[27, 37) x [27, 37)`, sharpened with radius 8. Values are the
//! sharpened image *before* cropping, at source coordinates, computed
//! independently in double precision.

use approx::assert_relative_eq;
use sharpen_core::Grid;
use sharpen_ops::RADIUS;

/// Side of the reference image.
pub const SIZE: usize = 64;

/// Square spans `[SQUARE_LO, SQUARE_HI)` on both axes.
pub const SQUARE_LO: usize = 27;
pub const SQUARE_HI: usize = 37;

/// Intensity inside the square.
pub const SQUARE_VALUE: i32 = 200;

/// `(i, j, sharp[i][j])` in source coordinates.
pub const SHARP_AT: [(usize, usize, f64); 8] = [
    (32, 32, 1137.1046925662088),
    (27, 32, 623.4963288995293),
    (26, 32, 120.87196560717308),
    (20, 32, -76.56253985467578),
    (27, 27, 365.5980525476854),
    (26, 26, -89.21370753091091),
    (8, 8, 0.0),
    (55, 55, 0.0),
];

/// The reference input.
pub fn square_image() -> Grid<i32> {
    let mut g: Grid<i32> = Grid::new(SIZE, SIZE).unwrap();
    for i in SQUARE_LO..SQUARE_HI {
        for j in SQUARE_LO..SQUARE_HI {
            g[(i, j)] = SQUARE_VALUE;
        }
    }
    g
}

/// Checks a cropped result against [`SHARP_AT`].
pub fn check_cropped(cropped: &Grid<f64>) {
    assert_eq!(cropped.dims(), (SIZE - 2 * RADIUS, SIZE - 2 * RADIUS));
    for &(i, j, expected) in &SHARP_AT {
        let got = cropped[(i - RADIUS, j - RADIUS)];
        assert_relative_eq!(got, expected, epsilon = 1e-9, max_relative = 1e-12);
    }
}
