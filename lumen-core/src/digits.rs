//! Tiny 2x3 digit font for showing scores on the pad matrix.

use crate::grid::GridPos;

// Offsets (dx, dy) lit for each digit; dy grows downwards.
const GLYPHS: [&[(u8, u8)]; 10] = [
    &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 2)],
    &[(0, 0), (0, 1)],
    &[(0, 0), (1, 0), (1, 1), (0, 2), (1, 2)],
    &[(0, 0), (1, 0), (1, 1), (0, 2), (1, 2)],
    &[(0, 0), (0, 1), (1, 1), (1, 2)],
    &[(1, 0), (0, 1), (1, 1), (1, 2), (0, 2)],
    &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)],
    &[(0, 2), (1, 2), (1, 1), (1, 0)],
    &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)],
    &[(0, 1), (0, 2), (1, 0), (1, 1), (1, 2)],
];

/// Pixels of one digit with its top-left corner at `origin`.
///
/// Digits above 9 draw as 0. Pixels falling off the matrix are dropped.
#[must_use]
pub fn draw_digit(digit: u8, origin: GridPos, color: u8) -> Vec<(GridPos, u8)> {
    let glyph = GLYPHS.get(usize::from(digit)).copied().unwrap_or(GLYPHS[0]);
    glyph
        .iter()
        .map(|&(dx, dy)| GridPos::new(origin.x + dx, origin.y + dy))
        .filter(|pos| pos.in_bounds())
        .map(|pos| (pos, color))
        .collect()
}

/// Pixels for a number of up to two digits, tens at x=1 and units at x=4.
///
/// Numbers above 99 show their last two digits.
#[must_use]
pub fn draw_number(n: u32, color: u8) -> Vec<(GridPos, u8)> {
    let n = n % 100;
    // n < 100, both digits fit in u8.
    let tens = u8::try_from(n / 10).unwrap_or(0);
    let units = u8::try_from(n % 10).unwrap_or(0);

    let mut pixels = Vec::new();
    if tens > 0 {
        pixels.extend(draw_digit(tens, GridPos::new(1, 2), color));
    }
    pixels.extend(draw_digit(units, GridPos::new(4, 2), color));
    pixels
}
