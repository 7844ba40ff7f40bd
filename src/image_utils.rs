use crate::mask::Grid;

/// 8-neighborhood offsets in bit order of the neighborhood code,
/// counter-clockwise starting east (y grows downward).
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // N
    (-1, -1), // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // S
    (1, 1),   // SE
];

/// Encode the 8-neighborhood of (x, y) as a byte, bit i set when the
/// neighbor at `NEIGHBOR_OFFSETS[i]` is set. Out-of-bounds neighbors read as unset.
#[inline]
pub fn neighborhood_code(grid: &Grid, x: u32, y: u32) -> u8 {
    let (x, y) = (x as i64, y as i64);
    NEIGHBOR_OFFSETS
        .iter()
        .enumerate()
        .fold(0u8, |code, (bit, &(dx, dy))| {
            if grid.get_signed(x + dx, y + dy) {
                code | (1 << bit)
            } else {
                code
            }
        })
}

/// Bit `i` of a neighborhood code
#[inline]
pub const fn code_bit(code: u8, i: usize) -> bool {
    (code >> (i % 8)) & 1 == 1
}

/// Number of set neighbors for every neighborhood code
pub static NEIGHBOR_COUNT_LUT: [u8; 256] = build_neighbor_count_lut();

const fn build_neighbor_count_lut() -> [u8; 256] {
    let mut lut = [0u8; 256];
    let mut code = 0;
    while code < 256 {
        lut[code] = (code as u8).count_ones() as u8;
        code += 1;
    }
    lut
}

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}
