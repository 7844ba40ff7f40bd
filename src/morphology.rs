// src/morphology.rs - Topology-preserving thinning of crack masks

use log::debug;
use rayon::prelude::*;

use crate::image_utils::{code_bit, neighborhood_code};
use crate::mask::{BinaryMask, Coord, Grid, Skeleton};

/// Removal table for the first thinning sub-iteration, indexed by neighborhood code
static THIN_LUT_FIRST: [bool; 256] = build_thin_lut(true);

/// Removal table for the second thinning sub-iteration
static THIN_LUT_SECOND: [bool; 256] = build_thin_lut(false);

/// Pixels whose removal keeps their neighbors in one 8-connected group and
/// leaves no arm end behind, used to break up 2x2 blocks
static SIMPLE_LUT: [bool; 256] = build_simple_lut();

/// Exactly one 4-connected transition from background to foreground around the pixel
const fn removal_g1(code: u8) -> bool {
    let mut transitions = 0;
    let mut i = 0;
    while i < 8 {
        if !code_bit(code, i) && (code_bit(code, i + 1) || code_bit(code, i + 2)) {
            transitions += 1;
        }
        i += 2;
    }
    transitions == 1
}

/// Pixel is neither an arm end nor an interior pixel
const fn removal_g2(code: u8) -> bool {
    let mut n1 = 0;
    let mut n2 = 0;
    let mut k = 1;
    while k < 8 {
        if code_bit(code, k) || code_bit(code, k - 1) {
            n1 += 1;
        }
        if code_bit(code, k) || code_bit(code, k + 1) {
            n2 += 1;
        }
        k += 2;
    }
    let m = if n1 < n2 { n1 } else { n2 };
    m == 2 || m == 3
}

/// South-east boundary condition
const fn removal_g3(code: u8) -> bool {
    !((code_bit(code, 1) || code_bit(code, 2) || !code_bit(code, 7)) && code_bit(code, 0))
}

/// North-west boundary condition
const fn removal_g3_prime(code: u8) -> bool {
    !((code_bit(code, 5) || code_bit(code, 6) || !code_bit(code, 3)) && code_bit(code, 4))
}

const fn build_thin_lut(first: bool) -> [bool; 256] {
    let mut lut = [false; 256];
    let mut i = 0;
    while i < 256 {
        let code = i as u8;
        let boundary = if first {
            removal_g3(code)
        } else {
            removal_g3_prime(code)
        };
        lut[i] = removal_g1(code) && removal_g2(code) && boundary;
        i += 1;
    }
    lut
}

const fn build_simple_lut() -> [bool; 256] {
    let mut lut = [false; 256];
    let mut i = 0;
    while i < 256 {
        let code = i as u8;
        lut[i] = removal_g1(code) && code.count_ones() >= 2;
        i += 1;
    }
    lut
}

/// Run one thinning sub-iteration, returning the number of removed pixels.
///
/// Every pixel is judged against the grid as it was when the sub-iteration
/// started; rows are judged in parallel and removals applied afterwards.
fn thinning_subiteration(grid: &mut Grid, lut: &'static [bool; 256]) -> usize {
    let snapshot: &Grid = grid;
    let width = snapshot.width();

    let removable: Vec<Coord> = (0..snapshot.height())
        .into_par_iter()
        .flat_map_iter(|y| {
            (0..width)
                .filter(move |&x| {
                    snapshot.get(x, y) && lut[neighborhood_code(snapshot, x, y) as usize]
                })
                .map(move |x| Coord::new(x, y))
        })
        .collect();

    for c in &removable {
        grid.set(c.x, c.y, false);
    }

    removable.len()
}

/// True if (x, y) is a corner of a fully set 2x2 square
fn in_2x2_block(grid: &Grid, x: u32, y: u32) -> bool {
    let (x, y) = (x as i64, y as i64);
    [(-1, -1), (0, -1), (-1, 0), (0, 0)].iter().any(|&(ox, oy)| {
        grid.get_signed(x + ox, y + oy)
            && grid.get_signed(x + ox + 1, y + oy)
            && grid.get_signed(x + ox, y + oy + 1)
            && grid.get_signed(x + ox + 1, y + oy + 1)
    })
}

/// Remove simple pixels that sit in fully set 2x2 squares.
///
/// The two boundary conditions of the sub-iterations can both reject a
/// removable corner of a square, leaving it two pixels thick. Pixels are
/// judged one at a time in row-major order against the current grid, so two
/// corners of the same square are never removed together.
fn break_2x2_blocks(grid: &mut Grid) -> usize {
    let (width, height) = grid.dimensions();
    let mut removed = 0;
    for y in 0..height {
        for x in 0..width {
            if grid.get(x, y)
                && in_2x2_block(grid, x, y)
                && SIMPLE_LUT[neighborhood_code(grid, x, y) as usize]
            {
                grid.set(x, y, false);
                removed += 1;
            }
        }
    }
    removed
}

/// Reduce a crack mask to a one-pixel-wide skeleton.
///
/// Iterative two-pass thinning: passes repeat until a full pass removes no
/// pixel, then leftover 2x2 squares are broken up and thinning resumes until
/// neither step changes the grid. Connectivity and hole count are preserved
/// and arm endpoints are never removed, so the result is a subset of the mask
/// with the same topology. A 2x2 square survives only where removing any of
/// its corners would change that topology.
pub fn skeletonize(mask: &BinaryMask) -> Skeleton {
    let mut grid = mask.grid().clone();
    let mut passes = 0usize;
    let mut removed_total = 0usize;

    loop {
        let removed = thinning_subiteration(&mut grid, &THIN_LUT_FIRST)
            + thinning_subiteration(&mut grid, &THIN_LUT_SECOND);
        passes += 1;
        removed_total += removed;
        if removed > 0 {
            continue;
        }
        let broken = break_2x2_blocks(&mut grid);
        removed_total += broken;
        if broken == 0 {
            break;
        }
    }

    debug!(
        "Thinning converged after {} passes, removed {} of {} foreground pixels",
        passes,
        removed_total,
        mask.count_foreground()
    );

    Skeleton::from_grid(grid)
}

/// True if any 2x2 square of the skeleton is fully set
pub fn skeleton_has_2x2_block(skeleton: &Skeleton) -> bool {
    let (width, height) = skeleton.dimensions();
    if width < 2 || height < 2 {
        return false;
    }
    (0..height - 1).any(|y| {
        let top = skeleton.row(y);
        let bottom = skeleton.row(y + 1);
        (0..width as usize - 1).any(|x| top[x] && top[x + 1] && bottom[x] && bottom[x + 1])
    })
}
