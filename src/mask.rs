// src/mask.rs - Binary pixel grids shared by every pipeline stage

use std::cmp::Ordering;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::errors::{CrackError, Result};

/// Pixel coordinate, x to the right and y downward from the top-left corner.
///
/// Ordering is row-major (y first, then x) so that sorted collections and
/// "first occurrence" tie-breaks follow the scan order of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Row-major boolean grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Grid {
    fn new(width: u32, height: u32, data: Vec<bool>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CrackError::invalid_input(format!(
                "mask dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(CrackError::invalid_input(format!(
                "mask buffer holds {} pixels but {}x{} needs {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Total number of pixels (W x H)
    #[inline]
    pub fn area(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel value; panics when out of bounds, like `image::ImageBuffer::get_pixel`
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "pixel ({}, {}) out of bounds", x, y);
        self.data[self.index(x, y)]
    }

    /// Pixel value with out-of-bounds coordinates reading as background
    #[inline]
    pub fn get_signed(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[self.index(x as u32, y as u32)]
    }

    #[inline]
    pub(crate) fn set(&mut self, x: u32, y: u32, value: bool) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Coordinates of set pixels in row-major order
    pub fn iter_set(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter_matching(true)
    }

    /// Coordinates of unset pixels in row-major order
    pub fn iter_unset(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter_matching(false)
    }

    fn iter_matching(&self, value: bool) -> impl Iterator<Item = Coord> + '_ {
        let width = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .filter(move |(_, &v)| v == value)
            .map(move |(i, _)| Coord::new((i % width) as u32, (i / width) as u32))
    }

    /// One row of pixels
    pub fn row(&self, y: u32) -> &[bool] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }
}

/// Binary crack mask: `true` is crack (foreground), `false` is substrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask(Grid);

impl BinaryMask {
    /// Build a mask from a row-major boolean buffer
    pub fn new(width: u32, height: u32, data: Vec<bool>) -> Result<Self> {
        Grid::new(width, height, data).map(Self)
    }

    /// Build a mask from raw class values.
    ///
    /// Zero is background. All non-zero pixels must carry the same value,
    /// otherwise the input has more than two classes and is rejected.
    pub fn from_values(width: u32, height: u32, values: &[u8]) -> Result<Self> {
        let mut foreground_value: Option<u8> = None;
        for &v in values {
            if v == 0 {
                continue;
            }
            match foreground_value {
                None => foreground_value = Some(v),
                Some(fg) if fg != v => {
                    return Err(CrackError::invalid_input(format!(
                        "mask is not purely binary: found foreground values {} and {}",
                        fg, v
                    )));
                }
                Some(_) => {}
            }
        }
        Self::new(width, height, values.iter().map(|&v| v != 0).collect())
    }

    /// Build a mask from text rows; `#` or `1` is crack, `.` or `0` is background
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(CrackError::invalid_input(format!(
                    "row {} has {} pixels, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for c in row.chars() {
                match c {
                    '#' | '1' => data.push(true),
                    '.' | '0' => data.push(false),
                    other => {
                        return Err(CrackError::invalid_input(format!(
                            "unexpected mask character '{}' in row {}",
                            other, y
                        )));
                    }
                }
            }
        }
        Self::new(width, height, data)
    }

    pub fn count_foreground(&self) -> usize {
        self.0.count()
    }

    pub fn count_background(&self) -> usize {
        self.0.area() - self.0.count()
    }

    pub fn foreground(&self) -> impl Iterator<Item = Coord> + '_ {
        self.0.iter_set()
    }

    pub fn background(&self) -> impl Iterator<Item = Coord> + '_ {
        self.0.iter_unset()
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.0
    }
}

impl Deref for BinaryMask {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        &self.0
    }
}

/// One-pixel-wide centerline of a mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton(Grid);

impl Skeleton {
    pub(crate) fn from_grid(grid: Grid) -> Self {
        Self(grid)
    }

    pub fn pixel_count(&self) -> usize {
        self.0.count()
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    pub fn pixels(&self) -> impl Iterator<Item = Coord> + '_ {
        self.0.iter_set()
    }

    /// Reinterpret the skeleton as a crack mask (e.g. to thin it again)
    pub fn to_mask(&self) -> BinaryMask {
        BinaryMask(self.0.clone())
    }
}

impl Deref for Skeleton {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        &self.0
    }
}
