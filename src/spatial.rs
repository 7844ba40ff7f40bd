// src/spatial.rs - Static 2-D k-d tree for nearest-pixel queries

use crate::mask::Coord;

/// Ranges at or below this size are scanned linearly instead of split
const LEAF_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn key(self, c: &Coord) -> i64 {
        match self {
            Axis::X => c.x as i64,
            Axis::Y => c.y as i64,
        }
    }
}

/// Result of a nearest-neighbor query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nearest {
    pub point: Coord,
    pub distance_sq: u64,
}

impl Nearest {
    pub fn distance(&self) -> f64 {
        (self.distance_sq as f64).sqrt()
    }
}

/// Balanced k-d tree over pixel coordinates.
///
/// Built once by recursive median partitioning along the axis of larger
/// spread; the median of every range sits at the range midpoint, so the tree
/// lives in a single flat array and is never rebalanced.
#[derive(Debug, Clone)]
pub struct KdTree2 {
    points: Vec<Coord>,
    axes: Vec<Axis>,
}

impl KdTree2 {
    pub fn new(mut points: Vec<Coord>) -> Self {
        let mut axes = vec![Axis::X; points.len()];
        build_range(&mut points, &mut axes, 0);
        Self { points, axes }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closest stored point to `query` (Euclidean), or `None` for an empty tree
    pub fn nearest(&self, query: Coord) -> Option<Nearest> {
        if self.points.is_empty() {
            return None;
        }
        let mut best = Nearest {
            point: self.points[0],
            distance_sq: u64::MAX,
        };
        self.search(0, self.points.len(), query, &mut best);
        Some(best)
    }

    fn search(&self, lo: usize, hi: usize, query: Coord, best: &mut Nearest) {
        if hi - lo <= LEAF_SIZE {
            for p in &self.points[lo..hi] {
                consider(p, query, best);
            }
            return;
        }

        let mid = lo + (hi - lo) / 2;
        let pivot = &self.points[mid];
        consider(pivot, query, best);

        let axis = self.axes[mid];
        let diff = axis.key(&query) - axis.key(pivot);
        let (near, far) = if diff < 0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        if near.0 < near.1 {
            self.search(near.0, near.1, query, best);
        }
        if far.0 < far.1 && ((diff * diff) as u64) < best.distance_sq {
            self.search(far.0, far.1, query, best);
        }
    }
}

#[inline]
fn consider(p: &Coord, query: Coord, best: &mut Nearest) {
    let dx = p.x as i64 - query.x as i64;
    let dy = p.y as i64 - query.y as i64;
    let d = (dx * dx + dy * dy) as u64;
    if d < best.distance_sq {
        best.distance_sq = d;
        best.point = *p;
    }
}

fn build_range(points: &mut [Coord], axes: &mut [Axis], depth: usize) {
    if points.len() <= LEAF_SIZE {
        return;
    }

    let axis = split_axis(points, depth);
    let mid = points.len() / 2;
    points.select_nth_unstable_by_key(mid, |c| axis.key(c));
    axes[mid] = axis;

    let (left_points, rest) = points.split_at_mut(mid);
    let (left_axes, rest_axes) = axes.split_at_mut(mid);
    build_range(left_points, left_axes, depth + 1);
    build_range(&mut rest[1..], &mut rest_axes[1..], depth + 1);
}

/// Axis with the larger coordinate spread; alternates by depth on ties
fn split_axis(points: &[Coord], depth: usize) -> Axis {
    let (mut min_x, mut max_x) = (u32::MAX, 0);
    let (mut min_y, mut max_y) = (u32::MAX, 0);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    let spread_x = max_x - min_x;
    let spread_y = max_y - min_y;
    if spread_x > spread_y {
        Axis::X
    } else if spread_y > spread_x {
        Axis::Y
    } else if depth % 2 == 0 {
        Axis::X
    } else {
        Axis::Y
    }
}
