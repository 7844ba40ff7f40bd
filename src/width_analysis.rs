// src/width_analysis.rs - Crack width from nearest-background distances

use log::debug;
use serde::Serialize;

use crate::errors::{CrackError, Result};
use crate::mask::{BinaryMask, Coord, Skeleton};
use crate::spatial::KdTree2;

/// Width statistics over the skeleton, in pixels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidthStats {
    /// Largest local width (twice the distance to the nearest background pixel)
    pub max_width: f64,
    /// Mean local width over all skeleton pixels
    pub avg_width: f64,
    /// Skeleton pixel holding `max_width`; first in row-major order on ties
    pub max_width_point: Option<Coord>,
    /// Background pixel closest to `max_width_point`
    pub max_width_background: Option<Coord>,
    /// Number of skeleton pixels measured
    pub samples: usize,
}

impl WidthStats {
    fn empty() -> Self {
        Self {
            max_width: 0.0,
            avg_width: 0.0,
            max_width_point: None,
            max_width_background: None,
            samples: 0,
        }
    }
}

/// Measure crack width along the skeleton.
///
/// Widths are measured against the background of the original mask, so the
/// mask must contain at least one background pixel. An empty skeleton gives
/// zero widths and no max-width location.
pub fn analyze_width(mask: &BinaryMask, skeleton: &Skeleton) -> Result<WidthStats> {
    if mask.dimensions() != skeleton.dimensions() {
        return Err(CrackError::invalid_input(format!(
            "skeleton is {}x{} but mask is {}x{}",
            skeleton.width(),
            skeleton.height(),
            mask.width(),
            mask.height()
        )));
    }

    let background: Vec<Coord> = mask.background().collect();
    if background.is_empty() {
        return Err(CrackError::invalid_input(
            "mask has no background pixels, width cannot be measured",
        ));
    }

    if skeleton.is_empty() {
        return Ok(WidthStats::empty());
    }

    let tree = KdTree2::new(background);
    debug!("Built background index over {} pixels", tree.len());

    let mut stats = WidthStats::empty();
    let mut sum = 0.0;

    for point in skeleton.pixels() {
        let Some(nearest) = tree.nearest(point) else {
            continue;
        };
        let width = 2.0 * nearest.distance();
        sum += width;
        stats.samples += 1;

        // Strict comparison keeps the first maximum in scan order
        if stats.max_width_point.is_none() || width > stats.max_width {
            stats.max_width = width;
            stats.max_width_point = Some(point);
            stats.max_width_background = Some(nearest.point);
        }
    }

    if stats.samples > 0 {
        stats.avg_width = sum / stats.samples as f64;
    }

    debug!(
        "Width over {} skeleton pixels: max {:.3}px at {:?}, mean {:.3}px",
        stats.samples, stats.max_width, stats.max_width_point, stats.avg_width
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::skeletonize;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_straight_line_width() {
        let mask = BinaryMask::from_rows(&["............", ".##########.", "............"]).unwrap();
        let skeleton = skeletonize(&mask);
        let stats = analyze_width(&mask, &skeleton).unwrap();
        assert_approx_eq!(stats.max_width, 2.0);
        assert_approx_eq!(stats.avg_width, 2.0);
        assert_eq!(stats.max_width_point, Some(Coord::new(1, 1)));
        assert_eq!(stats.samples, 10);
    }

    #[test]
    fn test_thick_bar_width() {
        let mask = BinaryMask::from_rows(&[
            "...........",
            ".#########.",
            ".#########.",
            ".#########.",
            "...........",
        ])
        .unwrap();
        let skeleton = skeletonize(&mask);
        let stats = analyze_width(&mask, &skeleton).unwrap();
        assert_approx_eq!(stats.max_width, 4.0);
        assert_approx_eq!(stats.avg_width, 4.0);
        assert_eq!(stats.max_width_point, Some(Coord::new(2, 2)));
        let bg = stats.max_width_background.unwrap();
        assert!(!mask.get(bg.x, bg.y));
    }

    #[test]
    fn test_max_width_at_thick_cross_center() {
        let mask = BinaryMask::from_rows(&[
            "...........",
            "....###....",
            "....###....",
            "....###....",
            ".#########.",
            ".#########.",
            ".#########.",
            "....###....",
            "....###....",
            "....###....",
            "...........",
        ])
        .unwrap();
        let skeleton = skeletonize(&mask);
        let stats = analyze_width(&mask, &skeleton).unwrap();
        assert_approx_eq!(stats.max_width, 2.0 * 8f64.sqrt());
        assert_eq!(stats.max_width_point, Some(Coord::new(5, 5)));
        assert!(stats.max_width >= stats.avg_width);
        assert!(stats.avg_width > 0.0);
    }

    #[test]
    fn test_empty_skeleton_gives_zero_width() {
        let mask = BinaryMask::new(4, 4, vec![false; 16]).unwrap();
        let skeleton = skeletonize(&mask);
        let stats = analyze_width(&mask, &skeleton).unwrap();
        assert_eq!(stats.max_width, 0.0);
        assert_eq!(stats.avg_width, 0.0);
        assert_eq!(stats.max_width_point, None);
        assert_eq!(stats.samples, 0);
    }

    #[test]
    fn test_fully_foreground_mask_is_rejected() {
        let mask = BinaryMask::new(3, 3, vec![true; 9]).unwrap();
        let skeleton = skeletonize(&mask);
        let result = analyze_width(&mask, &skeleton);
        assert!(matches!(result, Err(CrackError::InvalidInput(_))));
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mask = BinaryMask::from_rows(&["#..", "..."]).unwrap();
        let other = BinaryMask::from_rows(&["#.", ".."]).unwrap();
        let result = analyze_width(&mask, &skeletonize(&other));
        assert!(matches!(result, Err(CrackError::InvalidInput(_))));
    }
}
