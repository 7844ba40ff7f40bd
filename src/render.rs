// src/render.rs - Annotated overlay images for the analysis results

use bresenham::Bresenham;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::{Deserialize, Serialize};

use crate::image_utils::in_bounds;
use crate::mask::{Coord, Grid};
use crate::point_analysis::Topology;
use crate::width_analysis::WidthStats;

/// Colors and marker size used for overlays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    #[serde(default = "default_endpoint_color")]
    pub endpoint_color_rgb: [u8; 3],
    #[serde(default = "default_branch_color")]
    pub branch_color_rgb: [u8; 3],
    #[serde(default = "default_width_color")]
    pub width_color_rgb: [u8; 3],
    #[serde(default = "default_marker_radius")]
    pub marker_radius: u32,
}

fn default_endpoint_color() -> [u8; 3] {
    [0, 255, 0] // Green
}

fn default_branch_color() -> [u8; 3] {
    [255, 0, 0] // Red
}

fn default_width_color() -> [u8; 3] {
    [255, 255, 0] // Yellow
}

fn default_marker_radius() -> u32 {
    1
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            endpoint_color_rgb: default_endpoint_color(),
            branch_color_rgb: default_branch_color(),
            width_color_rgb: default_width_color(),
            marker_radius: default_marker_radius(),
        }
    }
}

/// White-on-black rendering of a binary grid
pub fn render_grid(grid: &Grid) -> RgbImage {
    let (width, height) = grid.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        if grid.get(x, y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Skeleton with endpoints and branch points marked as filled discs
pub fn render_topology(skeleton: &Grid, topology: &Topology, style: &RenderStyle) -> RgbImage {
    let mut overlay = render_grid(skeleton);
    let radius = style.marker_radius as i32;

    for p in topology.endpoints() {
        draw_filled_circle_mut(
            &mut overlay,
            (p.x as i32, p.y as i32),
            radius,
            Rgb(style.endpoint_color_rgb),
        );
    }
    for p in topology.branch_points() {
        draw_filled_circle_mut(
            &mut overlay,
            (p.x as i32, p.y as i32),
            radius,
            Rgb(style.branch_color_rgb),
        );
    }

    overlay
}

/// Mask with a segment across the crack at the widest skeleton point.
///
/// The segment runs from the nearest background pixel through the skeleton
/// point to its mirror image on the opposite side.
pub fn render_max_width(mask: &Grid, width: &WidthStats, style: &RenderStyle) -> RgbImage {
    let mut overlay = render_grid(mask);

    if let (Some(center), Some(edge)) = (width.max_width_point, width.max_width_background) {
        let (start, end) = width_segment(center, edge);
        draw_clipped_line(&mut overlay, start, end, Rgb(style.width_color_rgb));
    }

    overlay
}

/// End points of the diameter through `center` whose one end is `edge`
pub fn width_segment(center: Coord, edge: Coord) -> ((i64, i64), (i64, i64)) {
    let start = (edge.x as i64, edge.y as i64);
    let end = (
        2 * center.x as i64 - edge.x as i64,
        2 * center.y as i64 - edge.y as i64,
    );
    (start, end)
}

fn draw_clipped_line(image: &mut RgbImage, start: (i64, i64), end: (i64, i64), color: Rgb<u8>) {
    let (width, height) = image.dimensions();
    let line = Bresenham::new(
        (start.0 as isize, start.1 as isize),
        (end.0 as isize, end.1 as isize),
    );

    // Bresenham excludes the final point
    for (x, y) in line.chain(std::iter::once((end.0 as isize, end.1 as isize))) {
        if in_bounds(x as i32, y as i32, width, height) {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}
