// src/pipeline.rs - Mask-to-verdict analysis and per-image processing

use std::path::{Path, PathBuf};

use image::RgbImage;

use log::{debug, info};

use crate::compliance::{check_compliance, ComplianceLimits, ComplianceReport};
use crate::config::Config;
use crate::errors::Result;
use crate::image_io::{binarize, save_image, InputImage};
use crate::mask::{BinaryMask, Coord, Skeleton};
use crate::metrics::{compute_metrics, Metrics, PixelScale};
use crate::morphology::skeletonize;
use crate::output::{write_report_json, AnalysisRecord};
use crate::point_analysis::{classify_points, Topology};
use crate::render::{render_grid, render_max_width, render_topology};
use crate::width_analysis::{analyze_width, WidthStats};

/// Everything the analysis produces for one mask
#[derive(Debug, Clone)]
pub struct CrackAnalysis {
    pub skeleton: Skeleton,
    pub topology: Topology,
    pub width: WidthStats,
    pub metrics: Metrics,
    pub compliance: ComplianceReport,
    pub max_width_point: Option<Coord>,
}

/// Run the full analysis on a crack mask.
///
/// Skeleton, width statistics and point classification feed the metrics,
/// which are then checked against `limits`. Fails without a partial result if
/// the mask has no background, the scale is not positive, or a limit is invalid.
pub fn analyze(
    mask: &BinaryMask,
    pixel_scale: f64,
    limits: &ComplianceLimits,
) -> Result<CrackAnalysis> {
    limits.validate()?;
    let scale = PixelScale::new(pixel_scale)?;

    let skeleton = skeletonize(mask);
    let width = analyze_width(mask, &skeleton)?;
    let topology = classify_points(&skeleton);
    let metrics = compute_metrics(mask, &skeleton, &width, &topology, scale);
    let compliance = check_compliance(&metrics, limits, mask.area());

    debug!(
        "Analysis: {} foreground px, {} skeleton px, {} endpoints, {} branch points",
        metrics.foreground_pixels,
        metrics.skeleton_pixels,
        metrics.endpoint_count,
        metrics.branch_point_count
    );

    Ok(CrackAnalysis {
        max_width_point: width.max_width_point,
        skeleton,
        topology,
        width,
        metrics,
        compliance,
    })
}

/// Save `<image_dir>/<name>_<suffix>.png`, creating subdirectories of nested names
fn save_overlay(image: &RgbImage, image_dir: &Path, name: &str, suffix: &str) -> Result<()> {
    let path = image_dir.join(format!("{}_{}.png", name, suffix));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    save_image(image, path)
}

/// Analyze one decoded image and write its report (and overlays when configured)
pub fn process_image(input_image: InputImage, config: &Config) -> Result<AnalysisRecord> {
    let InputImage { image, path, filename } = input_image;

    let mask = binarize(&image, config.binarize_threshold)?;
    let analysis = analyze(&mask, config.pixel_scale, &config.limits)?;

    let record = AnalysisRecord {
        filename: filename.clone(),
        image_width: mask.width(),
        image_height: mask.height(),
        metrics: analysis.metrics.clone(),
        compliance: analysis.compliance.clone(),
        max_width_point: analysis.max_width_point,
    };

    let output_base = PathBuf::from(&config.output_base_dir);

    if config.save_images {
        let image_dir = output_base.join("images");

        save_overlay(&render_grid(&mask), &image_dir, &filename, "mask")?;
        save_overlay(&render_grid(&analysis.skeleton), &image_dir, &filename, "skeleton")?;
        save_overlay(
            &render_topology(&analysis.skeleton, &analysis.topology, &config.render),
            &image_dir,
            &filename,
            "topology",
        )?;
        save_overlay(
            &render_max_width(&mask, &analysis.width, &config.render),
            &image_dir,
            &filename,
            "width",
        )?;
    }

    let report_path = write_report_json(&record, &output_base)?;

    info!(
        "{}: length {:.3}, max width {:.3}, avg width {:.3}, area ratio {:.4} -> {} ({})",
        path.display(),
        record.metrics.length,
        record.metrics.max_width,
        record.metrics.avg_width,
        record.compliance.area_ratio,
        record.compliance.verdict(),
        report_path.display()
    );

    Ok(record)
}
