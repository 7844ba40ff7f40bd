// src/lib.rs - Library interface for crack network measurement

pub mod compliance;
pub mod config;
pub mod errors;
pub mod image_io;
pub mod image_utils;
pub mod mask;
pub mod metrics;
pub mod morphology;
pub mod output;
pub mod pipeline;
pub mod point_analysis;
pub mod render;
pub mod spatial;
pub mod width_analysis;

// Re-export commonly used types and functions
pub use errors::{CrackError, Result};
pub use config::Config;
pub use mask::{BinaryMask, Coord, Skeleton};
pub use pipeline::{analyze, process_image, CrackAnalysis};
pub use image_io::{InputImage, load_image, load_image_under, output_name, save_image, binarize};

// Re-export analysis stages
pub use morphology::{skeletonize, skeleton_has_2x2_block};
pub use width_analysis::{analyze_width, WidthStats};
pub use point_analysis::{classify_points, PointClass, Topology};
pub use metrics::{compute_metrics, estimate_branch_count, Metrics, PixelScale};
pub use compliance::{
    check_compliance,
    ComplianceLimits,
    ComplianceReport,
    Criterion,
    CriterionResult,
    CriterionStatus,
};

// Re-export reporting
pub use output::{AnalysisRecord, write_report_json, write_summary_csv};
pub use render::{RenderStyle, render_grid, render_topology, render_max_width};
