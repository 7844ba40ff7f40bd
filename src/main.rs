use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use log::{error, info, warn};
use rayon::prelude::*;

use crack_metrics_lib::image_io::get_png_files_in_dir;
use crack_metrics_lib::{
    load_image, load_image_under, process_image, write_summary_csv, AnalysisRecord, Config,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Crack network measurement and compliance check")]
struct Args {
    /// Path to input image or directory of PNG images
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Physical size of one pixel (overwrites config)
    #[clap(short = 's', long)]
    pixel_scale: Option<f64>,

    /// Maximum crack width limit (overwrites config)
    #[clap(long)]
    max_width_limit: Option<f64>,

    /// Average crack width limit (overwrites config)
    #[clap(long)]
    avg_width_limit: Option<f64>,

    /// Crack area ratio limit as a fraction of the image (overwrites config)
    #[clap(long)]
    area_ratio_limit: Option<f64>,

    /// Crack length limit (overwrites config)
    #[clap(long)]
    length_limit: Option<f64>,

    /// Skip writing mask, skeleton and overlay images
    #[clap(long)]
    no_images: bool,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if Path::new(&args.config).exists() {
        Config::from_file(&args.config)
            .with_context(|| format!("loading configuration from {}", args.config))?
    } else {
        warn!("Config file {} not found, using defaults", args.config);
        Config::default()
    };

    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }
    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }
    if let Some(scale) = args.pixel_scale {
        config.pixel_scale = scale;
    }
    if let Some(limit) = args.max_width_limit {
        config.limits.max_width_limit = Some(limit);
    }
    if let Some(limit) = args.avg_width_limit {
        config.limits.avg_width_limit = Some(limit);
    }
    if let Some(limit) = args.area_ratio_limit {
        config.limits.area_ratio_limit = Some(limit);
    }
    if let Some(limit) = args.length_limit {
        config.limits.length_limit = Some(limit);
    }
    if args.no_images {
        config.save_images = false;
    }

    config.validate()?;
    config.validate_input_path()?;

    Ok(config)
}

/// Load and analyze one image; images found under a directory are named by
/// their path relative to it so same-named files in subdirectories do not collide
fn analyze_path(
    path: &Path,
    root: Option<&Path>,
    config: &Config,
) -> crack_metrics_lib::Result<AnalysisRecord> {
    let input_image = match root {
        Some(root) => load_image_under(path, root)?,
        None => load_image(path)?,
    };
    process_image(input_image, config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = load_config(&args)?;
    let start_time = Instant::now();

    let output_base = PathBuf::from(&config.output_base_dir);
    std::fs::create_dir_all(&output_base)
        .with_context(|| format!("creating output directory {}", output_base.display()))?;

    let input_path = PathBuf::from(&config.input_path);

    let records: Vec<AnalysisRecord> = if input_path.is_file() {
        info!("Processing single file: {}", input_path.display());
        vec![analyze_path(&input_path, None, &config)
            .with_context(|| format!("analyzing {}", input_path.display()))?]
    } else if input_path.is_dir() {
        info!("Processing directory: {}", input_path.display());
        let png_files = get_png_files_in_dir(&input_path)?;
        info!("Found {} PNG files", png_files.len());

        let results: Vec<_> = if config.use_parallel {
            png_files
                .par_iter()
                .map(|path| (path, analyze_path(path, Some(input_path.as_path()), &config)))
                .collect()
        } else {
            png_files
                .iter()
                .map(|path| (path, analyze_path(path, Some(input_path.as_path()), &config)))
                .collect()
        };

        results
            .into_iter()
            .filter_map(|(path, result)| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    error!("Error processing {}: {}", path.display(), e);
                    None
                }
            })
            .collect()
    } else {
        bail!("input path {} is neither a file nor a directory", input_path.display());
    };

    let summary_path = write_summary_csv(&records, &output_base)?;
    let failing = records.iter().filter(|r| !r.compliance.overall_pass).count();

    info!(
        "Analyzed {} images ({} failing compliance), summary at {}",
        records.len(),
        failing,
        summary_path.display()
    );
    info!("Processing completed in {:.2} seconds", start_time.elapsed().as_secs_f64());

    Ok(())
}
