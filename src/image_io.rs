use std::path::{Component, Path, PathBuf};
use std::fs;
use image::{GrayImage, ImageFormat, RgbImage};

use crate::errors::{CrackError, Result};
use crate::mask::BinaryMask;

/// Luma value above which a pixel is treated as crack
pub const DEFAULT_BINARIZE_THRESHOLD: u8 = 128;

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: GrayImage,
    pub path: PathBuf,
    pub filename: String,
}

/// Get all PNG files from a directory (recursively), sorted by path
pub fn get_png_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(CrackError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(CrackError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut png_files = Vec::new();
    find_png_files_recursive(dir_path, &mut png_files)?;
    png_files.sort();

    Ok(png_files)
}

/// Helper function to recursively search for PNG files
fn find_png_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_png_files_recursive(&path, result)?;
        } else if path.is_file() {
            let is_png = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));
            if is_png {
                result.push(path);
            }
        }
    }

    Ok(())
}

/// Load an image and convert it to 8-bit luma
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    let filename = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CrackError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let img = image::open(path)?;

    Ok(InputImage {
        image: img.to_luma8(),
        path: path.to_path_buf(),
        filename,
    })
}

/// Report name for an image found under `root`: its relative path without
/// extension, directories joined by `/`, so that `a/x.png` and `b/x.png`
/// map to `a/x` and `b/x`
pub fn output_name<P: AsRef<Path>, Q: AsRef<Path>>(path: P, root: Q) -> Result<String> {
    let path = path.as_ref();
    let relative = path
        .strip_prefix(root.as_ref())
        .map_err(|_| CrackError::InvalidPath(path.to_path_buf()))?
        .with_extension("");

    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    match parts {
        Some(parts) if !parts.is_empty() => Ok(parts.join("/")),
        _ => Err(CrackError::InvalidPath(path.to_path_buf())),
    }
}

/// Load an image found under `root`, named by [`output_name`]
pub fn load_image_under<P: AsRef<Path>, Q: AsRef<Path>>(path: P, root: Q) -> Result<InputImage> {
    let filename = output_name(&path, root)?;
    let mut input = load_image(path)?;
    input.filename = filename;
    Ok(input)
}

/// Threshold a luma image into a crack mask (foreground iff luma > threshold)
pub fn binarize(image: &GrayImage, threshold: u8) -> Result<BinaryMask> {
    let (width, height) = image.dimensions();
    let data = image.pixels().map(|p| p[0] > threshold).collect();
    BinaryMask::new(width, height, data)
}

/// Save an RGB image as PNG
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_binarize_uses_strict_threshold() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 0, Luma([128]));
        img.put_pixel(2, 0, Luma([129]));
        let mask = binarize(&img, DEFAULT_BINARIZE_THRESHOLD).unwrap();
        assert!(!mask.get(0, 0));
        assert!(!mask.get(1, 0));
        assert!(mask.get(2, 0));
    }

    #[test]
    fn test_binarize_empty_image_is_invalid() {
        let img = GrayImage::new(0, 0);
        assert!(matches!(
            binarize(&img, DEFAULT_BINARIZE_THRESHOLD),
            Err(CrackError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_output_name_keeps_subdirectories() {
        let root = Path::new("scans");
        assert_eq!(output_name(root.join("x.png"), root).unwrap(), "x");
        assert_eq!(output_name(root.join("a").join("x.png"), root).unwrap(), "a/x");
        assert_eq!(output_name(root.join("b").join("x.PNG"), root).unwrap(), "b/x");
        assert!(matches!(
            output_name(Path::new("elsewhere/x.png"), root),
            Err(CrackError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_invalid_path() {
        let result = get_png_files_in_dir("/definitely/not/a/real/dir");
        assert!(matches!(result, Err(CrackError::InvalidPath(_))));
    }
}
