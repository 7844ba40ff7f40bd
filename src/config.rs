use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::compliance::ComplianceLimits;
use crate::errors::{CrackError, Result};
use crate::image_io::DEFAULT_BINARIZE_THRESHOLD;
use crate::render::RenderStyle;

/// Configuration for a crack analysis run
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    /// Physical length of one pixel edge (e.g. mm per pixel)
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: f64,

    #[serde(default = "default_binarize_threshold")]
    pub binarize_threshold: u8,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    /// Write mask, skeleton and overlay PNGs next to the reports
    #[serde(default = "default_save_images")]
    pub save_images: bool,

    #[serde(default = "default_limits")]
    pub limits: ComplianceLimits,

    #[serde(default)]
    pub render: RenderStyle,
}

fn default_pixel_scale() -> f64 {
    1.0
}

fn default_binarize_threshold() -> u8 {
    DEFAULT_BINARIZE_THRESHOLD
}

fn default_parallel() -> bool {
    true
}

fn default_save_images() -> bool {
    true
}

fn default_limits() -> ComplianceLimits {
    ComplianceLimits {
        max_width_limit: Some(1.0),
        avg_width_limit: Some(1.0),
        area_ratio_limit: Some(1.0),
        length_limit: Some(100.0),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            pixel_scale: default_pixel_scale(),
            binarize_threshold: default_binarize_threshold(),
            use_parallel: default_parallel(),
            save_images: default_save_images(),
            limits: default_limits(),
            render: RenderStyle::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CrackError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| CrackError::ConfigLoad {
            source: e,
            path: path.to_path_buf(),
        })
    }

    /// Validate analysis parameters
    pub fn validate(&self) -> Result<()> {
        if !self.pixel_scale.is_finite() || self.pixel_scale <= 0.0 {
            return Err(CrackError::Config(
                "pixel_scale must be > 0.0".to_string(),
            ));
        }

        if self.binarize_threshold == u8::MAX {
            return Err(CrackError::Config(
                "binarize_threshold must be < 255 or no pixel can be foreground".to_string(),
            ));
        }

        if let Some(ratio) = self.limits.area_ratio_limit {
            if ratio > 1.0 {
                return Err(CrackError::Config(
                    "limits.area_ratio_limit is a fraction and must be <= 1.0".to_string(),
                ));
            }
        }

        self.limits
            .validate()
            .map_err(|e| CrackError::Config(e.to_string()))?;

        Ok(())
    }

    /// Check that the configured input exists
    pub fn validate_input_path(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(CrackError::InvalidPath(input_path));
        }
        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            CrackError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            input_path = "cracks"
            output_base_dir = "out"
            "#,
        )
        .unwrap();
        assert_eq!(config.input_path, "cracks");
        assert_eq!(config.pixel_scale, 1.0);
        assert_eq!(config.binarize_threshold, 128);
        assert_eq!(config.limits, default_limits());
        assert_eq!(config.render, RenderStyle::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_limits_leave_others_unset() {
        let config: Config = toml::from_str(
            r#"
            input_path = "cracks"
            output_base_dir = "out"
            pixel_scale = 0.1

            [limits]
            max_width_limit = 0.3
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_width_limit, Some(0.3));
        assert_eq!(config.limits.length_limit, None);
        assert_eq!(config.pixel_scale, 0.1);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.pixel_scale = 0.0;
        assert!(matches!(config.validate(), Err(CrackError::Config(_))));

        let mut config = Config::default();
        config.limits.area_ratio_limit = Some(40.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.limits.length_limit = Some(-5.0);
        assert!(config.validate().is_err());
    }
}
