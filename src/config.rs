//! Configuration management for the measurement application

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ESC key code as reported by `highgui::wait_key`
pub const ESC_KEY: i32 = 27;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture loop configuration
    pub capture: CaptureConfig,

    /// Preprocessing parameters
    pub preprocess: PreprocessConfig,

    /// Measurement parameters
    pub measure: MeasureConfig,
}

/// Capture device and control loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera index
    pub device: i32,

    /// Consecutive failed reads tolerated before the loop gives up
    pub max_consecutive_failures: u32,

    /// Key poll wait in milliseconds
    pub key_wait_ms: i32,

    /// Key code that stops the loop
    pub exit_key: i32,

    /// Title of the display window
    pub window_title: String,
}

/// Mask extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian kernel side length (odd)
    pub blur_kernel: i32,

    /// Gaussian sigma, 0 derives it from the kernel size
    pub blur_sigma: f64,

    /// Adaptive threshold neighbourhood size (odd, at least 3)
    pub block_size: i32,

    /// Constant subtracted from the weighted local mean
    pub offset: f64,

    /// Closing structuring element side length
    pub close_kernel: i32,

    /// Closing iterations
    pub close_iterations: i32,
}

/// Object admission and unit conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Smallest admitted contour area in square pixels
    pub min_area: f64,

    /// Largest admitted contour area in square pixels
    pub max_area: f64,

    /// Fixed pixel-to-unit ratio
    pub pixels_per_unit: f64,

    /// Unit label drawn after each measurement
    pub unit: String,

    /// Known length of the reference object. When set, the first object of
    /// the session calibrates the pixel-to-unit ratio.
    pub reference_length: Option<f64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: 0,
            max_consecutive_failures: 30,
            key_wait_ms: 1,
            exit_key: ESC_KEY,
            window_title: "camera".to_string(),
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 15,
            blur_sigma: 0.0,
            block_size: 11,
            offset: 2.0,
            close_kernel: 3,
            close_iterations: 3,
        }
    }
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            min_area: 1000.0,
            max_area: 120_000.0,
            pixels_per_unit: 25.5,
            unit: "CM".to_string(),
            reference_length: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.capture.key_wait_ms < 1 {
            return Err(Error::Config("Key wait must be at least 1 ms".to_string()));
        }
        if self.capture.max_consecutive_failures == 0 {
            return Err(Error::Config("Failure budget must be greater than 0".to_string()));
        }

        let p = &self.preprocess;
        if p.blur_kernel < 1 || p.blur_kernel % 2 == 0 {
            return Err(Error::Config("Blur kernel size must be odd and greater than 0".to_string()));
        }
        if p.block_size < 3 || p.block_size % 2 == 0 {
            return Err(Error::Config("Threshold block size must be odd and at least 3".to_string()));
        }
        if p.close_kernel < 1 || p.close_iterations < 0 {
            return Err(Error::Config("Closing kernel must be positive and iterations non-negative".to_string()));
        }

        let m = &self.measure;
        if m.min_area < 0.0 || m.min_area > m.max_area {
            return Err(Error::Config(format!(
                "Area bounds are inverted or negative: {} > {}",
                m.min_area, m.max_area
            )));
        }
        if m.pixels_per_unit <= 0.0 {
            return Err(Error::Config("Pixels per unit must be greater than 0".to_string()));
        }
        if let Some(length) = m.reference_length {
            if length <= 0.0 {
                return Err(Error::Config("Reference length must be greater than 0".to_string()));
            }
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Object measurement configuration

capture:
  device: 0
  max_consecutive_failures: 30
  key_wait_ms: 1
  exit_key: 27
  window_title: "camera"

preprocess:
  blur_kernel: 15
  blur_sigma: 0.0
  block_size: 11
  offset: 2.0
  close_kernel: 3
  close_iterations: 3

measure:
  min_area: 1000.0
  max_area: 120000.0
  pixels_per_unit: 25.5
  unit: "CM"
  # reference_length: 2.5
"#;
