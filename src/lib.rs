//! Live object measurement from a camera feed.
//!
//! Every frame goes through the same one-way pipeline:
//! 1. Preprocess: grayscale, Gaussian blur, inverted adaptive threshold and
//!    morphological closing produce a binary foreground mask
//! 2. Extract the external contours of the mask
//! 3. Measure each contour whose area is inside the admitted range: rotated
//!    bounding box, canonical corner order, edge midpoints and the two
//!    midpoint distances converted to physical units
//! 4. Render the measurements and the object count onto the frame
//!
//! # Example
//!
//! ```no_run
//! use sunpou::{app::process_frame, config::Config, geometry::OpenCvGeometry, measure::Calibration};
//! use opencv::imgcodecs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut calibration = Calibration::from_config(&config.measure);
//! let frame = imgcodecs::imread("desk.jpg", imgcodecs::IMREAD_COLOR)?;
//!
//! let processed = process_frame(&frame, &config, &OpenCvGeometry, &mut calibration)?;
//! for object in &processed.report.objects {
//!     println!("{:.1} x {:.1} {}", object.width, object.length, config.measure.unit);
//! }
//! # Ok(())
//! # }
//! ```

/// Capture → measure → render control loop
pub mod app;

/// Frame sources and display sinks
pub mod capture;

/// Configuration management
pub mod config;

/// Error types and result handling
pub mod error;

/// Contour extraction, rotated boxes and point helpers
pub mod geometry;

/// Area filtering and unit conversion
pub mod measure;

/// Binary mask extraction
pub mod preprocess;

/// Overlay drawing
pub mod render;

/// Session statistics
pub mod utils;

pub use error::{Error, Result};
