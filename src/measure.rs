//! Per-object measurement: area admission, rotated box, midpoint distances and
//! conversion to physical units.

use crate::{
    config::MeasureConfig,
    geometry::{distance, Contour, Corners, Midpoints, ShapeGeometry},
    Result,
};
use log::{debug, info, trace};
use opencv::core::Mat;

/// Pixel-to-unit conversion for a measuring session
#[derive(Debug, Clone, PartialEq)]
pub enum Calibration {
    /// Constant ratio, independent of what is in view
    Fixed { pixels_per_unit: f64 },
    /// The first admitted object has a known length; its pixel length fixes
    /// the ratio for the rest of the session
    Reference {
        reference_length: f64,
        pixels_per_unit: Option<f64>,
    },
}

impl Calibration {
    pub fn from_config(config: &MeasureConfig) -> Self {
        match config.reference_length {
            Some(reference_length) => Calibration::Reference {
                reference_length,
                pixels_per_unit: None,
            },
            None => Calibration::Fixed {
                pixels_per_unit: config.pixels_per_unit,
            },
        }
    }

    /// Current ratio, if one is known yet
    pub fn pixels_per_unit(&self) -> Option<f64> {
        match self {
            Calibration::Fixed { pixels_per_unit } => Some(*pixels_per_unit),
            Calibration::Reference { pixels_per_unit, .. } => *pixels_per_unit,
        }
    }

    /// Ratio to use for an object of `length_px`, calibrating on first use
    fn resolve(&mut self, length_px: f64) -> f64 {
        match self {
            Calibration::Fixed { pixels_per_unit } => *pixels_per_unit,
            Calibration::Reference {
                reference_length,
                pixels_per_unit,
            } => *pixels_per_unit.get_or_insert_with(|| {
                let ratio = length_px / *reference_length;
                info!(
                    "Calibrated on reference object: {:.2} px over {} units = {:.3} px/unit",
                    length_px, reference_length, ratio
                );
                ratio
            }),
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration::from_config(&MeasureConfig::default())
    }
}

/// Measurement of one admitted object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMeasurement {
    /// Contour area in square pixels
    pub area: f64,
    pub corners: Corners,
    pub midpoints: Midpoints,
    /// Distance between the top and bottom edge midpoints
    pub width_px: f64,
    /// Distance between the left and right edge midpoints
    pub length_px: f64,
    /// `width_px` in physical units
    pub width: f64,
    /// `length_px` in physical units
    pub length: f64,
}

/// All objects admitted in one frame, in contour extraction order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub objects: Vec<ObjectMeasurement>,
}

impl FrameReport {
    /// Number of objects that passed the area filter
    pub fn count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn admits(config: &MeasureConfig, area: f64) -> bool {
    area >= config.min_area && area <= config.max_area
}

/// Measure every contour whose area lies inside the configured bounds.
///
/// Contours outside the bounds (including degenerate ones) are skipped
/// without being reported.
pub fn measure_contours<G: ShapeGeometry + ?Sized>(
    geometry: &G,
    contours: &[Contour],
    config: &MeasureConfig,
    calibration: &mut Calibration,
) -> Result<FrameReport> {
    let mut report = FrameReport::default();

    for (idx, contour) in contours.iter().enumerate() {
        let area = geometry.contour_area(contour)?;
        if !admits(config, area) {
            trace!("Skipping contour {} with area {:.1}", idx, area);
            continue;
        }

        let corners = geometry.order_corners(geometry.min_area_rect(contour)?);
        let midpoints = corners.midpoints();
        let width_px = distance(midpoints.top, midpoints.bottom);
        let length_px = distance(midpoints.left, midpoints.right);
        let ratio = calibration.resolve(length_px);

        report.objects.push(ObjectMeasurement {
            area,
            corners,
            midpoints,
            width_px,
            length_px,
            width: width_px / ratio,
            length: length_px / ratio,
        });
    }

    debug!("{} of {} contours admitted", report.count(), contours.len());
    Ok(report)
}

/// Extract contours from a binary mask and measure them
pub fn measure_mask<G: ShapeGeometry + ?Sized>(
    geometry: &G,
    mask: &Mat,
    config: &MeasureConfig,
    calibration: &mut Calibration,
) -> Result<FrameReport> {
    let contours = geometry.extract_contours(mask)?;
    measure_contours(geometry, &contours, config, calibration)
}
