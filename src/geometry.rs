//! Shape geometry: contour extraction, rotated bounding boxes and the small
//! point helpers the measurer builds on.

use crate::Result;
use opencv::{
    core::{Mat, Point, Point2f, Vector},
    imgproc::{self, CHAIN_APPROX_SIMPLE, RETR_EXTERNAL},
    prelude::*,
};
use std::cmp::Ordering;

/// Closed boundary of a connected foreground region
pub type Contour = Vector<Point>;

/// Corners of a rotated rectangle in canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub tl: Point2f,
    pub tr: Point2f,
    pub br: Point2f,
    pub bl: Point2f,
}

/// Midpoints of the four edges of a [`Corners`] box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Midpoints {
    pub top: Point2f,
    pub bottom: Point2f,
    pub left: Point2f,
    pub right: Point2f,
}

impl Corners {
    pub fn as_array(&self) -> [Point2f; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    pub fn midpoints(&self) -> Midpoints {
        Midpoints {
            top: midpoint(self.tl, self.tr),
            bottom: midpoint(self.bl, self.br),
            left: midpoint(self.tl, self.bl),
            right: midpoint(self.tr, self.br),
        }
    }
}

/// Geometry capabilities needed by the measurer.
///
/// Kept narrow so a different vision backend only has to provide contour
/// tracing, polygon area and minimum-area rectangles.
pub trait ShapeGeometry {
    /// Outermost contours of the foreground regions in `mask`, in tracing order
    fn extract_contours(&self, mask: &Mat) -> Result<Vec<Contour>>;

    /// Enclosed area of a contour in square pixels
    fn contour_area(&self, contour: &Contour) -> Result<f64>;

    /// Corners of the minimum-area rotated rectangle around `contour`, in no
    /// particular order
    fn min_area_rect(&self, contour: &Contour) -> Result<[Point2f; 4]>;

    fn order_corners(&self, corners: [Point2f; 4]) -> Corners {
        order_corners(corners)
    }
}

/// [`ShapeGeometry`] backed by `OpenCV`'s imgproc module
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvGeometry;

impl ShapeGeometry for OpenCvGeometry {
    fn extract_contours(&self, mask: &Mat) -> Result<Vec<Contour>> {
        let mut contours = Vector::<Contour>::new();
        imgproc::find_contours(
            mask,
            &mut contours,
            RETR_EXTERNAL,
            CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )?;
        Ok(contours.into_iter().collect())
    }

    fn contour_area(&self, contour: &Contour) -> Result<f64> {
        Ok(imgproc::contour_area(contour, false)?)
    }

    fn min_area_rect(&self, contour: &Contour) -> Result<[Point2f; 4]> {
        let rect = imgproc::min_area_rect(contour)?;
        let mut pts = [Point2f::default(); 4];
        rect.points(&mut pts)?;
        Ok(pts)
    }
}

fn by_x_then_y(a: &Point2f, b: &Point2f) -> Ordering {
    a.x.partial_cmp(&b.x)
        .unwrap_or(Ordering::Equal)
        .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
}

/// Order four rectangle corners as top-left, top-right, bottom-right,
/// bottom-left.
///
/// The two left-most points give top-left and bottom-left by their y
/// coordinate; of the remaining two, the one farther from top-left is the
/// bottom-right corner (it lies on the diagonal). The result only depends on
/// the set of points, not on the order they are passed in.
pub fn order_corners(corners: [Point2f; 4]) -> Corners {
    let mut pts = corners;
    pts.sort_by(by_x_then_y);

    let (mut tl, mut bl) = (pts[0], pts[1]);
    if bl.y < tl.y {
        std::mem::swap(&mut tl, &mut bl);
    }

    let (mut tr, mut br) = (pts[2], pts[3]);
    match distance(tl, tr).partial_cmp(&distance(tl, br)) {
        Some(Ordering::Greater) => std::mem::swap(&mut tr, &mut br),
        Some(Ordering::Equal) if br.y < tr.y => std::mem::swap(&mut tr, &mut br),
        _ => {}
    }

    Corners { tl, tr, br, bl }
}

/// Arithmetic mean of two points
pub fn midpoint(a: Point2f, b: Point2f) -> Point2f {
    Point2f::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

/// Euclidean distance in pixels
pub fn distance(a: Point2f, b: Point2f) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    dx.hypot(dy)
}

/// Round a sub-pixel point to the integer grid used by the drawing calls
pub fn to_pixel(p: Point2f) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}
