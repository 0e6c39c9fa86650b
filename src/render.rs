//! Overlay drawing for measured objects.

use crate::{
    geometry::to_pixel,
    measure::{FrameReport, ObjectMeasurement},
    Result,
};
use opencv::{
    core::{Mat, Point, Scalar, Vector},
    imgproc::{self, FILLED, FONT_HERSHEY_SIMPLEX, LINE_8, LINE_AA},
};

fn box_color() -> Scalar {
    Scalar::new(0.0, 255.0, 64.0, 0.0)
}

fn line_color() -> Scalar {
    Scalar::new(255.0, 0.0, 255.0, 0.0)
}

fn text_color() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

/// Text of the frame-level object counter
pub fn count_label(count: usize) -> String {
    format!("objects: {}", count)
}

/// Label placed beside the right edge, top-to-bottom extent
pub fn width_label(object: &ObjectMeasurement, unit: &str) -> String {
    format!("L: {:.1}{}", object.width, unit)
}

/// Label placed above the top edge, left-to-right extent
pub fn length_label(object: &ObjectMeasurement, unit: &str) -> String {
    format!("B: {:.1}{}", object.length, unit)
}

fn draw_object(image: &mut Mat, object: &ObjectMeasurement, unit: &str) -> Result<()> {
    let outline: Vector<Point> = object.corners.as_array().into_iter().map(to_pixel).collect();
    let outlines = Vector::<Vector<Point>>::from_iter([outline]);
    imgproc::draw_contours(
        image,
        &outlines,
        -1,
        box_color(),
        2,
        LINE_8,
        &Mat::default(),
        i32::MAX,
        Point::new(0, 0),
    )?;

    for corner in object.corners.as_array() {
        imgproc::circle(image, to_pixel(corner), 5, box_color(), FILLED, LINE_8, 0)?;
    }

    let mids = &object.midpoints;
    for mid in [mids.top, mids.bottom, mids.left, mids.right] {
        imgproc::circle(image, to_pixel(mid), 0, box_color(), 5, LINE_8, 0)?;
    }

    imgproc::line(image, to_pixel(mids.top), to_pixel(mids.bottom), line_color(), 2, LINE_8, 0)?;
    imgproc::line(image, to_pixel(mids.left), to_pixel(mids.right), line_color(), 2, LINE_8, 0)?;

    let right = to_pixel(mids.right);
    imgproc::put_text(
        image,
        &width_label(object, unit),
        Point::new(right.x + 10, right.y),
        FONT_HERSHEY_SIMPLEX,
        0.7,
        text_color(),
        2,
        LINE_8,
        false,
    )?;

    let top = to_pixel(mids.top);
    imgproc::put_text(
        image,
        &length_label(object, unit),
        Point::new(top.x - 15, top.y - 10),
        FONT_HERSHEY_SIMPLEX,
        0.7,
        text_color(),
        2,
        LINE_8,
        false,
    )?;

    Ok(())
}

/// Draw every measured object and the object counter onto `image` in place
pub fn draw_report(image: &mut Mat, report: &FrameReport, unit: &str) -> Result<()> {
    for object in &report.objects {
        draw_object(image, object, unit)?;
    }

    imgproc::put_text(
        image,
        &count_label(report.count()),
        Point::new(10, 50),
        FONT_HERSHEY_SIMPLEX,
        1.0,
        text_color(),
        2,
        LINE_AA,
        false,
    )?;

    Ok(())
}
