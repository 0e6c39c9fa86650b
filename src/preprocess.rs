//! Foreground mask extraction: grayscale, blur, adaptive threshold and closing.

use crate::{config::PreprocessConfig, Error, Result};
use opencv::{
    core::{Mat, Point, Size, BORDER_CONSTANT, CV_8U},
    imgproc::{
        self, ADAPTIVE_THRESH_GAUSSIAN_C, COLOR_BGR2GRAY, COLOR_BGRA2GRAY, MORPH_CLOSE, THRESH_BINARY_INV,
    },
    prelude::*,
};

fn to_gray(frame: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    match frame.channels() {
        1 => gray = frame.try_clone()?,
        3 => imgproc::cvt_color_def(frame, &mut gray, COLOR_BGR2GRAY)?,
        4 => imgproc::cvt_color_def(frame, &mut gray, COLOR_BGRA2GRAY)?,
        n => return Err(Error::InvalidFrame(format!("unsupported channel count {}", n))),
    }
    Ok(gray)
}

fn apply_blur(gray: &Mat, config: &PreprocessConfig) -> Result<Mat> {
    let mut blurred = Mat::default();
    imgproc::gaussian_blur_def(
        gray,
        &mut blurred,
        Size::new(config.blur_kernel, config.blur_kernel),
        config.blur_sigma,
    )?;
    Ok(blurred)
}

fn apply_thresholding(blurred: &Mat, config: &PreprocessConfig) -> Result<Mat> {
    let mut thresh = Mat::default();
    imgproc::adaptive_threshold(
        blurred,
        &mut thresh,
        255.0,
        ADAPTIVE_THRESH_GAUSSIAN_C,
        THRESH_BINARY_INV,
        config.block_size,
        config.offset,
    )?;
    Ok(thresh)
}

fn apply_closing(thresh: &Mat, config: &PreprocessConfig) -> Result<Mat> {
    let kernel = Mat::ones(config.close_kernel, config.close_kernel, CV_8U)?.to_mat()?;
    let mut closed = Mat::default();
    imgproc::morphology_ex(
        thresh,
        &mut closed,
        MORPH_CLOSE,
        &kernel,
        Point::new(-1, -1),
        config.close_iterations,
        BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;
    Ok(closed)
}

/// Turn a color (or already gray) frame into a binary foreground mask of the
/// same size. Foreground pixels are 255, background 0.
pub fn foreground_mask(frame: &Mat, config: &PreprocessConfig) -> Result<Mat> {
    if frame.empty() {
        return Err(Error::InvalidFrame("frame is empty".to_string()));
    }

    let gray = to_gray(frame)?;
    let blurred = apply_blur(&gray, config)?;
    let thresh = apply_thresholding(&blurred, config)?;
    apply_closing(&thresh, config)
}
