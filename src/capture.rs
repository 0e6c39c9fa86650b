//! Frame sources and display sinks.
//!
//! The control loop only talks to the [`FrameSource`] and [`FrameSink`]
//! traits; the camera and the highgui window are the production
//! implementations. Both release what they hold when dropped.

use crate::{Error, Result};
use log::{debug, info, warn};
use opencv::{
    core::Mat,
    highgui::{self, WINDOW_AUTOSIZE},
    imgcodecs,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::Path;

/// Something frames can be read from
pub trait FrameSource {
    /// Read the next frame into `frame`. Returns `Ok(false)` when no frame
    /// was available this time.
    fn read_frame(&mut self, frame: &mut Mat) -> Result<bool>;
}

/// Something annotated frames are presented on
pub trait FrameSink {
    /// Present `image` in the window called `title`
    fn show(&mut self, title: &str, image: &Mat) -> Result<()>;

    /// Wait up to `wait_ms` for a key press. Returns the key code, or `None`.
    fn poll_key(&mut self, wait_ms: i32) -> Result<Option<i32>>;
}

/// Live camera opened through `OpenCV`'s videoio module
pub struct CameraSource {
    index: i32,
    capture: VideoCapture,
}

impl CameraSource {
    /// Open camera `index`; fails with [`Error::DeviceUnavailable`] when the
    /// device cannot be opened
    pub fn open(index: i32) -> Result<Self> {
        info!("Opening camera {}", index);
        let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::DeviceUnavailable(index));
        }
        Ok(Self { index, capture })
    }
}

impl FrameSource for CameraSource {
    fn read_frame(&mut self, frame: &mut Mat) -> Result<bool> {
        Ok(self.capture.read(frame)? && !frame.empty())
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        match self.capture.release() {
            Ok(()) => info!("Released camera {}", self.index),
            Err(e) => warn!("Failed to release camera {}: {}", self.index, e),
        }
    }
}

/// A still image replayed as a static video feed
pub struct StillImageSource {
    image: Mat,
}

impl StillImageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::ImageLoad(format!("path is not valid UTF-8: {}", path.display())))?;
        let image = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR)?;
        if image.empty() {
            return Err(Error::ImageLoad(format!("could not read {}", path.display())));
        }
        info!("Loaded still image {} ({}x{})", path.display(), image.cols(), image.rows());
        Ok(Self { image })
    }

    pub fn from_mat(image: Mat) -> Self {
        Self { image }
    }
}

impl FrameSource for StillImageSource {
    fn read_frame(&mut self, frame: &mut Mat) -> Result<bool> {
        *frame = self.image.try_clone()?;
        Ok(!frame.empty())
    }
}

/// highgui windows; all windows are destroyed on drop
#[derive(Debug, Default)]
pub struct HighGuiSink {
    opened: Vec<String>,
}

impl HighGuiSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for HighGuiSink {
    fn show(&mut self, title: &str, image: &Mat) -> Result<()> {
        if !self.opened.iter().any(|t| t == title) {
            highgui::named_window(title, WINDOW_AUTOSIZE)?;
            self.opened.push(title.to_string());
        }
        highgui::imshow(title, image)?;
        Ok(())
    }

    fn poll_key(&mut self, wait_ms: i32) -> Result<Option<i32>> {
        let key = highgui::wait_key(wait_ms)?;
        Ok((key >= 0).then_some(key))
    }
}

impl Drop for HighGuiSink {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!("Failed to close windows: {}", e);
        } else {
            debug!("Closed {} window(s)", self.opened.len());
        }
    }
}

/// Sink for runs without a display; frames are dropped and no key is ever
/// pressed
#[derive(Debug, Default)]
pub struct HeadlessSink;

impl FrameSink for HeadlessSink {
    fn show(&mut self, _title: &str, _image: &Mat) -> Result<()> {
        Ok(())
    }

    fn poll_key(&mut self, _wait_ms: i32) -> Result<Option<i32>> {
        Ok(None)
    }
}
