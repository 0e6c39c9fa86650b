//! Main application module: the capture → preprocess → measure → render loop.

use crate::{
    capture::{FrameSink, FrameSource},
    config::Config,
    geometry::{OpenCvGeometry, ShapeGeometry},
    measure::{measure_mask, Calibration, FrameReport},
    preprocess::foreground_mask,
    render::draw_report,
    utils::SessionStats,
    Error, Result,
};
use log::{debug, info, warn};
use opencv::{core::Mat, prelude::*};

/// Outcome of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    /// Keep going
    Continue,
    /// Shut down
    Stop,
}

/// Window title of the binary mask shown in debug mode
pub const MASK_WINDOW: &str = "mask";

/// Result of processing one frame
#[derive(Debug)]
pub struct ProcessedFrame {
    pub mask: Mat,
    pub report: FrameReport,
}

/// Run the measuring pipeline on one frame without drawing anything
pub fn process_frame<G: ShapeGeometry + ?Sized>(
    frame: &Mat,
    config: &Config,
    geometry: &G,
    calibration: &mut Calibration,
) -> Result<ProcessedFrame> {
    let mask = foreground_mask(frame, &config.preprocess)?;
    let report = measure_mask(geometry, &mask, &config.measure, calibration)?;
    Ok(ProcessedFrame { mask, report })
}

/// A measuring session over one frame source and one display
pub struct MeasureApp<S: FrameSource, D: FrameSink> {
    config: Config,
    source: S,
    sink: D,
    geometry: OpenCvGeometry,
    calibration: Calibration,
    stats: SessionStats,
    consecutive_failures: u32,
    show_mask: bool,
    max_frames: Option<u64>,
}

impl<S: FrameSource, D: FrameSink> MeasureApp<S, D> {
    pub fn new(config: Config, source: S, sink: D) -> Self {
        let calibration = Calibration::from_config(&config.measure);
        Self {
            config,
            source,
            sink,
            geometry: OpenCvGeometry,
            calibration,
            stats: SessionStats::default(),
            consecutive_failures: 0,
            show_mask: false,
            max_frames: None,
        }
    }

    /// Also present the binary mask in its own window
    pub fn with_mask_window(mut self, show: bool) -> Self {
        self.show_mask = show;
        self
    }

    /// Stop after this many successfully processed frames
    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.max_frames = limit;
        self
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    fn key_signal(&mut self) -> Result<LoopSignal> {
        match self.sink.poll_key(self.config.capture.key_wait_ms)? {
            Some(key) if key == self.config.capture.exit_key => {
                info!("Exit requested by user");
                Ok(LoopSignal::Stop)
            }
            _ => Ok(LoopSignal::Continue),
        }
    }

    fn handle_miss(&mut self) -> Result<LoopSignal> {
        self.consecutive_failures += 1;
        self.stats.record_miss();
        let budget = self.config.capture.max_consecutive_failures;
        if self.consecutive_failures >= budget {
            return Err(Error::Capture(format!(
                "{} consecutive frame reads failed",
                self.consecutive_failures
            )));
        }
        warn!(
            "Failed to read frame ({}/{}), skipping",
            self.consecutive_failures, budget
        );
        self.key_signal()
    }

    /// Run one iteration: read, measure, draw, show and poll the exit key
    pub fn step(&mut self) -> Result<LoopSignal> {
        let mut frame = Mat::default();
        if !self.source.read_frame(&mut frame)? || frame.empty() {
            return self.handle_miss();
        }
        self.consecutive_failures = 0;

        let processed = process_frame(&frame, &self.config, &self.geometry, &mut self.calibration)?;
        debug!("Frame {}: {} object(s)", self.stats.frames, processed.report.count());

        draw_report(&mut frame, &processed.report, &self.config.measure.unit)?;
        self.sink.show(&self.config.capture.window_title, &frame)?;
        if self.show_mask {
            self.sink.show(MASK_WINDOW, &processed.mask)?;
        }
        self.stats.record(&processed.report);

        if self.key_signal()? == LoopSignal::Stop {
            return Ok(LoopSignal::Stop);
        }
        match self.max_frames {
            Some(limit) if self.stats.frames >= limit => {
                info!("Frame limit of {} reached", limit);
                Ok(LoopSignal::Stop)
            }
            _ => Ok(LoopSignal::Continue),
        }
    }

    /// Run until the exit key, the frame limit, or a capture failure
    pub fn run(&mut self) -> Result<()> {
        info!("Entering main loop");
        let result = loop {
            match self.step() {
                Ok(LoopSignal::Continue) => {}
                Ok(LoopSignal::Stop) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.stats.log_summary(&self.config.measure.unit);
        info!("Application shutting down");
        result
    }

    /// Hand back the source and sink, e.g. to inspect them after a run
    pub fn into_parts(self) -> (S, D) {
        (self.source, self.sink)
    }
}
