use crate::measure::FrameReport;
use log::info;
use std::collections::VecDeque;

/// Summary of a series of measurements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub samples: usize,
}

/// Mean, population standard deviation, min, max and median of `values`.
/// Returns `None` for an empty slice.
pub fn calculate_statistics(values: &[f64]) -> Option<Statistics> {
    if values.is_empty() {
        return None;
    }

    let len = values.len() as f64;
    let mean = values.iter().sum::<f64>() / len;

    let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / len;
    let std_dev = variance.sqrt();

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut sorted_values = values.to_vec();
    sorted_values.sort_by(f64::total_cmp);
    let median = if sorted_values.len() % 2 == 0 {
        let mid = sorted_values.len() / 2;
        (sorted_values[mid - 1] + sorted_values[mid]) / 2.0
    } else {
        sorted_values[sorted_values.len() / 2]
    };

    Some(Statistics {
        mean,
        std_dev,
        min,
        max,
        median,
        samples: values.len(),
    })
}

/// Samples kept for the median of a [`RunningStats`]
pub const MEDIAN_WINDOW: usize = 256;

/// Streaming mean, variance (Welford), min and max over every sample, with
/// the median taken over the most recent [`MEDIAN_WINDOW`] samples
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    recent: VecDeque<f64>,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);

        if self.recent.len() == MEDIAN_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(value);
    }

    /// Number of samples currently held for the median
    pub fn retained(&self) -> usize {
        self.recent.len()
    }

    pub fn summary(&self) -> Option<Statistics> {
        if self.count == 0 {
            return None;
        }
        let window: Vec<f64> = self.recent.iter().copied().collect();
        let median = calculate_statistics(&window)?.median;
        Some(Statistics {
            mean: self.mean,
            std_dev: (self.m2 / self.count as f64).sqrt(),
            min: self.min,
            max: self.max,
            median,
            samples: self.count as usize,
        })
    }
}

/// Running tallies over every frame of a measuring session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub frames: u64,
    pub missed_frames: u64,
    pub objects: u64,
    widths: RunningStats,
    lengths: RunningStats,
}

impl SessionStats {
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.objects += report.count() as u64;
        for object in &report.objects {
            self.widths.push(object.width);
            self.lengths.push(object.length);
        }
    }

    pub fn record_miss(&mut self) {
        self.missed_frames += 1;
    }

    pub fn width_stats(&self) -> Option<Statistics> {
        self.widths.summary()
    }

    pub fn length_stats(&self) -> Option<Statistics> {
        self.lengths.summary()
    }

    /// Samples held in memory for the width and length medians
    pub fn retained_samples(&self) -> usize {
        self.widths.retained() + self.lengths.retained()
    }

    /// Log the session summary
    pub fn log_summary(&self, unit: &str) {
        info!(
            "Processed {} frame(s), {} missed, {} object measurement(s)",
            self.frames, self.missed_frames, self.objects
        );
        match (self.width_stats(), self.length_stats()) {
            (Some(w), Some(l)) => {
                info!(
                    "Width - Average: {:.2}{unit}, Std Dev: {:.2}, Min: {:.2}, Max: {:.2}, Median (recent): {:.2}",
                    w.mean, w.std_dev, w.min, w.max, w.median
                );
                info!(
                    "Length - Average: {:.2}{unit}, Std Dev: {:.2}, Min: {:.2}, Max: {:.2}, Median (recent): {:.2}",
                    l.mean, l.std_dev, l.min, l.max, l.median
                );
            }
            _ => info!("No objects measured."),
        }
    }
}
