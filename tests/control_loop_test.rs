//! Control loop behavior with scripted sources and sinks


use opencv::core::Rect;
use sunpou::{
    app::{LoopSignal, MeasureApp, MASK_WINDOW},
    capture::StillImageSource,
    config::{Config, ESC_KEY},
    Error,
};
use test_helpers::{frame_with_rects, ScriptedSink, ScriptedSource};

fn frame() -> Option<opencv::core::Mat> {
    Some(frame_with_rects(200, 200, &[Rect::new(50, 75, 100, 50)]).unwrap())
}

fn config_with_budget(failures: u32) -> Config {
    let mut config = Config::default();
    config.capture.max_consecutive_failures = failures;
    config
}

#[test]
fn test_escape_stops_loop() {
    let source = ScriptedSource::new(vec![frame(), frame(), frame()]);
    let sink = ScriptedSink::with_keys(vec![None, Some(ESC_KEY)]);
    let mut app = MeasureApp::new(Config::default(), source, sink);

    app.run().unwrap();
    assert_eq!(app.stats().frames, 2);
    assert_eq!(app.stats().objects, 2);
}

#[test]
fn test_other_keys_are_ignored() {
    let source = ScriptedSource::new(vec![frame(), frame()]);
    let sink = ScriptedSink::with_keys(vec![Some('q' as i32), Some(32)]);
    let mut app = MeasureApp::new(Config::default(), source, sink);

    assert_eq!(app.step().unwrap(), LoopSignal::Continue);
    assert_eq!(app.step().unwrap(), LoopSignal::Continue);
}

#[test]
fn test_transient_miss_is_skipped() {
    let source = ScriptedSource::new(vec![None, frame()]);
    let mut app = MeasureApp::new(Config::default(), source, ScriptedSink::default());

    assert_eq!(app.step().unwrap(), LoopSignal::Continue);
    assert_eq!(app.step().unwrap(), LoopSignal::Continue);
    assert_eq!(app.stats().missed_frames, 1);
    assert_eq!(app.stats().frames, 1);

    let (_, sink) = app.into_parts();
    assert_eq!(*sink.shown.borrow(), vec!["camera".to_string()]);
}

#[test]
fn test_escape_during_miss_stops_loop() {
    let source = ScriptedSource::new(vec![None]);
    let sink = ScriptedSink::with_keys(vec![Some(ESC_KEY)]);
    let mut app = MeasureApp::new(Config::default(), source, sink);

    assert_eq!(app.step().unwrap(), LoopSignal::Stop);
}

#[test]
fn test_consecutive_misses_end_with_capture_error() {
    let source = ScriptedSource::new(vec![]);
    let released = source.released.clone();
    let mut app = MeasureApp::new(config_with_budget(3), source, ScriptedSink::default());

    let result = app.run();
    assert!(matches!(result, Err(Error::Capture(_))));
    assert_eq!(app.stats().missed_frames, 3);

    drop(app);
    assert!(released.get());
}

#[test]
fn test_successful_read_resets_failure_count() {
    let source = ScriptedSource::new(vec![None, frame(), None, frame(), None]);
    let mut app = MeasureApp::new(config_with_budget(2), source, ScriptedSink::default());

    for _ in 0..5 {
        assert_eq!(app.step().unwrap(), LoopSignal::Continue);
    }
    // script exhausted: second miss in a row
    assert!(matches!(app.step(), Err(Error::Capture(_))));
}

#[test]
fn test_frame_limit_stops_loop() {
    let image = frame_with_rects(200, 200, &[Rect::new(50, 75, 100, 50)]).unwrap();
    let mut app = MeasureApp::new(Config::default(), StillImageSource::from_mat(image), ScriptedSink::default())
        .with_frame_limit(Some(3));

    app.run().unwrap();
    assert_eq!(app.stats().frames, 3);
    assert_eq!(app.stats().objects, 3);
    assert_eq!(app.stats().width_stats().unwrap().samples, 3);
}

#[test]
fn test_mask_window_in_debug_mode() {
    let source = ScriptedSource::new(vec![frame()]);
    let mut app = MeasureApp::new(Config::default(), source, ScriptedSink::default()).with_mask_window(true);

    app.step().unwrap();
    let (_, sink) = app.into_parts();
    assert_eq!(*sink.shown.borrow(), vec!["camera".to_string(), MASK_WINDOW.to_string()]);
}

#[test]
fn test_reference_calibration_persists_across_frames() {
    let mut config = Config::default();
    config.measure.reference_length = Some(4.0);
    let source = ScriptedSource::new(vec![frame(), frame()]);
    let mut app = MeasureApp::new(config, source, ScriptedSink::default());

    app.step().unwrap();
    let ratio = app.calibration().pixels_per_unit().unwrap();
    app.step().unwrap();
    assert_eq!(app.calibration().pixels_per_unit(), Some(ratio));

    let lengths = app.stats().length_stats().unwrap();
    assert!((lengths.mean - 4.0).abs() < 1e-9);
}
