//! Measure objects in front of a camera and overlay their size.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::info;
use sunpou::{
    app::MeasureApp,
    capture::{CameraSource, FrameSink, FrameSource, HeadlessSink, HighGuiSink, StillImageSource},
    config::Config,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use (overrides the config file)
    #[arg(long)]
    cam: Option<i32>,

    /// Measure a still image instead of the camera feed
    #[arg(short, long)]
    image: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Run without any window
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Enable debug output and show the binary mask
    #[arg(short, long)]
    debug: bool,
}

fn run<S: FrameSource, D: FrameSink>(config: Config, source: S, sink: D, args: &Args) -> Result<()> {
    let max_frames = match (args.max_frames, args.headless, &args.image) {
        (Some(n), _, _) => Some(n),
        // a headless still image has nothing more to show after one frame
        (None, true, Some(_)) => Some(1),
        _ => None,
    };

    let mut app = MeasureApp::new(config, source, sink)
        .with_mask_window(args.debug && !args.headless)
        .with_frame_limit(max_frames);
    app.run().context("measurement loop failed")
}

fn main() -> Result<()> {
    let args = Args::parse();

    dotenv().ok();
    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            Config::from_file(path).with_context(|| format!("failed to load {}", path))?
        }
        None => Config::default(),
    };
    if let Some(cam) = args.cam {
        config.capture.device = cam;
    }
    config.validate().context("invalid configuration")?;

    match (&args.image, args.headless) {
        (Some(path), true) => run(config, StillImageSource::open(path)?, HeadlessSink, &args),
        (Some(path), false) => run(config, StillImageSource::open(path)?, HighGuiSink::new(), &args),
        (None, headless) => {
            let camera = CameraSource::open(config.capture.device)
                .with_context(|| format!("cannot start capture on device {}", config.capture.device))?;
            if headless {
                run(config, camera, HeadlessSink, &args)
            } else {
                run(config, camera, HighGuiSink::new(), &args)
            }
        }
    }
}
