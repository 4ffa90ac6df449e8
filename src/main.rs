//! Gesture control application: landmarks in, pointer and capture actions out.

use anyhow::{bail, Context, Result};
use clap::Parser;
use gesture_control::{
    app::{GestureSession, RunSummary, SystemClock},
    config::{Config, Profile},
    cursor_control::X11Input,
    input::{InputController, RecordedInput},
    media::{DisplaySink, Frame, FrameSource, LandmarkEstimator, MediaSink, NoDisplay, RecordedMedia},
    replay::{ReplayEstimator, ReplaySource},
};
use log::{info, warn};
use std::{path::PathBuf, sync::atomic::Ordering};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Preset bindings (mouse, camera, air, all)
    #[arg(short, long, default_value = "camera")]
    profile: Profile,

    /// Path to configuration file (YAML format); overrides the profile
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Replay landmarks from a JSON-lines file, or `-` for stdin
    #[arg(short, long)]
    landmarks: Option<String>,

    /// Landmark detector command for live frames
    #[arg(short, long)]
    bridge: Option<String>,

    /// Camera index to use
    #[cfg(feature = "opencv")]
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Video file to process instead of the camera
    #[cfg(feature = "opencv")]
    #[arg(short, long)]
    video: Option<String>,

    /// Log pointer and button commands instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// Show the preview window
    #[arg(short, long)]
    gui: bool,

    /// Directory for photos and videos
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Flip camera frames horizontally
    #[arg(short, long)]
    mirror: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(path) = &args.config {
        info!("Loading configuration from: {}", path.display());
        Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Config::for_profile(args.profile)
    };

    if let Some(dir) = &args.output_dir {
        config.recording.output_dir = dir.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn create_input(dry_run: bool) -> Box<dyn InputController> {
    if dry_run {
        info!("Dry run: input commands are only logged");
        return Box::new(RecordedInput::default());
    }

    match X11Input::new() {
        Ok(input) => {
            info!("X11 input control initialized");
            Box::new(input)
        }
        Err(e) => {
            warn!("Failed to initialize input control: {}. Falling back to dry run.", e);
            Box::new(RecordedInput::default())
        }
    }
}

fn run_session<F, M, S, E, D>(
    config: Config,
    input: Box<dyn InputController>,
    media: M,
    source: &mut S,
    estimator: &mut E,
    display: &mut D,
) -> Result<RunSummary>
where
    F: Frame,
    M: MediaSink<F>,
    S: FrameSource<Frame = F>,
    E: LandmarkEstimator<F>,
    D: DisplaySink<F>,
{
    let mut session = GestureSession::new(config, input, media)?;

    let stop = session.stop_handle();
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    Ok(session.run(source, estimator, display, &SystemClock::new()))
}

#[cfg(feature = "opencv")]
fn run_camera(args: &Args, config: Config, input: Box<dyn InputController>) -> Result<RunSummary> {
    use gesture_control::{
        bridge::ProcessEstimator,
        camera::{CameraSource, HighGuiDisplay, OpenCvMedia, VideoSource},
    };

    let Some(command) = &args.bridge else {
        bail!("Live frames need a landmark detector: pass --bridge <command>");
    };

    let video_source = match &args.video {
        Some(path) => VideoSource::File(path.clone()),
        None => VideoSource::Camera(args.cam),
    };
    let mut source = CameraSource::open(&video_source, args.mirror)?;
    let mut estimator = ProcessEstimator::spawn(command)?;
    let media = OpenCvMedia::new(config.recording.fourcc.clone());

    if args.gui {
        let mut display = HighGuiDisplay::new()?;
        run_session(config, input, media, &mut source, &mut estimator, &mut display)
    } else {
        run_session(config, input, media, &mut source, &mut estimator, &mut NoDisplay)
    }
}

#[cfg(not(feature = "opencv"))]
fn run_camera(_args: &Args, _config: Config, _input: Box<dyn InputController>) -> Result<RunSummary> {
    bail!("Built without camera support: pass --landmarks <file|-> or rebuild with --features opencv")
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = load_config(&args)?;

    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    match &args.config {
        Some(path) => info!("Gesture Control (config {})", path.display()),
        None => info!("Gesture Control ({} profile)", args.profile),
    }

    std::fs::create_dir_all(&config.recording.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.recording.output_dir.display()
        )
    })?;

    let input = create_input(args.dry_run);

    let summary = if let Some(landmarks) = &args.landmarks {
        if args.mirror {
            warn!("--mirror only applies to camera frames");
        }
        if args.gui {
            warn!("--gui needs camera frames; replaying without a window");
        }
        // Replayed frames carry no pixels, so captures are logged rather than written
        let media = RecordedMedia::new();
        if landmarks == "-" {
            let mut source = ReplaySource::stdin();
            run_session(config, input, media, &mut source, &mut ReplayEstimator, &mut NoDisplay)?
        } else {
            let mut source = ReplaySource::open(landmarks)?;
            run_session(config, input, media, &mut source, &mut ReplayEstimator, &mut NoDisplay)?
        }
    } else {
        run_camera(&args, config, input)?
    };

    info!(
        "Processed {} frames, stopped by {}",
        summary.frames_processed, summary.exit_reason
    );
    Ok(())
}
