use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;
use log::{error, info, warn};

use logoscan_cli::{
    CancelFlag, FeatureExtractor, Frame, MatchFilter, RunConfig, RunFailure, ScanError,
    SourceLocator, init_thread_pool, load_image, run_from_config, save_csv,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Logoscan: logo detection in video",
    long_about = "Scans video frames for a reference logo using corner features and \
                  descriptor matching, and reports a per-frame verdict."
)]
struct Cli {
    /// Reference logo image
    #[arg(short = 'l', long = "logo", required = true, value_name = "LOGO_IMAGE")]
    logo: PathBuf,

    /// Video file to scan
    #[arg(short = 'i', long = "input", value_name = "VIDEO")]
    input: Option<PathBuf>,

    /// Directory of still frames to scan instead of a video
    #[arg(long = "frames-dir", value_name = "DIR")]
    frames_dir: Option<PathBuf>,

    /// CSV report destination
    #[arg(
        short = 'o',
        long = "output",
        value_name = "CSV",
        default_value = "detection_report.csv"
    )]
    output: PathBuf,

    /// Optional: load run settings from a JSON or TOML file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start from a tuned preset instead of the defaults
    #[arg(long, value_enum, value_name = "PRESET")]
    preset: Option<Preset>,

    /// Optional: override the corner threshold (1-127)
    #[arg(long, value_name = "T", value_parser = clap::value_parser!(u8).range(1..=127))]
    threshold: Option<u8>,

    /// Optional: keep at most this many keypoints per frame
    #[arg(long, value_name = "N")]
    max_features: Option<usize>,

    /// Optional: override the pyramid level cap
    #[arg(long, value_name = "N")]
    levels: Option<usize>,

    /// Optional: good matches a frame must exceed to count as detected
    #[arg(long, value_name = "N")]
    min_good_matches: Option<usize>,

    /// Optional: absolute distance cutoff for good matches
    #[arg(long, value_name = "DIST")]
    cutoff: Option<f32>,

    /// Optional: relative good-match ratio
    #[arg(long, value_name = "RATIO")]
    ratio: Option<f32>,

    /// Worker threads (defaults to all cores)
    #[arg(short = 'j', long, value_name = "N")]
    threads: Option<usize>,

    /// Stop scanning after this many seconds, keeping partial results
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Save a copy of the logo with its detected keypoints circled
    #[arg(long, value_name = "PNG")]
    annotate: Option<PathBuf>,

    /// More log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Preset {
    /// Binary descriptors with a Hamming distance cutoff
    Binary,
    /// Gradient descriptors with the relative good-match rule
    Gradient,
}

fn build_config(args: &Cli) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let source = match (&args.input, &args.frames_dir) {
        (Some(video), None) => SourceLocator::Video(video.clone()),
        (None, Some(dir)) => SourceLocator::ImageDir(dir.clone()),
        (Some(_), Some(_)) => {
            return Err("--input and --frames-dir are mutually exclusive".into());
        }
        (None, None) => return Err("one of --input or --frames-dir is required".into()),
    };
    if args.cutoff.is_some() && args.ratio.is_some() {
        return Err("--cutoff and --ratio are mutually exclusive".into());
    }

    let mut cfg = if let Some(path) = &args.config {
        if args.preset.is_some() {
            warn!("--preset is ignored because --config is set");
        }
        load_config_file(path)?
    } else {
        match args.preset {
            Some(Preset::Gradient) => {
                RunConfig::gradient_preset(args.logo.clone(), source.clone())
            }
            Some(Preset::Binary) | None => {
                RunConfig::binary_preset(args.logo.clone(), source.clone())
            }
        }
    };

    // Command-line flags win over the config file
    cfg.reference = args.logo.clone();
    cfg.source = source;
    if let Some(threshold) = args.threshold {
        cfg.detector.threshold = threshold;
    }
    if let Some(max_features) = args.max_features {
        cfg.detector.max_features = max_features;
    }
    if let Some(levels) = args.levels {
        cfg.detector.levels = levels;
    }
    if let Some(min_good_matches) = args.min_good_matches {
        cfg.min_good_matches = min_good_matches;
    }
    if let Some(cutoff) = args.cutoff {
        cfg.filter = MatchFilter::Absolute { cutoff };
    }
    if let Some(ratio) = args.ratio {
        cfg.filter = MatchFilter::Relative { ratio };
    }
    if let Some(threads) = args.threads {
        cfg.n_threads = threads;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn load_config_file(path: &Path) -> Result<RunConfig, Box<dyn std::error::Error>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => RunConfig::load_toml(path),
        _ => RunConfig::load_json(path),
    }
}

/// Raise the cancel flag once the time limit passes
fn spawn_deadline(cancel: CancelFlag, limit: Duration) {
    thread::spawn(move || {
        thread::sleep(limit);
        warn!("Time limit of {}s reached, cancelling scan", limit.as_secs());
        cancel.cancel();
    });
}

/// Save a copy of the reference image with its keypoints circled in red
fn annotate_reference(cfg: &RunConfig, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reference = load_image(&cfg.reference)?;
    let extractor = FeatureExtractor::new(cfg.detector.clone())?;
    let features = extractor.extract(&reference)?;
    info!(
        "Annotating {} keypoints onto {}",
        features.len(),
        out.display()
    );

    let Frame {
        width,
        height,
        data,
    } = reference;
    let mut canvas =
        RgbImage::from_raw(width, height, data).ok_or("reference pixel buffer size mismatch")?;
    for kp in &features.keypoints {
        draw_hollow_circle_mut(&mut canvas, (kp.x as i32, kp.y as i32), 3, Rgb([255, 0, 0]));
    }
    canvas.save(out)?;
    Ok(())
}

fn run_scan(args: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = build_config(&args)?;
    info!("{}", cfg.summary());

    init_thread_pool(cfg.n_threads).map_err(ScanError::ThreadPool)?;

    if let Some(path) = &args.annotate {
        annotate_reference(&cfg, path)?;
    }

    let cancel = CancelFlag::new();
    if let Some(seconds) = args.timeout {
        spawn_deadline(cancel.clone(), Duration::from_secs(seconds));
    }

    let started = Instant::now();
    let (report, failure) = match run_from_config(&cfg, &cancel) {
        Ok(report) => (report, None),
        Err(RunFailure { report, error }) => (report, Some(error)),
    };
    info!("Scan took {:.2?}", started.elapsed());

    // The report keeps whatever was scanned, even when the run failed
    save_csv(&args.output, &report)?;
    println!("{}", report.summary());
    println!("Report written to {}", args.output.display());

    match failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn main() {
    let args = Cli::parse();
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run_scan(args) {
        error!("{}", e);
        process::exit(1);
    }
}
