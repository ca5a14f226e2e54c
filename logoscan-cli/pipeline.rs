use log::{debug, error, info, warn};

use logoscan_core::Frame;
use logoscan_core::cancel::CancelFlag;
use logoscan_core::config::{RunConfig, SourceLocator};
use logoscan_core::report::{DetectionReport, FrameVerdict, RunStatus};
use logoscan_features::FeatureExtractor;
use logoscan_match::{DescriptorMatcher, MatchPolicy};

use crate::ScanError;
use crate::source::{FrameSource, ImageDirSource, VideoSource, load_image};

/// A run that did not finish cleanly. The report keeps every verdict decided
/// before the failure, in order.
#[derive(Debug)]
pub struct RunFailure {
    pub report: DetectionReport,
    pub error: ScanError,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Run failed after {} frames: {}",
            self.report.len(),
            self.error
        )
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

fn startup_failure(error: ScanError) -> RunFailure {
    RunFailure {
        report: DetectionReport::new(Vec::new(), RunStatus::Failed),
        error,
    }
}

/// Scan every frame the source yields against the reference image.
///
/// Consumes the source and drops it before returning, whatever the outcome,
/// so a video decoder never outlives its run. Frames are numbered from 1 in
/// stream order and each gets exactly one verdict. The cancel flag is polled
/// before each frame is pulled, so a cancellation after frame N yields a
/// report of exactly N verdicts with `Cancelled` status. A source or
/// extraction error ends the run with `Failed` status and the verdicts
/// decided so far.
pub fn run(
    cfg: &RunConfig,
    reference: &Frame,
    mut source: impl FrameSource,
    cancel: &CancelFlag,
) -> Result<DetectionReport, RunFailure> {
    cfg.validate()
        .map_err(|e| startup_failure(ScanError::Config(e)))?;

    let extractor = FeatureExtractor::new(cfg.detector.clone())
        .map_err(|e| startup_failure(ScanError::Feature(e)))?;
    let reference_features = extractor
        .extract(reference)
        .map_err(|e| startup_failure(ScanError::Feature(e)))?;
    if reference_features.is_empty() {
        warn!("Reference image yields no features; no frame can ever match");
    } else {
        info!("Reference features: {}", reference_features.len());
    }

    let policy = MatchPolicy::new(cfg.filter, cfg.min_good_matches);
    let mut verdicts: Vec<FrameVerdict> = Vec::new();

    let status = loop {
        if cancel.is_cancelled() {
            info!("Cancelled after {} frames", verdicts.len());
            break RunStatus::Cancelled;
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break RunStatus::Completed,
            Err(e) => {
                error!("Frame source failed after {} frames: {}", verdicts.len(), e);
                return Err(RunFailure {
                    report: DetectionReport::new(verdicts, RunStatus::Failed),
                    error: ScanError::Source(e),
                });
            }
        };

        let frame_number = verdicts.len() as u64 + 1;
        let features = match extractor.extract(&frame) {
            Ok(features) => features,
            Err(e) => {
                error!("Frame {} could not be processed: {}", frame_number, e);
                return Err(RunFailure {
                    report: DetectionReport::new(verdicts, RunStatus::Failed),
                    error: ScanError::Feature(e),
                });
            }
        };

        let matches =
            DescriptorMatcher::match_sets(&reference_features.descriptors, &features.descriptors);
        let (good_match_count, detected) = policy.evaluate(&matches);
        debug!(
            "Frame {}: {} keypoints, {} matches, {} good, detected={}",
            frame_number,
            features.len(),
            matches.len(),
            good_match_count,
            detected
        );

        verdicts.push(FrameVerdict {
            frame_number,
            good_match_count,
            detected,
        });
    };

    Ok(DetectionReport::new(verdicts, status))
}

/// Open the reference image and frame source named by the config, then run
pub fn run_from_config(
    cfg: &RunConfig,
    cancel: &CancelFlag,
) -> Result<DetectionReport, RunFailure> {
    let reference = load_image(&cfg.reference)
        .map_err(|e| startup_failure(ScanError::Source(e)))?;

    match &cfg.source {
        SourceLocator::Video(path) => {
            info!("Scanning video {}", path.display());
            let source =
                VideoSource::open(path).map_err(|e| startup_failure(ScanError::Source(e)))?;
            run(cfg, &reference, source, cancel)
        }
        SourceLocator::ImageDir(path) => {
            info!("Scanning image directory {}", path.display());
            let source =
                ImageDirSource::open(path).map_err(|e| startup_failure(ScanError::Source(e)))?;
            run(cfg, &reference, source, cancel)
        }
    }
}
