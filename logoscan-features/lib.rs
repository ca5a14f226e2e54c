//! Multi-scale feature extraction: segment-test corners with orientation,
//! described by either binary intensity comparisons or gradient histograms.

pub mod brief;
pub mod detector;
pub mod error;
pub mod gradient;
pub mod pyramid;

pub use brief::BriefGenerator;
pub use detector::{CornerDetector, ScoredKeypoint};
pub use error::{FeatureError, FeatureResult};
pub use gradient::GradientGenerator;
pub use pyramid::{ImagePyramid, ScaleLevel};

use logoscan_core::config::{DescriptorKind, DetectorConfig};
use logoscan_core::{DescriptorSet, Frame, GrayFrame, Keypoint};
use rayon::prelude::*;

/// Keypoints with their descriptors. Entry i on each side describes the same
/// image location; keypoint coordinates are in the base image.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: DescriptorSet,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

#[derive(Debug)]
enum DescriptorBackend {
    Binary(BriefGenerator),
    Gradient(GradientGenerator),
}

/// Multi-scale feature extractor.
///
/// One instance serves both the reference image and every frame of a run;
/// descriptor sets from differently configured extractors are not comparable.
#[derive(Debug)]
pub struct FeatureExtractor {
    cfg: DetectorConfig,
    backend: DescriptorBackend,
}

impl FeatureExtractor {
    /// Validates the configuration once, up front
    pub fn new(cfg: DetectorConfig) -> FeatureResult<Self> {
        cfg.validate()?;
        let backend = match cfg.descriptor {
            DescriptorKind::Binary => DescriptorBackend::Binary(BriefGenerator::new(cfg.patch_size)),
            DescriptorKind::Gradient => {
                DescriptorBackend::Gradient(GradientGenerator::new(cfg.patch_size))
            }
        };
        Ok(Self { cfg, backend })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    /// Extract keypoints and descriptors from an RGB frame.
    ///
    /// Zero features is a normal outcome for uniform or very small images,
    /// not an error; errors are reserved for buffers that cannot be
    /// interpreted as an image.
    pub fn extract(&self, frame: &Frame) -> FeatureResult<FeatureSet> {
        if frame.width == 0 || frame.height == 0 {
            return Err(FeatureError::InvalidImageSize {
                width: frame.width,
                height: frame.height,
            });
        }
        if frame.data.len() != frame.expected_len() {
            return Err(FeatureError::InvalidImageData {
                expected_len: frame.expected_len(),
                actual_len: frame.data.len(),
            });
        }
        Ok(self.extract_gray(&frame.to_gray()))
    }

    /// Same pipeline over an already grayscale image
    pub fn extract_gray(&self, gray: &GrayFrame) -> FeatureSet {
        let width = gray.width as usize;
        let height = gray.height as usize;
        let pyramid =
            ImagePyramid::build(&gray.data, width, height, self.cfg.levels, self.cfg.scale_factor);

        // Detect and thin per level, in level coordinates
        let mut selected: Vec<(ScoredKeypoint, usize)> = Vec::new();
        for (level, img) in pyramid.iter() {
            let scored = CornerDetector::detect(img, level.width, level.height, self.cfg.threshold);
            let thinned = CornerDetector::non_maximum_suppression(&scored, self.cfg.nms_radius);
            selected.extend(thinned.into_iter().map(|kp| (kp, level.level)));
        }

        // Cap to the strongest keypoints across all levels, with a stable
        // order on ties
        if selected.len() > self.cfg.max_features {
            selected.sort_by(|a, b| {
                b.0.response
                    .total_cmp(&a.0.response)
                    .then_with(|| a.1.cmp(&b.1))
                    .then_with(|| a.0.keypoint.y.total_cmp(&b.0.keypoint.y))
                    .then_with(|| a.0.keypoint.x.total_cmp(&b.0.keypoint.x))
            });
            selected.truncate(self.cfg.max_features);
        }

        // Orientation from the level image the keypoint was found in
        let oriented: Vec<(Keypoint, usize)> = selected
            .into_par_iter()
            .map(|(scored, level_idx)| {
                let level = pyramid.levels()[level_idx];
                let angle = CornerDetector::orientation(
                    pyramid.image(level_idx),
                    level.width,
                    level.height,
                    scored.keypoint.x,
                    scored.keypoint.y,
                    self.cfg.patch_size,
                );
                (
                    Keypoint {
                        angle,
                        ..scored.keypoint
                    },
                    level_idx,
                )
            })
            .collect();

        // Describe at level coordinates, against the level image
        let descriptors = match &self.backend {
            DescriptorBackend::Binary(brief) => DescriptorSet::Binary(
                oriented
                    .par_iter()
                    .map(|(kp, level_idx)| {
                        let level = pyramid.levels()[*level_idx];
                        brief.describe(pyramid.image(*level_idx), level.width, level.height, kp)
                    })
                    .collect(),
            ),
            DescriptorBackend::Gradient(gradient) => DescriptorSet::Gradient(
                oriented
                    .par_iter()
                    .map(|(kp, level_idx)| {
                        let level = pyramid.levels()[*level_idx];
                        gradient.describe(pyramid.image(*level_idx), level.width, level.height, kp)
                    })
                    .collect(),
            ),
        };

        // Map keypoints back to base-image coordinates
        let keypoints = oriented
            .into_iter()
            .map(|(kp, level_idx)| {
                let scale = pyramid.levels()[level_idx].scale;
                Keypoint {
                    x: kp.x * scale,
                    y: kp.y * scale,
                    angle: kp.angle,
                }
            })
            .collect();

        FeatureSet {
            keypoints,
            descriptors,
        }
    }
}
