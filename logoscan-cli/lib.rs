//! High-level library behind the `logoscan` binary: frame sources, the
//! scan pipeline and report output.

pub mod pipeline;
pub mod report;
pub mod source;

pub use pipeline::{RunFailure, run, run_from_config};
pub use report::{save_csv, write_csv};
pub use source::{
    BufferSource, FrameSource, ImageDirSource, SourceError, SourceResult, VideoSource, load_image,
};

pub use logoscan_core::cancel::CancelFlag;
pub use logoscan_core::config::{
    ConfigError, DescriptorKind, DetectorConfig, MatchFilter, RunConfig, SourceLocator,
};
pub use logoscan_core::report::{DetectionReport, FrameVerdict, RunStatus};
pub use logoscan_core::{Frame, init_thread_pool};
pub use logoscan_features::{FeatureExtractor, FeatureSet};

use logoscan_features::FeatureError;

#[derive(Debug)]
pub enum ScanError {
    Source(SourceError),
    Feature(FeatureError),
    Config(ConfigError),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Source(e) => write!(f, "Source error: {}", e),
            ScanError::Feature(e) => write!(f, "Feature error: {}", e),
            ScanError::Config(e) => write!(f, "Configuration error: {}", e),
            ScanError::ThreadPool(e) => write!(f, "Thread pool error: {}", e),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<SourceError> for ScanError {
    fn from(err: SourceError) -> Self {
        ScanError::Source(err)
    }
}

impl From<FeatureError> for ScanError {
    fn from(err: FeatureError) -> Self {
        ScanError::Feature(err)
    }
}

impl From<ConfigError> for ScanError {
    fn from(err: ConfigError) -> Self {
        ScanError::Config(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for ScanError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        ScanError::ThreadPool(err)
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
