use std::error::Error;
use std::fmt;

use logoscan_core::config::ConfigError;

/// Errors from feature extraction
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// Image has a zero dimension
    InvalidImageSize { width: u32, height: u32 },
    /// Pixel buffer length does not match the declared dimensions
    InvalidImageData { expected_len: usize, actual_len: usize },
    /// Detector configuration failed validation
    Config(ConfigError),
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image size: {}x{}", width, height)
            }
            FeatureError::InvalidImageData {
                expected_len,
                actual_len,
            } => {
                write!(
                    f,
                    "Invalid image data: expected {} bytes, got {}",
                    expected_len, actual_len
                )
            }
            FeatureError::Config(e) => write!(f, "Invalid detector configuration: {}", e),
        }
    }
}

impl Error for FeatureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FeatureError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for FeatureError {
    fn from(e: ConfigError) -> Self {
        FeatureError::Config(e)
    }
}

/// Result type for feature extraction operations
pub type FeatureResult<T> = Result<T, FeatureError>;
