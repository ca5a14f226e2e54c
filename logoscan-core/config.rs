use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidThreshold(u8),
    InvalidPatchSize(usize),
    InvalidNmsRadius(f32),
    InvalidMaxFeatures(usize),
    InvalidLevelCount(usize),
    InvalidScaleFactor(f32),
    InvalidRatio(f32),
    InvalidCutoff(f32),
    InvalidThreadCount(usize),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidThreshold(t) => {
                write!(f, "Invalid corner threshold: {} (must be 1-127)", t)
            }
            ConfigError::InvalidPatchSize(p) => {
                write!(f, "Invalid patch size: {} (must be odd and >= 7)", p)
            }
            ConfigError::InvalidNmsRadius(r) => {
                write!(f, "Invalid suppression radius: {} (must be > 0)", r)
            }
            ConfigError::InvalidMaxFeatures(m) => {
                write!(f, "Invalid feature cap: {} (must be >= 1)", m)
            }
            ConfigError::InvalidLevelCount(l) => {
                write!(f, "Invalid pyramid level count: {} (must be >= 1)", l)
            }
            ConfigError::InvalidScaleFactor(s) => {
                write!(f, "Invalid pyramid scale factor: {} (must be > 1)", s)
            }
            ConfigError::InvalidRatio(r) => {
                write!(f, "Invalid relative filter ratio: {} (must be > 0)", r)
            }
            ConfigError::InvalidCutoff(c) => {
                write!(f, "Invalid absolute distance cutoff: {} (must be > 0)", c)
            }
            ConfigError::InvalidThreadCount(n) => {
                write!(f, "Invalid thread count: {} (must be >= 1)", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Descriptor back-end; also fixes the distance metric used for matching
/// (Hamming for binary descriptors, Euclidean for gradient descriptors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DescriptorKind {
    Binary,
    Gradient,
}

/// Feature extraction settings, shared by the reference image and every frame
/// of a run so their descriptor sets stay comparable.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    pub descriptor: DescriptorKind,
    /// Corner test threshold on the 16-pixel circle
    pub threshold: u8,
    /// Window for orientation and descriptor sampling (odd)
    pub patch_size: usize,
    /// Minimum spacing between kept corners, in pixels
    pub nms_radius: f32,
    /// Keep at most this many strongest keypoints per image
    pub max_features: usize,
    /// Pyramid level cap; level 0 is the full-resolution image
    pub levels: usize,
    /// Downscale ratio between consecutive pyramid levels
    pub scale_factor: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            descriptor: DescriptorKind::Binary,
            threshold: 20,
            patch_size: 31,
            nms_radius: 3.0,
            max_features: 500,
            levels: 4,
            scale_factor: 1.2,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.threshold == 0 || self.threshold > 127 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.patch_size < 7 || self.patch_size % 2 == 0 {
            return Err(ConfigError::InvalidPatchSize(self.patch_size));
        }
        if self.nms_radius <= 0.0 {
            return Err(ConfigError::InvalidNmsRadius(self.nms_radius));
        }
        if self.max_features == 0 {
            return Err(ConfigError::InvalidMaxFeatures(self.max_features));
        }
        if self.levels == 0 {
            return Err(ConfigError::InvalidLevelCount(self.levels));
        }
        if self.scale_factor <= 1.0 {
            return Err(ConfigError::InvalidScaleFactor(self.scale_factor));
        }
        Ok(())
    }
}

/// Rule that decides which sorted matches count as good.
///
/// `Relative` keeps the sorted prefix whose distance is below
/// `ratio * match_count` — the list length, not a distance. That is the rule
/// this system is defined by, and the ratio therefore lives in different
/// units than the descriptor metric. `Absolute` compares against a plain
/// distance cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchFilter {
    Relative { ratio: f32 },
    Absolute { cutoff: f32 },
}

/// Where a run pulls its frames from
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SourceLocator {
    /// Video file, decoded frame by frame
    Video(PathBuf),
    /// Directory of still images, consumed in filename order
    ImageDir(PathBuf),
}

/// Complete configuration for one detection run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunConfig {
    /// Reference logo image
    pub reference: PathBuf,
    pub source: SourceLocator,
    pub detector: DetectorConfig,
    pub filter: MatchFilter,
    /// A frame is detected when its good-match count exceeds this (strict)
    pub min_good_matches: usize,
    pub n_threads: usize,
}

impl RunConfig {
    /// Default settings over the given inputs
    pub fn new(reference: PathBuf, source: SourceLocator) -> Self {
        Self {
            reference,
            source,
            detector: DetectorConfig::default(),
            filter: MatchFilter::Absolute { cutoff: 64.0 },
            min_good_matches: 10,
            n_threads: num_cpus::get().max(1),
        }
    }

    /// Binary preset: BRIEF-style descriptors with a Hamming cutoff
    pub fn binary_preset(reference: PathBuf, source: SourceLocator) -> Self {
        Self {
            detector: DetectorConfig {
                descriptor: DescriptorKind::Binary,
                ..DetectorConfig::default()
            },
            filter: MatchFilter::Absolute { cutoff: 64.0 },
            ..Self::new(reference, source)
        }
    }

    /// Gradient preset: float descriptors with the relative good-match rule
    pub fn gradient_preset(reference: PathBuf, source: SourceLocator) -> Self {
        Self {
            detector: DetectorConfig {
                descriptor: DescriptorKind::Gradient,
                ..DetectorConfig::default()
            },
            filter: MatchFilter::Relative { ratio: 0.7 },
            ..Self::new(reference, source)
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.detector.validate()?;
        match self.filter {
            MatchFilter::Relative { ratio } => {
                if ratio <= 0.0 || !ratio.is_finite() {
                    return Err(ConfigError::InvalidRatio(ratio));
                }
            }
            MatchFilter::Absolute { cutoff } => {
                if cutoff <= 0.0 || !cutoff.is_finite() {
                    return Err(ConfigError::InvalidCutoff(cutoff));
                }
            }
        }
        if self.n_threads == 0 {
            return Err(ConfigError::InvalidThreadCount(self.n_threads));
        }
        Ok(())
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        let filter = match self.filter {
            MatchFilter::Relative { ratio } => format!("relative(ratio={})", ratio),
            MatchFilter::Absolute { cutoff } => format!("absolute(cutoff={})", cutoff),
        };
        format!(
            "RunConfig: descriptor={:?}, threshold={}, patch={}, levels={}, max_features={}, filter={}, min_good_matches={}, threads={}",
            self.detector.descriptor,
            self.detector.threshold,
            self.detector.patch_size,
            self.detector.levels,
            self.detector.max_features,
            filter,
            self.min_good_matches,
            self.n_threads
        )
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
