pub mod cancel;
pub mod config;
pub mod report;

pub use cancel::CancelFlag;
pub use config::{
    ConfigError, ConfigResult, DescriptorKind, DetectorConfig, MatchFilter, RunConfig,
    SourceLocator,
};
pub use report::{DetectionReport, FrameVerdict, RunStatus};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decoded RGB24 frame: row-major, 3 bytes per pixel
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// Byte length the RGB24 layout requires for these dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Convert to 8-bit luma using Rec. 709 weights (integer arithmetic)
    pub fn to_gray(&self) -> GrayFrame {
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize);
        for px in self.data.chunks_exact(3) {
            let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
            data.push(((2126 * r + 7152 * g + 722 * b) / 10_000) as u8);
        }
        GrayFrame {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Row-major 8-bit grayscale image with dimensions
#[derive(Debug, Clone)]
pub struct GrayFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl GrayFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }
}

/// Detected corner location with its orientation in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Binary descriptor width in bytes (256 bits)
pub const DESCRIPTOR_BYTES: usize = 32;

/// Gradient descriptor width in floats
pub const GRADIENT_DESCRIPTOR_LEN: usize = 128;

/// 256-bit binary descriptor
pub type BinaryDescriptor = [u8; DESCRIPTOR_BYTES];

/// 128-dimensional gradient-histogram descriptor
pub type GradientDescriptor = [f32; GRADIENT_DESCRIPTOR_LEN];

/// Descriptors for one image, tagged by back-end so sets from differently
/// configured extractors cannot be compared by accident.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorSet {
    Binary(Vec<BinaryDescriptor>),
    Gradient(Vec<GradientDescriptor>),
}

impl DescriptorSet {
    pub fn empty(kind: DescriptorKind) -> Self {
        match kind {
            DescriptorKind::Binary => DescriptorSet::Binary(Vec::new()),
            DescriptorKind::Gradient => DescriptorSet::Gradient(Vec::new()),
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            DescriptorSet::Binary(_) => DescriptorKind::Binary,
            DescriptorSet::Gradient(_) => DescriptorKind::Gradient,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DescriptorSet::Binary(d) => d.len(),
            DescriptorSet::Gradient(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Nearest-reference pairing for one frame descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescriptorMatch {
    /// Index into the reference descriptor set
    pub reference_index: usize,
    /// Index into the frame descriptor set
    pub frame_index: usize,
    /// Distance under the set's metric (Hamming or Euclidean), non-negative
    pub distance: f32,
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width * height) {
            data.extend_from_slice(&rgb);
        }
        Frame::new(width, height, data)
    }

    #[test]
    fn test_frame_expected_len() {
        let frame = create_test_frame(4, 3, [10, 20, 30]);
        assert_eq!(frame.expected_len(), 36);
        assert_eq!(frame.data.len(), 36);
    }

    #[test]
    fn test_to_gray_dimensions() {
        let frame = create_test_frame(5, 4, [100, 100, 100]);
        let gray = frame.to_gray();
        assert_eq!(gray.width, 5);
        assert_eq!(gray.height, 4);
        assert_eq!(gray.data.len(), 20);
    }

    #[test]
    fn test_to_gray_neutral_pixel() {
        // Equal channels must map to (nearly) the same luma value
        let frame = create_test_frame(1, 1, [200, 200, 200]);
        let gray = frame.to_gray();
        assert_eq!(gray.data[0], 200);
    }

    #[test]
    fn test_to_gray_weights_green_heaviest() {
        let red = create_test_frame(1, 1, [255, 0, 0]).to_gray().data[0];
        let green = create_test_frame(1, 1, [0, 255, 0]).to_gray().data[0];
        let blue = create_test_frame(1, 1, [0, 0, 255]).to_gray().data[0];
        assert!(green > red);
        assert!(red > blue);
    }

    #[test]
    fn test_descriptor_set_len_and_kind() {
        let binary = DescriptorSet::Binary(vec![[0u8; 32], [1u8; 32]]);
        assert_eq!(binary.len(), 2);
        assert_eq!(binary.kind(), DescriptorKind::Binary);
        assert!(!binary.is_empty());

        let gradient = DescriptorSet::empty(DescriptorKind::Gradient);
        assert_eq!(gradient.len(), 0);
        assert_eq!(gradient.kind(), DescriptorKind::Gradient);
        assert!(gradient.is_empty());
    }
}
