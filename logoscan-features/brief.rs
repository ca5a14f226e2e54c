use logoscan_core::{BinaryDescriptor, DESCRIPTOR_BYTES, Keypoint};

use crate::pyramid::bilinear_sample;

/// Number of intensity-comparison pairs (one bit each)
const PAIR_COUNT: usize = DESCRIPTOR_BYTES * 8;

/// Rotated binary descriptor generator.
///
/// The 256 sampling pairs are drawn once from a fixed-seed generator,
/// uniform over the patch square, so every instance built with the same
/// patch size produces identical descriptors.
#[derive(Debug)]
pub struct BriefGenerator {
    pairs: [(f32, f32, f32, f32); PAIR_COUNT],
}

impl BriefGenerator {
    pub fn new(patch_size: usize) -> Self {
        let radius = (patch_size / 2) as u64;
        let span = 2 * radius + 1;
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next_coord = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            // High bits only; low LCG bits have short cycles
            ((state >> 33) % span) as f32 - radius as f32
        };
        let pairs = std::array::from_fn(|_| {
            (next_coord(), next_coord(), next_coord(), next_coord())
        });
        Self { pairs }
    }

    /// Build one descriptor by comparing sample pairs rotated by the
    /// keypoint angle. Samples beyond the image edge clamp to it.
    pub fn describe(&self, img: &[u8], width: usize, height: usize, kp: &Keypoint) -> BinaryDescriptor {
        let (sin_a, cos_a) = kp.angle.sin_cos();
        let mut descriptor = [0u8; DESCRIPTOR_BYTES];
        for (i, &(x1, y1, x2, y2)) in self.pairs.iter().enumerate() {
            let rx1 = kp.x + cos_a * x1 - sin_a * y1;
            let ry1 = kp.y + sin_a * x1 + cos_a * y1;
            let rx2 = kp.x + cos_a * x2 - sin_a * y2;
            let ry2 = kp.y + sin_a * x2 + cos_a * y2;

            let first = bilinear_sample(img, width, height, rx1, ry1);
            let second = bilinear_sample(img, width, height, rx2, ry2);
            let bit = (first < second) as u8;
            descriptor[i / 8] |= bit << (i % 8);
        }
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center_keypoint(size: usize) -> Keypoint {
        Keypoint {
            x: size as f32 / 2.0,
            y: size as f32 / 2.0,
            angle: 0.0,
        }
    }

    fn ramp_image(size: usize, reversed: bool) -> Vec<u8> {
        let mut img = vec![0u8; size * size];
        for y in 0..size {
            for x in 0..size {
                let v = (x * 255 / (size - 1)) as u8;
                img[y * size + x] = if reversed { 255 - v } else { v };
            }
        }
        img
    }

    #[test]
    fn test_pairs_fit_in_patch() {
        let generator = BriefGenerator::new(31);
        for &(x1, y1, x2, y2) in generator.pairs.iter() {
            for v in [x1, y1, x2, y2] {
                assert!(v >= -15.0 && v <= 15.0);
            }
        }
    }

    #[test]
    fn test_describe_is_deterministic() {
        let img = ramp_image(64, false);
        let kp = center_keypoint(64);
        let a = BriefGenerator::new(31).describe(&img, 64, 64, &kp);
        let b = BriefGenerator::new(31).describe(&img, 64, 64, &kp);
        assert_eq!(a, b);
    }

    #[test]
    fn test_describe_uniform_image_is_all_zero() {
        // Every comparison sees equal intensities; strict less-than never fires
        let img = vec![100u8; 64 * 64];
        let descriptor = BriefGenerator::new(31).describe(&img, 64, 64, &center_keypoint(64));
        assert_eq!(descriptor, [0u8; DESCRIPTOR_BYTES]);
    }

    #[test]
    fn test_describe_distinguishes_opposite_ramps() {
        let kp = center_keypoint(64);
        let generator = BriefGenerator::new(31);
        let a = generator.describe(&ramp_image(64, false), 64, 64, &kp);
        let b = generator.describe(&ramp_image(64, true), 64, 64, &kp);
        assert_ne!(a, b);
    }

    #[test]
    fn test_describe_survives_keypoint_near_edge() {
        let img = ramp_image(32, false);
        let kp = Keypoint {
            x: 1.0,
            y: 1.0,
            angle: 1.2,
        };
        // Must not panic; samples outside the image clamp to the edge
        let _ = BriefGenerator::new(31).describe(&img, 32, 32, &kp);
    }
}
