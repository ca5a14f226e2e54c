use std::f32::consts::TAU;

use logoscan_core::{GRADIENT_DESCRIPTOR_LEN, GradientDescriptor, Keypoint};

use crate::pyramid::bilinear_sample;

/// Spatial cells per side
const GRID: usize = 4;
/// Orientation bins per cell
const BINS: usize = 8;
/// Sample lattice points per side (4 per cell)
const SAMPLES: usize = 16;
/// Component cap applied between the two normalization passes
const COMPONENT_CLAMP: f32 = 0.2;

/// Gradient-histogram descriptor generator.
///
/// Pools local gradients into a 4x4 grid of 8-bin orientation histograms,
/// rotation-normalized to the keypoint angle, giving 128 floats.
#[derive(Debug)]
pub struct GradientGenerator {
    /// Sample spacing in pixels, derived from the patch size
    spacing: f32,
}

impl GradientGenerator {
    pub fn new(patch_size: usize) -> Self {
        Self {
            spacing: patch_size as f32 / SAMPLES as f32,
        }
    }

    pub fn describe(&self, img: &[u8], width: usize, height: usize, kp: &Keypoint) -> GradientDescriptor {
        let (sin_a, cos_a) = kp.angle.sin_cos();
        let mut hist = [0.0f32; GRADIENT_DESCRIPTOR_LEN];
        let half = SAMPLES as f32 / 2.0 - 0.5;

        for sy in 0..SAMPLES {
            for sx in 0..SAMPLES {
                // Lattice offset in patch space, rotated into image space
                let u = (sx as f32 - half) * self.spacing;
                let v = (sy as f32 - half) * self.spacing;
                let px = kp.x + cos_a * u - sin_a * v;
                let py = kp.y + sin_a * u + cos_a * v;

                let gx = bilinear_sample(img, width, height, px + 1.0, py)
                    - bilinear_sample(img, width, height, px - 1.0, py);
                let gy = bilinear_sample(img, width, height, px, py + 1.0)
                    - bilinear_sample(img, width, height, px, py - 1.0);
                let magnitude = (gx * gx + gy * gy).sqrt();
                if magnitude == 0.0 {
                    continue;
                }

                // Gradient orientation relative to the keypoint angle
                let mut orientation = gy.atan2(gx) - kp.angle;
                while orientation < 0.0 {
                    orientation += TAU;
                }
                while orientation >= TAU {
                    orientation -= TAU;
                }
                let bin = ((orientation / TAU) * BINS as f32) as usize % BINS;

                let cell_x = sx * GRID / SAMPLES;
                let cell_y = sy * GRID / SAMPLES;
                hist[(cell_y * GRID + cell_x) * BINS + bin] += magnitude;
            }
        }

        normalize(&mut hist);
        hist
    }
}

/// L2-normalize, clamp dominant components, renormalize. Leaves an all-zero
/// histogram untouched.
fn normalize(hist: &mut [f32; GRADIENT_DESCRIPTOR_LEN]) {
    let norm = hist.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for v in hist.iter_mut() {
        *v = (*v / norm).min(COMPONENT_CLAMP);
    }
    let norm = hist.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in hist.iter_mut() {
            *v /= norm;
        }
    }
}
