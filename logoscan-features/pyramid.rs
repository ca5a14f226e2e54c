use rayon::prelude::*;

/// Pyramid levels stop once either dimension would fall below this
pub const MIN_LEVEL_DIMENSION: usize = 32;

/// Geometry of one pyramid level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLevel {
    pub level: usize,
    /// Downscale factor of this level relative to the base image
    pub scale: f32,
    pub width: usize,
    pub height: usize,
}

/// Multi-scale image pyramid built by bilinear downsampling.
///
/// Level 0 is always the base image; each further level shrinks by the
/// configured factor until the level cap or the minimum dimension is hit.
#[derive(Debug, Clone)]
pub struct ImagePyramid {
    levels: Vec<ScaleLevel>,
    images: Vec<Vec<u8>>,
}

impl ImagePyramid {
    pub fn build(
        img: &[u8],
        width: usize,
        height: usize,
        max_levels: usize,
        scale_factor: f32,
    ) -> Self {
        let levels = Self::generate_levels(width, height, max_levels, scale_factor);
        let images = levels
            .iter()
            .map(|lv| {
                if lv.level == 0 {
                    img.to_vec()
                } else {
                    downsample(img, width, height, lv.width, lv.height)
                }
            })
            .collect();
        Self { levels, images }
    }

    /// Plan the level geometry without touching pixels
    pub fn generate_levels(
        width: usize,
        height: usize,
        max_levels: usize,
        scale_factor: f32,
    ) -> Vec<ScaleLevel> {
        let mut levels = vec![ScaleLevel {
            level: 0,
            scale: 1.0,
            width,
            height,
        }];
        let mut scale = scale_factor;
        for level in 1..max_levels {
            let scaled_width = (width as f32 / scale) as usize;
            let scaled_height = (height as f32 / scale) as usize;
            if scaled_width < MIN_LEVEL_DIMENSION || scaled_height < MIN_LEVEL_DIMENSION {
                break;
            }
            levels.push(ScaleLevel {
                level,
                scale,
                width: scaled_width,
                height: scaled_height,
            });
            scale *= scale_factor;
        }
        levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[ScaleLevel] {
        &self.levels
    }

    pub fn image(&self, level: usize) -> &[u8] {
        &self.images[level]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ScaleLevel, &[u8])> {
        self.levels.iter().zip(self.images.iter().map(|v| v.as_slice()))
    }
}

fn downsample(
    img: &[u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<u8> {
    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;
    let mut out = vec![0u8; dst_width * dst_height];
    out.par_chunks_mut(dst_width)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = y as f32 * y_ratio;
            for (x, px) in row.iter_mut().enumerate() {
                let value = bilinear_sample(img, src_width, src_height, x as f32 * x_ratio, sy);
                *px = value.round() as u8;
            }
        });
    out
}

/// Sample an intensity at fractional coordinates, clamping to the image edge.
///
/// Requires a non-empty image; callers validate dimensions up front.
pub fn bilinear_sample(img: &[u8], width: usize, height: usize, x: f32, y: f32) -> f32 {
    let x = x.clamp(0.0, (width - 1) as f32);
    let y = y.clamp(0.0, (height - 1) as f32);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = img[y0 * width + x0] as f32;
    let p10 = img[y0 * width + x1] as f32;
    let p01 = img[y1 * width + x0] as f32;
    let p11 = img[y1 * width + x1] as f32;

    let top = p00 * (1.0 - fx) + p10 * fx;
    let bottom = p01 * (1.0 - fx) + p11 * fx;
    top * (1.0 - fy) + bottom * fy
}
