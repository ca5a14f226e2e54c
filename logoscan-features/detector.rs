use logoscan_core::Keypoint;
use rayon::prelude::*;

/// Offsets of the 16-pixel Bresenham circle used by the segment test
const CIRCLE_OFFSETS: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Circle pixels that must contiguously pass the brightness test
const MIN_ARC: usize = 9;

/// Images thinner than this cannot host the 3-pixel circle border
const MIN_DETECT_DIMENSION: usize = 7;

/// A detected corner with its strength score
#[derive(Debug, Clone, Copy)]
pub struct ScoredKeypoint {
    pub keypoint: Keypoint,
    pub response: f32,
}

/// Segment-test corner scanner with orientation assignment
pub struct CornerDetector;

impl CornerDetector {
    /// Scan every interior pixel for corners; rows run in parallel.
    ///
    /// Images too small for the circle border yield no keypoints.
    pub fn detect(img: &[u8], width: usize, height: usize, threshold: u8) -> Vec<ScoredKeypoint> {
        if width < MIN_DETECT_DIMENSION || height < MIN_DETECT_DIMENSION {
            return Vec::new();
        }

        let rows: Vec<Vec<ScoredKeypoint>> = (3..height - 3)
            .into_par_iter()
            .map(|y| {
                let mut row = Vec::new();
                for x in 3..width - 3 {
                    let center = img[y * width + x];
                    if let Some(response) = Self::corner_response(img, width, x, y, center, threshold)
                    {
                        row.push(ScoredKeypoint {
                            keypoint: Keypoint {
                                x: x as f32,
                                y: y as f32,
                                angle: 0.0,
                            },
                            response,
                        });
                    }
                }
                row
            })
            .collect();

        rows.into_iter().flatten().collect()
    }

    /// Segment test at one pixel: at least MIN_ARC contiguous circle pixels
    /// all brighter or all darker than the center by the threshold.
    ///
    /// Returns the response (mean squared contrast of the circle pixels past
    /// the threshold) when the test passes.
    fn corner_response(
        img: &[u8],
        width: usize,
        x: usize,
        y: usize,
        center: u8,
        threshold: u8,
    ) -> Option<f32> {
        let center = center as i32;
        let threshold = threshold as i32;

        let mut brighter = [false; 16];
        let mut darker = [false; 16];
        let mut diffs = [0i32; 16];
        for (i, &(dx, dy)) in CIRCLE_OFFSETS.iter().enumerate() {
            let px = (x as i32 + dx) as usize;
            let py = (y as i32 + dy) as usize;
            let diff = img[py * width + px] as i32 - center;
            diffs[i] = diff;
            brighter[i] = diff > threshold;
            darker[i] = diff < -threshold;
        }

        if !has_consecutive_arc(&brighter, MIN_ARC) && !has_consecutive_arc(&darker, MIN_ARC) {
            return None;
        }

        let mut sum = 0.0f32;
        let mut count = 0u32;
        for &diff in &diffs {
            if diff.abs() > threshold {
                sum += (diff * diff) as f32;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }

    /// Intensity-centroid orientation over a square patch around the keypoint.
    ///
    /// Returns 0.0 for patches with no intensity asymmetry.
    pub fn orientation(
        img: &[u8],
        width: usize,
        height: usize,
        x: f32,
        y: f32,
        patch_size: usize,
    ) -> f32 {
        let half = (patch_size / 2) as f32;
        let start_y = (y - half).max(0.0) as usize;
        let end_y = ((y + half + 1.0).min(height as f32)) as usize;
        let start_x = (x - half).max(0.0) as usize;
        let end_x = ((x + half + 1.0).min(width as f32)) as usize;

        let mut m10 = 0i64;
        let mut m01 = 0i64;
        for v in start_y..end_y {
            let dy = v as i64 - y as i64;
            for u in start_x..end_x {
                let dx = u as i64 - x as i64;
                let pixel = img[v * width + u] as i64;
                m10 += pixel * dx;
                m01 += pixel * dy;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }

    /// Greedy suppression: strongest keypoints first, dropping any candidate
    /// closer than the radius to an already kept one.
    ///
    /// Equal responses are ordered by position so the result is identical
    /// from run to run.
    pub fn non_maximum_suppression(
        keypoints: &[ScoredKeypoint],
        min_distance: f32,
    ) -> Vec<ScoredKeypoint> {
        if keypoints.is_empty() {
            return Vec::new();
        }

        let mut sorted = keypoints.to_vec();
        sorted.sort_by(|a, b| {
            b.response
                .total_cmp(&a.response)
                .then_with(|| a.keypoint.y.total_cmp(&b.keypoint.y))
                .then_with(|| a.keypoint.x.total_cmp(&b.keypoint.x))
        });

        let min_distance_sq = min_distance * min_distance;
        let mut kept: Vec<ScoredKeypoint> = Vec::new();
        for candidate in sorted {
            let too_close = kept.iter().any(|existing| {
                let dx = candidate.keypoint.x - existing.keypoint.x;
                let dy = candidate.keypoint.y - existing.keypoint.y;
                dx * dx + dy * dy < min_distance_sq
            });
            if !too_close {
                kept.push(candidate);
            }
        }
        kept
    }
}

/// True when at least `min_count` set flags appear contiguously on the
/// circle, wrapping around the end.
fn has_consecutive_arc(flags: &[bool; 16], min_count: usize) -> bool {
    let mut mask: u16 = 0;
    for (i, &flag) in flags.iter().enumerate() {
        if flag {
            mask |= 1 << i;
        }
    }
    if mask == 0 {
        return false;
    }

    // AND of rotated copies: a bit survives only if it starts a run of
    // min_count consecutive set bits
    let mut runs = mask;
    for i in 1..min_count {
        let rotated = (mask << i) | (mask >> (16 - i));
        runs &= rotated;
        if runs == 0 {
            return false;
        }
    }
    runs != 0
}
