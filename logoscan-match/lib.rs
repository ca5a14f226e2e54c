//! Descriptor matching against a reference set, plus the filtering policy
//! that turns raw matches into per-frame detection decisions.

pub mod distance;
pub mod policy;

pub use distance::{euclidean, hamming};
pub use policy::MatchPolicy;

use logoscan_core::{BinaryDescriptor, DescriptorMatch, DescriptorSet, GradientDescriptor};
use rayon::prelude::*;

/// Nearest-reference descriptor matcher
pub struct DescriptorMatcher;

impl DescriptorMatcher {
    /// Pair every frame descriptor with its nearest reference descriptor.
    ///
    /// Results are sorted by ascending distance, ties by frame index, which
    /// the filtering policy relies on. Exactly one match per frame
    /// descriptor; equal distances keep the lowest reference index. An empty
    /// side yields no matches, as do sets of different descriptor kinds,
    /// which cannot be scored against each other.
    pub fn match_sets(reference: &DescriptorSet, frame: &DescriptorSet) -> Vec<DescriptorMatch> {
        let mut matches = match (reference, frame) {
            (DescriptorSet::Binary(r), DescriptorSet::Binary(f)) => Self::match_binary(r, f),
            (DescriptorSet::Gradient(r), DescriptorSet::Gradient(f)) => Self::match_gradient(r, f),
            _ => Vec::new(),
        };
        matches.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.frame_index.cmp(&b.frame_index))
        });
        matches
    }

    fn match_binary(
        reference: &[BinaryDescriptor],
        frame: &[BinaryDescriptor],
    ) -> Vec<DescriptorMatch> {
        if reference.is_empty() || frame.is_empty() {
            return Vec::new();
        }
        frame
            .par_iter()
            .enumerate()
            .map(|(frame_index, descriptor)| {
                let mut best_index = 0;
                let mut best_distance = u32::MAX;
                for (reference_index, candidate) in reference.iter().enumerate() {
                    let d = hamming(candidate, descriptor);
                    if d < best_distance {
                        best_distance = d;
                        best_index = reference_index;
                    }
                }
                DescriptorMatch {
                    reference_index: best_index,
                    frame_index,
                    distance: best_distance as f32,
                }
            })
            .collect()
    }

    fn match_gradient(
        reference: &[GradientDescriptor],
        frame: &[GradientDescriptor],
    ) -> Vec<DescriptorMatch> {
        if reference.is_empty() || frame.is_empty() {
            return Vec::new();
        }
        frame
            .par_iter()
            .enumerate()
            .map(|(frame_index, descriptor)| {
                let mut best_index = 0;
                let mut best_distance = f32::INFINITY;
                for (reference_index, candidate) in reference.iter().enumerate() {
                    let d = euclidean(candidate, descriptor);
                    if d < best_distance {
                        best_distance = d;
                        best_index = reference_index;
                    }
                }
                DescriptorMatch {
                    reference_index: best_index,
                    frame_index,
                    distance: best_distance,
                }
            })
            .collect()
    }
}
