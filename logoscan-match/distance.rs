use logoscan_core::{BinaryDescriptor, GradientDescriptor};

/// Hamming distance between two binary descriptors (number of differing bits)
pub fn hamming(a: &BinaryDescriptor, b: &BinaryDescriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

/// Euclidean distance between two gradient descriptors
pub fn euclidean(a: &GradientDescriptor, b: &GradientDescriptor) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}
