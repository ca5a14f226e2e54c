use logoscan_core::DescriptorMatch;
use logoscan_core::config::MatchFilter;

/// Decides which matches are good and when a frame counts as detected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    pub filter: MatchFilter,
    /// A frame is detected when it has strictly more good matches than this
    pub min_good_matches: usize,
}

impl MatchPolicy {
    pub fn new(filter: MatchFilter, min_good_matches: usize) -> Self {
        Self {
            filter,
            min_good_matches,
        }
    }

    /// Count the good prefix of a distance-sorted match list.
    ///
    /// The relative rule compares each distance against `ratio` times the
    /// number of matches in the list, so frames with more matches admit
    /// proportionally larger distances. The absolute rule uses a fixed
    /// distance cutoff.
    pub fn good_match_count(&self, matches: &[DescriptorMatch]) -> usize {
        let cutoff = match self.filter {
            MatchFilter::Relative { ratio } => ratio * matches.len() as f32,
            MatchFilter::Absolute { cutoff } => cutoff,
        };
        matches.iter().take_while(|m| m.distance < cutoff).count()
    }

    /// Strictly more good matches than the minimum counts as detected
    pub fn is_detected(&self, good_match_count: usize) -> bool {
        good_match_count > self.min_good_matches
    }

    /// Count good matches and decide detection in one step
    pub fn evaluate(&self, matches: &[DescriptorMatch]) -> (usize, bool) {
        let good = self.good_match_count(matches);
        (good, self.is_detected(good))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_matches(distances: &[f32]) -> Vec<DescriptorMatch> {
        distances
            .iter()
            .enumerate()
            .map(|(i, &distance)| DescriptorMatch {
                reference_index: 0,
                frame_index: i,
                distance,
            })
            .collect()
    }

    #[test]
    fn test_absolute_filter_counts_prefix() {
        let policy = MatchPolicy::new(MatchFilter::Absolute { cutoff: 10.0 }, 0);
        let matches = make_matches(&[1.0, 5.0, 9.9, 10.0, 50.0]);
        // 10.0 itself is not good: the comparison is strict
        assert_eq!(policy.good_match_count(&matches), 3);
    }

    #[test]
    fn test_relative_filter_scales_with_match_count() {
        let policy = MatchPolicy::new(MatchFilter::Relative { ratio: 0.5 }, 0);

        // 4 matches: cutoff = 0.5 * 4 = 2.0
        let matches = make_matches(&[1.0, 1.9, 2.0, 3.0]);
        assert_eq!(policy.good_match_count(&matches), 2);

        // Same distances padded to 8 matches: cutoff = 4.0, more are good
        let matches = make_matches(&[1.0, 1.9, 2.0, 3.0, 5.0, 5.0, 5.0, 5.0]);
        assert_eq!(policy.good_match_count(&matches), 4);
    }

    #[test]
    fn test_empty_matches_are_never_detected() {
        let policy = MatchPolicy::new(MatchFilter::Relative { ratio: 0.7 }, 0);
        let (good, detected) = policy.evaluate(&[]);
        assert_eq!(good, 0);
        assert!(!detected);
    }

    #[test]
    fn test_detection_threshold_is_strict() {
        let policy = MatchPolicy::new(MatchFilter::Absolute { cutoff: 100.0 }, 10);
        assert!(!policy.is_detected(9));
        assert!(!policy.is_detected(10));
        assert!(policy.is_detected(11));
    }

    #[test]
    fn test_evaluate_combines_count_and_decision() {
        let policy = MatchPolicy::new(MatchFilter::Absolute { cutoff: 4.0 }, 2);
        let matches = make_matches(&[1.0, 2.0, 3.0, 9.0]);
        assert_eq!(policy.evaluate(&matches), (3, true));
    }
}
