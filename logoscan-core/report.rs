#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameVerdict {
    /// 1-based position in the stream
    pub frame_number: u64,
    /// Matches that survived the configured filter
    pub good_match_count: usize,
    pub detected: bool,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunStatus {
    /// Source exhausted, every frame analyzed
    Completed,
    /// Caller tripped the cancel flag; verdicts up to that point are kept
    Cancelled,
    /// Fatal error; verdicts accumulated before it are kept
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "Completed"),
            RunStatus::Cancelled => write!(f, "Cancelled"),
            RunStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Ordered per-frame verdicts for one run, sealed with the terminal status.
///
/// Frame numbers are contiguous from 1; there is exactly one verdict per
/// frame that was pulled from the source. The report never changes once
/// constructed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectionReport {
    verdicts: Vec<FrameVerdict>,
    status: RunStatus,
}

impl DetectionReport {
    pub fn new(verdicts: Vec<FrameVerdict>, status: RunStatus) -> Self {
        Self { verdicts, status }
    }

    pub fn verdicts(&self) -> &[FrameVerdict] {
        &self.verdicts
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Number of frames analyzed
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    pub fn detected_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.detected).count()
    }

    /// Frame numbers where the logo was detected
    pub fn detected_frames(&self) -> Vec<u64> {
        self.verdicts
            .iter()
            .filter(|v| v.detected)
            .map(|v| v.frame_number)
            .collect()
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "DetectionReport: {} frames, {} detected, status={}",
            self.len(),
            self.detected_count(),
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_verdicts() -> Vec<FrameVerdict> {
        vec![
            FrameVerdict { frame_number: 1, good_match_count: 14, detected: true },
            FrameVerdict { frame_number: 2, good_match_count: 3, detected: false },
            FrameVerdict { frame_number: 3, good_match_count: 22, detected: true },
        ]
    }

    #[test]
    fn test_report_accessors() {
        let report = DetectionReport::new(create_test_verdicts(), RunStatus::Completed);
        assert_eq!(report.len(), 3);
        assert!(!report.is_empty());
        assert_eq!(report.status(), RunStatus::Completed);
        assert_eq!(report.detected_count(), 2);
        assert_eq!(report.detected_frames(), vec![1, 3]);
    }

    #[test]
    fn test_empty_report() {
        let report = DetectionReport::new(Vec::new(), RunStatus::Cancelled);
        assert_eq!(report.len(), 0);
        assert!(report.is_empty());
        assert_eq!(report.detected_count(), 0);
        assert!(report.detected_frames().is_empty());
    }

    #[test]
    fn test_summary_format() {
        let report = DetectionReport::new(create_test_verdicts(), RunStatus::Failed);
        let summary = report.summary();
        assert!(summary.contains("3 frames"));
        assert!(summary.contains("2 detected"));
        assert!(summary.contains("Failed"));
    }

    #[test]
    fn test_reports_compare_by_content() {
        let a = DetectionReport::new(create_test_verdicts(), RunStatus::Completed);
        let b = DetectionReport::new(create_test_verdicts(), RunStatus::Completed);
        assert_eq!(a, b);

        let c = DetectionReport::new(create_test_verdicts(), RunStatus::Cancelled);
        assert_ne!(a, c);
    }
}
