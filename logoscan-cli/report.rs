use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;
use logoscan_core::report::DetectionReport;

const CSV_HEADER: &str = "Frame Number,Logo Detection Status";

/// Write the per-frame verdicts as CSV, one row per scanned frame.
///
/// Failed and cancelled runs still list every frame that was scanned.
pub fn write_csv<W: Write>(writer: &mut W, report: &DetectionReport) -> io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for verdict in report.verdicts() {
        let status = if verdict.detected {
            "Logo Detected"
        } else {
            "Logo Not Detected"
        };
        writeln!(writer, "{},{}", verdict.frame_number, status)?;
    }
    Ok(())
}

/// Write the CSV report to a file, creating or truncating it
pub fn save_csv<P: AsRef<Path>>(path: P, report: &DetectionReport) -> io::Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, report)?;
    writer.flush()?;
    info!("Wrote {} verdicts to {}", report.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use logoscan_core::report::{FrameVerdict, RunStatus};

    fn verdict(frame_number: u64, detected: bool) -> FrameVerdict {
        FrameVerdict {
            frame_number,
            good_match_count: if detected { 20 } else { 0 },
            detected,
        }
    }

    #[test]
    fn test_csv_format() {
        let report = DetectionReport::new(
            vec![verdict(1, true), verdict(2, false), verdict(3, true)],
            RunStatus::Completed,
        );
        let mut out = Vec::new();
        write_csv(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Frame Number,Logo Detection Status\n\
             1,Logo Detected\n\
             2,Logo Not Detected\n\
             3,Logo Detected\n"
        );
    }

    #[test]
    fn test_empty_report_writes_header_only() {
        let report = DetectionReport::new(Vec::new(), RunStatus::Completed);
        let mut out = Vec::new();
        write_csv(&mut out, &report).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Frame Number,Logo Detection Status\n");
    }

    #[test]
    fn test_failed_run_keeps_partial_rows() {
        let report =
            DetectionReport::new(vec![verdict(1, false), verdict(2, true)], RunStatus::Failed);
        let mut out = Vec::new();
        write_csv(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with("2,Logo Detected\n"));
    }

    #[test]
    fn test_save_csv_creates_file() {
        let path = std::env::temp_dir().join(format!("logoscan_report_{}.csv", std::process::id()));
        let report = DetectionReport::new(vec![verdict(1, true)], RunStatus::Completed);

        save_csv(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(CSV_HEADER));
        assert!(text.contains("1,Logo Detected"));

        std::fs::remove_file(&path).ok();
    }
}
