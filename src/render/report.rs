//! Plain-text timing report.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use super::{write_artifact, RenderContext, Renderer};
use crate::data::duration::format_duration;
use crate::data::{state_label, AnalysisRecord};
use crate::error::RenderError;

/// Writes `timing_report_<stamp>.txt`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportRenderer;

impl Renderer for ReportRenderer {
    fn name(&self) -> &str {
        "report"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<PathBuf, RenderError> {
        let path = ctx
            .output_dir
            .join(format!("timing_report_{}.txt", ctx.file_stamp()));
        let report = format_report(ctx.record, ctx.started_at, Some(ctx.collection_time));
        write_artifact(&path, report.as_bytes())?;
        Ok(path)
    }
}

/// Format the human-readable report for an analysis.
pub fn format_report(
    record: &AnalysisRecord,
    generated_at: DateTime<Local>,
    collection_time: Option<std::time::Duration>,
) -> String {
    let iv = &record.communication_intervals;
    let temp = &record.temperature_range;

    let collection_line = collection_time
        .map(|elapsed| format!("- Collection time: {}\n", format_duration(elapsed)))
        .unwrap_or_default();
    let states: String = record
        .state_transitions
        .iter()
        .map(|(state, count)| format!("- {}: {} samples\n", state_label(*state), count))
        .collect();
    let checks: String = record
        .requirements_check
        .iter()
        .map(|(requirement, passed)| {
            let status = if *passed { "PASS" } else { "FAIL" };
            format!("- {}: {}\n", requirement, status)
        })
        .collect();

    format!(
        "TIMING ANALYSIS REPORT\n\
         ======================\n\
         Date: {date}\n\
         \n\
         GENERAL STATISTICS:\n\
         - Total samples: {total}\n\
         {collection_line}\
         \n\
         COMMUNICATION ANALYSIS:\n\
         - Mean interval: {iv_mean:.1} ms\n\
         - Standard deviation: {iv_std:.1} ms\n\
         - Minimum interval: {iv_min:.1} ms\n\
         - Maximum interval: {iv_max:.1} ms\n\
         - Target: {target} ms\n\
         \n\
         STATE DISTRIBUTION:\n\
         {states}\
         \n\
         TEMPERATURE ANALYSIS:\n\
         - Minimum temperature: {t_min:.1}°C\n\
         - Maximum temperature: {t_max:.1}°C\n\
         - Mean temperature: {t_mean:.1}°C\n\
         - Standard deviation: {t_std:.1}°C\n\
         \n\
         REQUIREMENTS CHECK:\n\
         {checks}",
        date = generated_at.format("%Y-%m-%d %H:%M:%S"),
        total = record.total_samples,
        iv_mean = iv.mean,
        iv_std = iv.std,
        iv_min = iv.min,
        iv_max = iv.max,
        target = iv.target,
        t_min = temp.min,
        t_max = temp.max,
        t_mean = temp.mean,
        t_std = temp.std,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support;
    use std::time::Duration;

    #[test]
    fn test_format_report_sections() {
        let samples = test_support::samples();
        let record = test_support::record(&samples);
        let report = format_report(
            &record,
            test_support::started_at(),
            Some(Duration::from_secs(5)),
        );

        assert!(report.contains("Date: 2024-03-15 14:25:01"));
        assert!(report.contains("- Total samples: 5"));
        assert!(report.contains("- Collection time: 5.00s"));
        assert!(report.contains("- Target: 1000 ms"));
        assert!(report.contains("- Maximum temperature: 28.4°C"));
        assert!(report.contains("- IDLE: 2 samples"));
        assert!(report.contains("- WARNING: 1 samples"));
        assert!(report.contains("- CRITICAL: 1 samples"));
        assert!(report.contains("- State 5: 1 samples"));
        assert!(report.contains("- communication_timing: PASS"));
        assert!(report.contains("- jitter_acceptable: PASS"));
        assert!(report.contains("- no_missed_deadlines: PASS"));
    }

    #[test]
    fn test_format_report_layout() {
        let samples = test_support::samples();
        let record = test_support::record(&samples);
        let report = format_report(&record, test_support::started_at(), None);

        assert!(report.starts_with(
            "TIMING ANALYSIS REPORT\n======================\nDate: 2024-03-15 14:25:01\n\n"
        ));
        assert!(report.contains("- Total samples: 5\n\nCOMMUNICATION ANALYSIS:\n"));
        assert!(report.contains("- State 5: 1 samples\n\nTEMPERATURE ANALYSIS:\n"));
        assert!(report.ends_with("- no_missed_deadlines: PASS\n"));
    }

    #[test]
    fn test_format_report_single_sample() {
        let samples = test_support::samples();
        let record = test_support::record(&samples[..1]);
        let report = format_report(&record, test_support::started_at(), None);

        assert!(report.contains("- Mean interval: NaN ms"));
        assert!(report.contains("- jitter_acceptable: FAIL"));
        assert!(!report.contains("Collection time"));
    }

    #[test]
    fn test_report_renderer_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let samples = test_support::samples();
        let record = test_support::record(&samples);
        let ctx = RenderContext {
            record: &record,
            samples: &samples,
            started_at: test_support::started_at(),
            collection_time: Duration::from_secs(5),
            output_dir: dir.path(),
        };

        let path = ReportRenderer.render(&ctx).unwrap();
        assert_eq!(path, dir.path().join("timing_report_20240315_142501.txt"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("TIMING ANALYSIS REPORT"));
    }

    #[test]
    fn test_report_renderer_missing_dir_fails() {
        let samples = test_support::samples();
        let record = test_support::record(&samples);
        let ctx = RenderContext {
            record: &record,
            samples: &samples,
            started_at: test_support::started_at(),
            collection_time: Duration::ZERO,
            output_dir: std::path::Path::new("/nonexistent/reports"),
        };

        assert!(matches!(
            ReportRenderer.render(&ctx),
            Err(RenderError::Io { .. })
        ));
    }
}
